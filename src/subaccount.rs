//! A provisioned subaccount and its outgoing-transfer authorization.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AccessTier, CustodyError};
use crate::identity::Identity;
use crate::ledger::{Amount, Ledger};

/// Active subaccount bound to the identity it was derived at.
///
/// Incoming value needs no authorization; it is just a ledger transfer to
/// `identity`. Outgoing value may only be moved by `controller` or by `factory`
/// relaying on the administrator's behalf. Neither is ever reassigned.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Subaccount {
    identity: Identity,
    controller: Identity,
    factory: Identity,
}

impl Subaccount {
    pub(crate) fn new(identity: Identity, controller: Identity, factory: Identity) -> Self {
        Self {
            identity,
            controller,
            factory,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn controller(&self) -> &Identity {
        &self.controller
    }

    pub fn factory(&self) -> &Identity {
        &self.factory
    }

    pub fn is_authorized(&self, caller: &Identity) -> bool {
        *caller == self.controller || *caller == self.factory
    }

    pub fn balance<L: Ledger + ?Sized>(&self, ledger: &L) -> Amount {
        ledger.balance_of(&self.identity)
    }

    /// Send `amount` to `to`. Fails with `Unauthorized` before touching balances,
    /// then with `InsufficientBalance` if the full amount is not available.
    pub fn send_value<L: Ledger + ?Sized>(
        &self,
        ledger: &mut L,
        caller: &Identity,
        to: &Identity,
        amount: Amount,
    ) -> Result<(), CustodyError> {
        if !self.is_authorized(caller) {
            warn!(
                "Rejected transfer out of {}: caller {} is neither controller nor factory",
                self.identity, caller
            );
            return Err(CustodyError::Unauthorized {
                caller: *caller,
                required: AccessTier::ControllerOrFactory,
            });
        }

        let available = ledger.balance_of(&self.identity);
        if amount > available {
            return Err(CustodyError::InsufficientBalance {
                available,
                requested: amount,
            });
        }

        ledger.transfer(&self.identity, to, amount)?;
        debug!("Subaccount {} sent {} to {}", self.identity, amount, to);
        Ok(())
    }
}
