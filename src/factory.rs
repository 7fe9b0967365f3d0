//! Subaccount factory: prediction, lazy provisioning and administrative sweeps.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::derivation::IdentityDeriver;
use crate::error::{AccessTier, CustodyError};
use crate::identity::{Identity, Tag};
use crate::ledger::{Amount, Ledger};
use crate::storage::Storage;
use crate::subaccount::Subaccount;

/// Notification emitted for external consumers (indexers, UIs).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum FactoryEvent {
    SubaccountProvisioned { identity: Identity, controller: Identity },
}

impl FactoryEvent {
    pub fn to_json(&self) -> Result<String, CustodyError> {
        serde_json::to_string(self).map_err(|e| CustodyError::Serialization(e.to_string()))
    }
}

/// Factory owning the provisioning registry.
///
/// The registry is keyed by derived identity; presence of an entry is the
/// "provisioned" flag. Entries are only ever added.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SubaccountFactory {
    identity: Identity,
    administrator: Identity,
    subaccounts: HashMap<Identity, Subaccount>,

    #[serde(skip)]
    deriver: IdentityDeriver,
    #[serde(skip)]
    events: Vec<FactoryEvent>,
    #[serde(skip)]
    storage: Option<Arc<Storage>>,
}

impl SubaccountFactory {
    pub fn new(identity: Identity, administrator: Identity) -> Self {
        Self {
            identity,
            administrator,
            subaccounts: HashMap::new(),
            deriver: IdentityDeriver::new(),
            events: Vec::new(),
            storage: None,
        }
    }

    /// Persist the registry to `storage` after every new provisioning.
    pub fn with_storage(mut self, storage: Arc<Storage>) -> Self {
        self.storage = Some(storage);
        self.persist();
        self
    }

    /// Reopen the factory registry persisted in `storage`, or start an empty one.
    pub fn open(
        identity: Identity,
        administrator: Identity,
        storage: Arc<Storage>,
    ) -> Result<Self, CustodyError> {
        let factory = match storage.load_factory()? {
            Some(stored) => {
                if stored.identity != identity || stored.administrator != administrator {
                    return Err(CustodyError::Config(format!(
                        "stored registry belongs to factory {} (administrator {})",
                        stored.identity, stored.administrator
                    )));
                }
                info!(
                    "Persistence: Loaded {} subaccounts for factory {}",
                    stored.subaccounts.len(),
                    identity
                );
                stored
            }
            None => Self::new(identity, administrator),
        };

        Ok(factory.with_storage(storage))
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn administrator(&self) -> &Identity {
        &self.administrator
    }

    /// Identity `caller` will get for `tag`. Never mutates, never fails.
    pub fn predict_identity(&self, caller: &Identity, tag: &Tag) -> Identity {
        self.deriver.derive(&self.identity, caller, tag)
    }

    /// Whether a subaccount was provisioned at `identity`. Pre-funded but
    /// unprovisioned identities report `false`.
    pub fn is_provisioned(&self, identity: &Identity) -> bool {
        self.subaccounts.contains_key(identity)
    }

    /// Activate the subaccount for `(caller, tag)` with `caller` as controller.
    ///
    /// Idempotent: a second call returns the same identity and keeps the first
    /// controller. Any balance already at the identity is controllable at once.
    pub fn provision(&mut self, caller: &Identity, tag: &Tag) -> Identity {
        let identity = self.predict_identity(caller, tag);

        if self.subaccounts.contains_key(&identity) {
            debug!("Subaccount {} already provisioned", identity);
            return identity;
        }

        let subaccount = Subaccount::new(identity, *caller, self.identity);
        self.subaccounts.insert(identity, subaccount);
        info!("Provisioned subaccount {} (controller {})", identity, caller);

        self.events.push(FactoryEvent::SubaccountProvisioned {
            identity,
            controller: *caller,
        });
        self.persist();

        identity
    }

    pub fn subaccount(&self, identity: &Identity) -> Option<&Subaccount> {
        self.subaccounts.get(identity)
    }

    pub fn subaccounts(&self) -> impl Iterator<Item = &Subaccount> {
        self.subaccounts.values()
    }

    pub fn len(&self) -> usize {
        self.subaccounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subaccounts.is_empty()
    }

    /// Drain pending notifications.
    pub fn take_events(&mut self) -> Vec<FactoryEvent> {
        std::mem::take(&mut self.events)
    }

    /// Move the full balance of each listed subaccount to `recipient`, in order.
    ///
    /// Administrator only. Unprovisioned or empty entries are skipped. Returns
    /// the total moved. Nothing is transferred unless every transfer can land.
    pub fn sweep_all<L: Ledger + ?Sized>(
        &self,
        ledger: &mut L,
        caller: &Identity,
        identities: &[Identity],
        recipient: &Identity,
    ) -> Result<Amount, CustodyError> {
        if *caller != self.administrator {
            warn!("Rejected sweep by {}: not the administrator", caller);
            return Err(CustodyError::Unauthorized {
                caller: *caller,
                required: AccessTier::Administrator,
            });
        }

        // Recipient must absorb the whole sweep, counting each subaccount once.
        let mut seen = HashSet::new();
        let mut total: Amount = 0;
        for identity in identities {
            if identity == recipient || !seen.insert(*identity) {
                continue;
            }
            if let Some(subaccount) = self.subaccounts.get(identity) {
                total = total
                    .checked_add(subaccount.balance(&*ledger))
                    .ok_or(CustodyError::Overflow)?;
            }
        }
        ledger
            .balance_of(recipient)
            .checked_add(total)
            .ok_or(CustodyError::Overflow)?;

        let mut swept: Amount = 0;
        for identity in identities {
            let Some(subaccount) = self.subaccounts.get(identity) else {
                debug!("Sweep: skipping unprovisioned {}", identity);
                continue;
            };

            let balance = subaccount.balance(&*ledger);
            if balance == 0 || identity == recipient {
                continue;
            }

            subaccount.send_value(&mut *ledger, &self.identity, recipient, balance)?;
            debug!("Sweep: moved {} from {}", balance, identity);
            swept += balance;
        }

        info!(
            "Swept {} from {} subaccounts to {}",
            swept,
            identities.len(),
            recipient
        );
        Ok(swept)
    }

    fn persist(&self) {
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.save_factory(self) {
                tracing::error!("Failed to persist factory registry: {}", e);
            }
        }
    }
}
