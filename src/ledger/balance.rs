//! Balance tracking for the native value unit

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Amount, Ledger, LedgerError};
use crate::identity::Identity;

/// Balance store for all identities
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct BalanceStore {
    balances: HashMap<Identity, Amount>,
}

impl BalanceStore {
    /// Create a new empty balance store
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
        }
    }

    pub fn get_balance(&self, who: &Identity) -> Amount {
        self.balances.get(who).copied().unwrap_or(0)
    }

    /// Credit (add) balance to an identity
    pub fn credit(&mut self, who: &Identity, amount: Amount) -> Result<(), LedgerError> {
        if amount == 0 {
            return Ok(());
        }

        let current = self.get_balance(who);
        let new_balance = current.checked_add(amount).ok_or(LedgerError::Overflow)?;

        self.balances.insert(*who, new_balance);
        Ok(())
    }

    /// Debit (subtract) balance from an identity
    pub fn debit(&mut self, who: &Identity, amount: Amount) -> Result<(), LedgerError> {
        if amount == 0 {
            return Ok(());
        }

        let current = self.get_balance(who);
        if current < amount {
            return Err(LedgerError::InsufficientFunds {
                available: current,
                requested: amount,
            });
        }

        let new_balance = current - amount;
        if new_balance == 0 {
            self.balances.remove(who);
        } else {
            self.balances.insert(*who, new_balance);
        }

        Ok(())
    }

    /// Set balance directly (for genesis/admin funding)
    pub fn set_balance(&mut self, who: &Identity, amount: Amount) {
        if amount == 0 {
            self.balances.remove(who);
        } else {
            self.balances.insert(*who, amount);
        }
    }

    /// Sum of every balance
    pub fn total_supply(&self) -> Amount {
        self.balances.values().sum()
    }

    /// Number of identities holding a non-zero balance
    pub fn account_count(&self) -> usize {
        self.balances.len()
    }
}

impl Ledger for BalanceStore {
    fn balance_of(&self, who: &Identity) -> Amount {
        self.get_balance(who)
    }

    fn transfer(&mut self, from: &Identity, to: &Identity, amount: Amount) -> Result<(), LedgerError> {
        if from == to {
            // Still enforce funds so a self-transfer cannot mask an overdraft
            let available = self.get_balance(from);
            if available < amount {
                return Err(LedgerError::InsufficientFunds { available, requested: amount });
            }
            return Ok(());
        }

        self.debit(from, amount)?;

        if let Err(e) = self.credit(to, amount) {
            // Rollback on error
            self.credit(from, amount).ok();
            return Err(e);
        }

        Ok(())
    }
}
