//! Boundary with the value-transfer substrate.
//!
//! Subaccounts and the factory only ever move value through [`Ledger`]; the
//! substrate owns atomicity of each transfer. [`BalanceStore`] is the in-memory
//! reference ledger.

pub mod balance;

pub use balance::BalanceStore;

use crate::identity::Identity;

/// Native value unit.
pub type Amount = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    InsufficientFunds { available: Amount, requested: Amount },
    Overflow,
}

pub trait Ledger {
    /// Current balance; identities never seen hold zero.
    fn balance_of(&self, who: &Identity) -> Amount;

    /// Move `amount` from `from` to `to` as one atomic step. Any identity may
    /// receive, provisioned or not.
    fn transfer(&mut self, from: &Identity, to: &Identity, amount: Amount) -> Result<(), LedgerError>;
}
