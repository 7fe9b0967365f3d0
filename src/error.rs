use thiserror::Error;

use crate::identity::Identity;
use crate::ledger::LedgerError;

/// Which trust tier an operation demanded from its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessTier {
    /// Only the factory administrator.
    Administrator,
    /// The subaccount's controller, or its provisioning factory acting as relay.
    ControllerOrFactory,
}

impl std::fmt::Display for AccessTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessTier::Administrator => write!(f, "administrator"),
            AccessTier::ControllerOrFactory => write!(f, "controller or factory"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CustodyError {
    #[error("Unauthorized: {caller} is not the {required}")]
    Unauthorized { caller: Identity, required: AccessTier },
    #[error("Insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance { available: u64, requested: u64 },
    #[error("Balance overflow")]
    Overflow,
    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Config error: {0}")]
    Config(String),
}

impl From<LedgerError> for CustodyError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientFunds { available, requested } => {
                CustodyError::InsufficientBalance { available, requested }
            }
            LedgerError::Overflow => CustodyError::Overflow,
        }
    }
}
