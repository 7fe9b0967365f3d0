pub mod config;
pub mod derivation;
pub mod error;
pub mod factory;
pub mod identity;
pub mod ledger;
pub mod logging;
pub mod storage;
pub mod subaccount;

pub use config::CustodyConfig;
pub use derivation::IdentityDeriver;
pub use error::{AccessTier, CustodyError};
pub use factory::{FactoryEvent, SubaccountFactory};
pub use identity::{Identity, Tag};
pub use ledger::{Amount, BalanceStore, Ledger};
pub use storage::Storage;
pub use subaccount::Subaccount;
