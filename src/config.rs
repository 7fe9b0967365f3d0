use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::error::CustodyError;
use crate::factory::SubaccountFactory;
use crate::identity::Identity;
use crate::storage::Storage;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CustodyConfig {
    pub factory: FactoryConfig,
    #[serde(default)]
    pub node: NodeConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FactoryConfig {
    pub identity: Identity,
    pub administrator: Identity,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NodeConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_db_path() -> String {
    "./data/custody".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: default_log_level(),
        }
    }
}

impl CustodyConfig {
    pub fn new(identity: Identity, administrator: Identity) -> Self {
        Self {
            factory: FactoryConfig {
                identity,
                administrator,
            },
            node: NodeConfig::default(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CustodyError> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .map_err(|e| CustodyError::Config(format!("reading {}: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&s)?;
        tracing::info!("Config loaded from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, CustodyError> {
        toml::from_str(s).map_err(|e| CustodyError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, CustodyError> {
        toml::to_string_pretty(self).map_err(|e| CustodyError::Config(e.to_string()))
    }

    /// Factory without persistence.
    pub fn build_factory(&self) -> SubaccountFactory {
        SubaccountFactory::new(self.factory.identity, self.factory.administrator)
    }

    /// Factory backed by the sled tree at `node.db_path`.
    pub fn open_factory(&self) -> Result<SubaccountFactory, CustodyError> {
        tracing::info!("Persistence: Opening Sled DB at '{}'...", self.node.db_path);
        let storage = Arc::new(Storage::open(&self.node.db_path)?);
        SubaccountFactory::open(self.factory.identity, self.factory.administrator, storage)
    }
}
