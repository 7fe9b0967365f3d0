use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

use crate::error::CustodyError;
use crate::factory::SubaccountFactory;
use crate::ledger::BalanceStore;

const FACTORY_KEY: &str = "factory:registry";
const LEDGER_KEY: &str = "ledger:balances";

#[derive(Debug)]
pub struct Storage {
    db: sled::Db,
}

impl Storage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CustodyError> {
        let db = sled::open(path).map_err(|e| CustodyError::Storage(e.to_string()))?;
        Ok(Storage { db })
    }

    /// In-memory tree, dropped with the handle.
    pub fn temporary() -> Result<Self, CustodyError> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(|e| CustodyError::Storage(e.to_string()))?;
        Ok(Storage { db })
    }

    // Generic Helper: Put
    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CustodyError> {
        let serialized =
            bincode::serialize(value).map_err(|e| CustodyError::Serialization(e.to_string()))?;
        self.db
            .insert(key.as_bytes(), serialized)
            .map_err(|e| CustodyError::Storage(e.to_string()))?;
        Ok(())
    }

    // Generic Helper: Get
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CustodyError> {
        match self.db.get(key.as_bytes()) {
            Ok(Some(data)) => {
                let deserialized = bincode::deserialize(&data)
                    .map_err(|e| CustodyError::Serialization(e.to_string()))?;
                Ok(Some(deserialized))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(CustodyError::Storage(e.to_string())),
        }
    }

    pub fn flush(&self) -> Result<(), CustodyError> {
        self.db
            .flush()
            .map_err(|e| CustodyError::Storage(e.to_string()))?;
        Ok(())
    }

    // --- Specific Accessors ---

    pub fn save_factory(&self, factory: &SubaccountFactory) -> Result<(), CustodyError> {
        self.put(FACTORY_KEY, factory)
    }

    pub fn load_factory(&self) -> Result<Option<SubaccountFactory>, CustodyError> {
        self.get(FACTORY_KEY)
    }

    pub fn save_ledger(&self, ledger: &BalanceStore) -> Result<(), CustodyError> {
        self.put(LEDGER_KEY, ledger)
    }

    pub fn load_ledger(&self) -> Result<Option<BalanceStore>, CustodyError> {
        self.get(LEDGER_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{Identity, Tag, IDENTITY_LEN};
    use crate::ledger::Ledger;
    use std::sync::Arc;

    fn id(byte: u8) -> Identity {
        Identity::from_bytes([byte; IDENTITY_LEN])
    }

    #[test]
    fn test_generic_put_get() {
        let storage = Storage::temporary().unwrap();

        storage.put("answer", &42u64).unwrap();
        assert_eq!(storage.get::<u64>("answer").unwrap(), Some(42));
        assert_eq!(storage.get::<u64>("missing").unwrap(), None);
    }

    #[test]
    fn test_provisioning_is_written_through() {
        let storage = Arc::new(Storage::temporary().unwrap());
        let mut factory = SubaccountFactory::new(id(1), id(2)).with_storage(storage.clone());

        let created = factory.provision(&id(3), &Tag::from("0x"));

        let restored = storage.load_factory().unwrap().unwrap();
        assert!(restored.is_provisioned(&created));
        assert_eq!(restored.subaccount(&created).unwrap().controller(), &id(3));
        assert_eq!(restored.administrator(), &id(2));
        // Prediction still lines up after a reload
        assert_eq!(restored.predict_identity(&id(3), &Tag::from("0x")), created);
    }

    #[test]
    fn test_open_resumes_registry() {
        let storage = Arc::new(Storage::temporary().unwrap());
        let created = {
            let mut factory = SubaccountFactory::open(id(1), id(2), storage.clone()).unwrap();
            factory.provision(&id(3), &Tag::from("resume"))
        };

        let mut reopened = SubaccountFactory::open(id(1), id(2), storage.clone()).unwrap();
        assert!(reopened.is_provisioned(&created));

        // Re-provisioning after a restart is still a no-op
        assert_eq!(reopened.provision(&id(3), &Tag::from("resume")), created);
        assert!(reopened.take_events().is_empty());
    }

    #[test]
    fn test_open_rejects_foreign_registry() {
        let storage = Arc::new(Storage::temporary().unwrap());
        SubaccountFactory::open(id(1), id(2), storage.clone()).unwrap();

        assert!(matches!(
            SubaccountFactory::open(id(1), id(9), storage),
            Err(CustodyError::Config(_))
        ));
    }

    #[test]
    fn test_ledger_round_trip() {
        let storage = Storage::temporary().unwrap();
        let mut ledger = BalanceStore::new();
        ledger.credit(&id(1), 500).unwrap();

        storage.save_ledger(&ledger).unwrap();
        storage.flush().unwrap();

        let restored = storage.load_ledger().unwrap().unwrap();
        assert_eq!(restored.balance_of(&id(1)), 500);
    }
}
