use serde_json::Value;

use wallet_onboarding::storage::{Storage, StorageError};

/// Storage whose writes always fail, as on a full disk.
pub struct FailingStorage;

#[async_trait::async_trait]
impl Storage for FailingStorage {
    async fn save(&self, _key: &str, _value: Value) -> Result<(), StorageError> {
        Err(StorageError::IoError(std::io::Error::other("disk full")))
    }

    async fn load(&self, _key: &str) -> Result<Option<Value>, StorageError> {
        Ok(None)
    }
}
