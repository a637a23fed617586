use super::StorageError;
use crate::config::OnboardingConfig;

use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Key-value store used by the onboarding flow
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
	async fn save(&self, key: &str, value: Value) -> Result<(), StorageError>;
	async fn load(&self, key: &str) -> Result<Option<Value>, StorageError>;
}

/// File-based implementation of Storage, one JSON document per key
pub struct FileStorage {
	data_dir: PathBuf,
}

impl FileStorage {
	pub fn new(data_dir: PathBuf) -> Self {
		Self { data_dir }
	}

	/// File storage under the configured data directory.
	pub fn from_config(config: &OnboardingConfig) -> Self {
		Self::new(config.data_dir.clone())
	}

	fn get_filename(&self, key: &str) -> Result<PathBuf, StorageError> {
		let valid = !key.is_empty()
			&& key
				.chars()
				.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
		if !valid {
			return Err(StorageError::InvalidKey(key.to_string()));
		}
		Ok(self.data_dir.join(format!("{}.json", key)))
	}
}

#[async_trait::async_trait]
impl Storage for FileStorage {
	async fn save(&self, key: &str, value: Value) -> Result<(), StorageError> {
		let filename = self.get_filename(key)?;
		tokio::fs::create_dir_all(&self.data_dir).await?;

		let document = serde_json::json!({
			"value": value,
			"updatedAt": chrono::Utc::now().to_rfc3339(),
		});
		tokio::fs::write(&filename, serde_json::to_string_pretty(&document)?).await?;

		debug!("Saved {} to {:?}", key, filename);
		Ok(())
	}

	async fn load(&self, key: &str) -> Result<Option<Value>, StorageError> {
		let filename = self.get_filename(key)?;
		if !filename.exists() {
			return Ok(None);
		}

		let content = tokio::fs::read_to_string(&filename).await?;
		let mut document: Value = serde_json::from_str(&content)?;

		info!("Loaded {} from {:?}", key, filename);
		Ok(document.get_mut("value").map(Value::take))
	}
}

/// In-memory implementation of Storage
#[derive(Default)]
pub struct MemoryStorage {
	entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStorage {
	pub fn new() -> Self {
		Self::default()
	}

	/// Snapshot of all stored keys, sorted.
	pub async fn keys(&self) -> Vec<String> {
		let mut keys: Vec<String> = self.entries.read().await.keys().cloned().collect();
		keys.sort();
		keys
	}
}

#[async_trait::async_trait]
impl Storage for MemoryStorage {
	async fn save(&self, key: &str, value: Value) -> Result<(), StorageError> {
		self.entries.write().await.insert(key.to_string(), value);
		Ok(())
	}

	async fn load(&self, key: &str) -> Result<Option<Value>, StorageError> {
		Ok(self.entries.read().await.get(key).cloned())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[tokio::test]
	async fn file_storage_round_trips_and_overwrites() {
		let dir = tempfile::tempdir().unwrap();
		let storage = FileStorage::new(dir.path().join("db"));

		assert!(storage.load("wallet").await.unwrap().is_none());

		storage.save("wallet", json!({ "address": "0x1" })).await.unwrap();
		storage.save("wallet", json!({ "address": "0x2" })).await.unwrap();

		let loaded = storage.load("wallet").await.unwrap().unwrap();
		assert_eq!(loaded, json!({ "address": "0x2" }));
	}

	#[tokio::test]
	async fn file_storage_rejects_path_like_keys() {
		let dir = tempfile::tempdir().unwrap();
		let storage = FileStorage::new(dir.path().to_path_buf());

		let result = storage.save("../escape", json!(1)).await;
		assert!(matches!(result, Err(StorageError::InvalidKey(_))));
	}

	#[tokio::test]
	async fn file_storage_uses_configured_data_dir() {
		let dir = tempfile::tempdir().unwrap();
		let config = OnboardingConfig {
			data_dir: dir.path().join("onboarding"),
			..OnboardingConfig::default()
		};
		let storage = FileStorage::from_config(&config);

		storage.save("user", json!({ "username": "snow" })).await.unwrap();
		assert!(dir.path().join("onboarding").join("user.json").exists());
	}

	#[tokio::test]
	async fn memory_storage_lists_keys() {
		let storage = MemoryStorage::new();
		storage.save("user", json!({})).await.unwrap();
		storage.save("accounts", json!([])).await.unwrap();

		assert_eq!(storage.keys().await, vec!["accounts", "user"]);
	}
}
