//! Local key-value persistence for onboarding state.
//!
//! Values are JSON documents keyed by a short name (`wallet`, `oAuthTokens`, `accounts`, ...).
//! Writes are last-write-wins per key and carry no transactional guarantee.

/// Storage trait and its file and in-memory implementations
mod repositories;

pub use repositories::{FileStorage, MemoryStorage, Storage};

/// Error types for local storage operations
#[allow(clippy::enum_variant_names)]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),

	#[error("Serialization error: {0}")]
	SerializationError(#[from] serde_json::Error),

	#[error("Invalid storage key: {0}")]
	InvalidKey(String),
}
