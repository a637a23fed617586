//! Smart-wallet integration
//!
//! Smart wallets are contract-based accounts that need an on-chain deployment before they can
//! send assets. This module holds the SDK seam, an owned connection handle that reconnects only
//! when credentials change, and the upgrade status reporting used to explain why sending is
//! blocked.

/// Owned SDK connection handle
pub mod connection;
/// Upgrade status and user-facing blocked-send messages
pub mod status;

pub use connection::SmartWalletConnection;
pub use status::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Smart-wallet account as listed by the SDK.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SmartWalletAccountRecord {
	pub id: u64,
	pub address: String,
	#[serde(default)]
	pub deploy_mode: Option<String>,
	#[serde(default)]
	pub ens_name: Option<String>,
	/// SDK deployment state, e.g. `Created` or `Deployed`.
	#[serde(default)]
	pub state: Option<String>,
	#[serde(default)]
	pub next_state: Option<String>,
	#[serde(default)]
	pub updated_at: Option<DateTime<Utc>>,
}

/// Progress of moving a user from a key-based account to a smart wallet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpgradeStatus {
	AccountCreated,
	Deploying,
	TransferringAssets,
	Deployed,
}

/// Why a smart-wallet deployment failed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeploymentErrorKind {
	InsufficientFunds,
	RevertedOnChain,
	ServerError,
}

/// Smart-wallet SDK operations used during onboarding
#[async_trait::async_trait]
pub trait SmartWalletSdk: Send + Sync {
	/// Initialise an SDK session for the given wallet key.
	async fn init(&mut self, private_key: &str) -> Result<(), SmartWalletError>;

	/// List the smart-wallet accounts owned by the current session.
	async fn get_accounts(&self) -> Result<Vec<SmartWalletAccountRecord>, SmartWalletError>;
}

/// Error types for smart-wallet SDK usage
#[derive(Debug, thiserror::Error)]
pub enum SmartWalletError {
	#[error("SDK connection error: {0}")]
	ConnectionError(String),

	#[error("SDK is not connected")]
	NotConnected,

	#[error("SDK request failed: {0}")]
	RequestError(String),
}
