use crate::utils::biguint_string;

use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Transaction type as reported by the smart-wallet SDK
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AccountTransactionType {
	AccountDeployment,
	TopUp,
	TopUpErc20Approve,
	Withdrawal,
	Settlement,
	Erc20Transfer,
	#[serde(other)]
	Other,
}

/// Amount as sent by the SDK: a decimal string, a JSON number, or anything else.
///
/// Numbers beyond `u64` arrive as floats. Unexpected shapes are kept as `Other` so one odd
/// record never fails the surrounding batch; they parse to `None` and the record is skipped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawAmount {
	Text(String),
	Integer(u64),
	Float(f64),
	Other(Value),
}

impl RawAmount {
	pub fn parse(&self) -> Option<BigUint> {
		match self {
			RawAmount::Text(text) => text.trim().parse::<BigUint>().ok(),
			RawAmount::Integer(value) => Some(BigUint::from(*value)),
			// integral floats print as their full decimal expansion
			RawAmount::Float(value) if value.is_finite() && *value >= 0.0 && value.fract() == 0.0 => {
				format!("{:.0}", value).parse::<BigUint>().ok()
			}
			RawAmount::Float(_) | RawAmount::Other(_) => None,
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartyAccount {
	#[serde(default)]
	pub address: Option<String>,
}

/// Sender or recipient details of an SDK transaction
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionParty {
	#[serde(default)]
	pub account: Option<PartyAccount>,
	#[serde(default)]
	pub address: Option<String>,
}

impl TransactionParty {
	/// Nested account address, else the direct address, else empty.
	pub fn resolve_address(&self) -> &str {
		self.account
			.as_ref()
			.and_then(|account| account.address.as_deref())
			.filter(|address| !address.is_empty())
			.or_else(|| self.address.as_deref())
			.unwrap_or("")
	}
}

/// Smart-wallet SDK transaction record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawAccountTransaction {
	pub hash: String,
	#[serde(rename = "type")]
	pub transaction_type: AccountTransactionType,
	#[serde(default)]
	pub from: Option<TransactionParty>,
	#[serde(default)]
	pub to: Option<TransactionParty>,
	/// The SDK only reports the last update time, used as the creation time.
	#[serde(default)]
	pub updated_at: Option<DateTime<Utc>>,
	#[serde(default)]
	pub state: Option<String>,
	#[serde(default)]
	pub token_recipient: Option<String>,
	#[serde(default)]
	pub token_address: Option<String>,
	#[serde(default)]
	pub token_value: Option<RawAmount>,
	#[serde(default)]
	pub value: Option<RawAmount>,
	#[serde(default)]
	pub payment_hash: Option<String>,
}

impl RawAccountTransaction {
	/// Decode SDK records one by one, dropping those that do not decode.
	pub fn from_values(values: Vec<Value>) -> Vec<RawAccountTransaction> {
		let total = values.len();
		let records: Vec<RawAccountTransaction> = values
			.into_iter()
			.enumerate()
			.filter_map(|(index, value)| match serde_json::from_value(value) {
				Ok(record) => Some(record),
				Err(e) => {
					debug!("Skipping undecodable transaction record #{}: {}", index, e);
					None
				}
			})
			.collect();

		if records.len() < total {
			debug!("Decoded {} of {} transaction records", records.len(), total);
		}
		records
	}
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
	Pending,
	Confirmed,
}

/// Payment-network classification of a transaction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionTag {
	#[serde(rename = "PAYMENT_NETWORK_ACCOUNT_TOPUP")]
	TopUp,
	#[serde(rename = "PAYMENT_NETWORK_ACCOUNT_WITHDRAWAL")]
	Withdrawal,
	#[serde(rename = "PAYMENT_NETWORK_TX_SETTLEMENT")]
	Settlement,
}

impl TransactionTag {
	pub fn as_str(&self) -> &'static str {
		match self {
			TransactionTag::TopUp => "PAYMENT_NETWORK_ACCOUNT_TOPUP",
			TransactionTag::Withdrawal => "PAYMENT_NETWORK_ACCOUNT_WITHDRAWAL",
			TransactionTag::Settlement => "PAYMENT_NETWORK_TX_SETTLEMENT",
		}
	}
}

/// One leg of a multi-leg payment-network settlement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettlementLeg {
	pub symbol: String,
	#[serde(with = "biguint_string")]
	pub value: BigUint,
	/// Hash of the payment this leg settles.
	pub hash: Option<String>,
}

/// Normalized history record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalTransaction {
	pub hash: String,
	pub from: String,
	pub to: String,
	#[serde(with = "biguint_string")]
	pub value: BigUint,
	/// Unix seconds.
	pub created_at: i64,
	pub asset: String,
	pub status: TransactionStatus,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tag: Option<TransactionTag>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub extra: Option<Vec<SettlementLeg>>,
}

/// Symbols and sentinels used while normalizing history
#[derive(Debug, Clone)]
pub struct HistoryConfig {
	/// Asset of transactions without a token address.
	pub native_symbol: String,
	/// Token used by payment-network top-ups and withdrawals.
	pub payment_network_symbol: String,
	/// SDK state marking a transaction as completed.
	pub completed_state: String,
}

impl Default for HistoryConfig {
	fn default() -> Self {
		Self {
			native_symbol: "ETH".to_string(),
			payment_network_symbol: "PLR".to_string(),
			completed_state: "Completed".to_string(),
		}
	}
}

/// Why a raw record was left out of the history
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
	AllowanceApproval,
	MissingFrom,
	MissingTo,
	InvalidValue(String),
}
