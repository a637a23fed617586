use super::types::*;
use crate::api::Asset;
use crate::utils::is_case_insensitive_match;

use num_bigint::BigUint;
use tracing::debug;

/// A raw record after validation, before it is merged into the output
enum MappedRecord {
	Plain(CanonicalTransaction),
	Settlement {
		placeholder: CanonicalTransaction,
		leg: SettlementLeg,
	},
}

/// Maps smart-wallet SDK transactions into canonical history records.
#[derive(Clone, Default)]
pub struct TransactionNormalizer {
	config: HistoryConfig,
}

impl TransactionNormalizer {
	pub fn new(config: HistoryConfig) -> Self {
		Self { config }
	}

	/// Normalize a batch of SDK records.
	///
	/// Output keeps first-seen hash order and holds at most one record per hash. Settlement legs
	/// sharing a hash are accumulated, in arrival order, on the record already holding that hash.
	pub fn normalize(
		&self,
		transactions: &[RawAccountTransaction],
		supported_assets: &[Asset],
		known_assets: &[Asset],
	) -> Vec<CanonicalTransaction> {
		let mut mapped: Vec<CanonicalTransaction> = Vec::with_capacity(transactions.len());

		for record in transactions {
			match self.map_record(record, supported_assets, known_assets) {
				Ok(MappedRecord::Plain(transaction)) => insert_or_replace(&mut mapped, transaction),
				Ok(MappedRecord::Settlement { placeholder, leg }) => {
					merge_settlement_leg(&mut mapped, placeholder, leg)
				}
				Err(reason) => {
					debug!("Skipping transaction {}: {:?}", record.hash, reason);
				}
			}
		}

		mapped
	}

	fn map_record(
		&self,
		record: &RawAccountTransaction,
		supported_assets: &[Asset],
		known_assets: &[Asset],
	) -> Result<MappedRecord, SkipReason> {
		if record.transaction_type == AccountTransactionType::TopUpErc20Approve {
			return Err(SkipReason::AllowanceApproval);
		}

		let from = record
			.from
			.as_ref()
			.map(TransactionParty::resolve_address)
			.unwrap_or("");
		let to = match record.token_recipient.as_deref() {
			Some(recipient) if !recipient.is_empty() => recipient,
			_ => record
				.to
				.as_ref()
				.map(TransactionParty::resolve_address)
				.unwrap_or(""),
		};
		if from.is_empty() {
			return Err(SkipReason::MissingFrom);
		}
		if to.is_empty() {
			return Err(SkipReason::MissingTo);
		}

		let amount = record.token_value.as_ref().or(record.value.as_ref());
		let value = match amount {
			Some(amount) => amount
				.parse()
				.ok_or_else(|| SkipReason::InvalidValue(format!("{:?}", amount)))?,
			None => BigUint::default(),
		};

		let status = if record.state.as_deref() == Some(self.config.completed_state.as_str()) {
			TransactionStatus::Confirmed
		} else {
			TransactionStatus::Pending
		};

		let mut asset = self.config.native_symbol.clone();
		if let Some(token_address) = record.token_address.as_deref() {
			if let Some(symbol) = resolve_symbol(token_address, supported_assets, known_assets) {
				asset = symbol.to_string();
			}
		}

		let transaction = CanonicalTransaction {
			hash: record.hash.clone(),
			from: from.to_string(),
			to: to.to_string(),
			value,
			created_at: record.updated_at.map(|t| t.timestamp()).unwrap_or_default(),
			asset,
			status,
			tag: None,
			extra: None,
		};

		let mapped = match record.transaction_type {
			AccountTransactionType::Settlement => {
				let leg = SettlementLeg {
					symbol: transaction.asset.clone(),
					value: transaction.value.clone(),
					hash: record.payment_hash.clone(),
				};
				let placeholder = CanonicalTransaction {
					value: BigUint::default(),
					asset: TransactionTag::Settlement.as_str().to_string(),
					tag: Some(TransactionTag::Settlement),
					..transaction
				};
				MappedRecord::Settlement { placeholder, leg }
			}
			AccountTransactionType::Withdrawal => MappedRecord::Plain(CanonicalTransaction {
				asset: self.config.payment_network_symbol.clone(),
				tag: Some(TransactionTag::Withdrawal),
				..transaction
			}),
			AccountTransactionType::TopUp => MappedRecord::Plain(CanonicalTransaction {
				asset: self.config.payment_network_symbol.clone(),
				tag: Some(TransactionTag::TopUp),
				..transaction
			}),
			_ => MappedRecord::Plain(transaction),
		};

		Ok(mapped)
	}
}

/// Normalize with the default symbols (`ETH` native, `PLR` payment network).
pub fn normalize(
	transactions: &[RawAccountTransaction],
	supported_assets: &[Asset],
	known_assets: &[Asset],
) -> Vec<CanonicalTransaction> {
	TransactionNormalizer::default().normalize(transactions, supported_assets, known_assets)
}

/// Symbol of the token at `address`, looking at the user's assets before the supported list.
fn resolve_symbol<'a>(
	address: &str,
	supported_assets: &'a [Asset],
	known_assets: &'a [Asset],
) -> Option<&'a str> {
	known_assets
		.iter()
		.chain(supported_assets.iter())
		.find(|asset| !asset.address.is_empty() && is_case_insensitive_match(&asset.address, address))
		.map(|asset| asset.symbol.as_str())
		.filter(|symbol| !symbol.is_empty())
}

fn position_of(mapped: &[CanonicalTransaction], hash: &str) -> Option<usize> {
	mapped
		.iter()
		.position(|existing| is_case_insensitive_match(&existing.hash, hash))
}

/// A later record for a known hash replaces the earlier one in place, keeping settlement legs.
fn insert_or_replace(mapped: &mut Vec<CanonicalTransaction>, mut transaction: CanonicalTransaction) {
	match position_of(mapped, &transaction.hash) {
		Some(index) => {
			if transaction.extra.is_none() {
				transaction.extra = mapped[index].extra.take();
			}
			mapped[index] = transaction;
		}
		None => mapped.push(transaction),
	}
}

fn merge_settlement_leg(
	mapped: &mut Vec<CanonicalTransaction>,
	placeholder: CanonicalTransaction,
	leg: SettlementLeg,
) {
	match position_of(mapped, &placeholder.hash) {
		Some(index) => mapped[index].extra.get_or_insert_with(Vec::new).push(leg),
		None => mapped.push(CanonicalTransaction {
			extra: Some(vec![leg]),
			..placeholder
		}),
	}
}
