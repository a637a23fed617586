use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

use wallet_onboarding::accounts::AccountType;
use wallet_onboarding::api::{ApiError, Asset, BackendApi, HttpBackendClient};
use wallet_onboarding::history::{RawAccountTransaction, TransactionNormalizer};
use wallet_onboarding::onboarding::{OnboardingPersistence, RegistrationError};
use wallet_onboarding::storage::FileStorage;
use wallet_onboarding::utils::format_token_amount;
use wallet_onboarding::{ConfigError, OnboardingConfig};

const USAGE: &str = "usage: wallet-onboarding normalize <transactions.json> [assets.json]\n       wallet-onboarding session";
const DEFAULT_DECIMALS: u32 = 18;

#[allow(clippy::enum_variant_names)]
#[derive(Debug, thiserror::Error)]
enum CliError {
	#[error("{0}")]
	UsageError(&'static str),

	#[error("Failed to read {path}: {source}")]
	ReadError {
		path: String,
		source: std::io::Error,
	},

	#[error("Failed to parse {path}: {source}")]
	ParseError {
		path: String,
		source: serde_json::Error,
	},

	#[error("Failed to encode output: {0}")]
	OutputError(#[from] serde_json::Error),

	#[error("Configuration error: {0}")]
	ConfigError(#[from] ConfigError),

	#[error("Stored session error: {0}")]
	SessionError(#[from] RegistrationError),

	#[error("Backend error: {0}")]
	BackendError(#[from] ApiError),

	#[error("No registered wallet found in {0}")]
	NotRegisteredError(String),
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
	// Logs go to stderr so the JSON printed on stdout stays valid
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::from_default_env()
				.add_directive(tracing::Level::INFO.into()),
		)
		.with_writer(std::io::stderr)
		.with_target(false)
		.with_thread_ids(false)
		.with_thread_names(false)
		.with_file(false)
		.with_line_number(false)
		.with_timer(tracing_subscriber::fmt::time::time())
		.init();

	let args: Vec<String> = std::env::args().skip(1).collect();
	let result = match args.as_slice() {
		[command, transactions] if command == "normalize" => normalize(transactions, None).await,
		[command, transactions, assets] if command == "normalize" => {
			normalize(transactions, Some(assets)).await
		}
		[command] if command == "session" => session().await,
		_ => Err(CliError::UsageError(USAGE)),
	};

	if let Err(e) = result {
		error!("{}", e);
		std::process::exit(1);
	}
}

/// Print the normalized history of an SDK transaction dump.
async fn normalize(transactions_path: &str, assets_path: Option<&String>) -> Result<(), CliError> {
	let records: Vec<Value> = read_json(transactions_path).await?;
	let total = records.len();
	let transactions = RawAccountTransaction::from_values(records);
	let assets: Vec<Asset> = match assets_path {
		Some(path) => read_json(path).await?,
		None => Vec::new(),
	};
	info!(
		"Loaded {} of {} transaction records and {} assets",
		transactions.len(),
		total,
		assets.len()
	);

	let history = TransactionNormalizer::default().normalize(&transactions, &assets, &assets);
	info!("Normalized into {} history entries", history.len());

	for entry in &history {
		let decimals = assets
			.iter()
			.find(|asset| asset.symbol == entry.asset)
			.map(|asset| asset.decimals)
			.unwrap_or(DEFAULT_DECIMALS);
		info!(
			"{} {} {} ({:?})",
			entry.hash,
			format_token_amount(&entry.value, decimals),
			entry.asset,
			entry.status
		);
	}

	println!("{}", serde_json::to_string_pretty(&history)?);
	Ok(())
}

/// Restore the registered session from the data dir and refresh the profile from the backend.
async fn session() -> Result<(), CliError> {
	let config = OnboardingConfig::from_env()?;
	let persistence = OnboardingPersistence::new(Arc::new(FileStorage::from_config(&config)));

	let data_dir = config.data_dir.display().to_string();
	let wallet = persistence
		.load_wallet()
		.await?
		.ok_or_else(|| CliError::NotRegisteredError(data_dir.clone()))?;
	let tokens = persistence
		.load_oauth_tokens()
		.await?
		.ok_or_else(|| CliError::NotRegisteredError(data_dir.clone()))?;
	let accounts = persistence.load_accounts().await?;
	info!(
		"Restored wallet {} with {} accounts",
		wallet.address,
		accounts.len()
	);

	let client = HttpBackendClient::from_config(&config)?;
	client.set_access_token(Some(tokens.access_token)).await;

	let wallet_id = accounts
		.iter()
		.find(|account| account.account_type == AccountType::KeyBased)
		.and_then(|account| account.wallet_id)
		.ok_or(CliError::NotRegisteredError(data_dir))?;
	let user = client.user_info(wallet_id).await?;

	let output = json!({
		"address": wallet.address,
		"accounts": accounts,
		"user": user,
	});
	println!("{}", serde_json::to_string_pretty(&output)?);
	Ok(())
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, CliError> {
	let content = tokio::fs::read_to_string(Path::new(path))
		.await
		.map_err(|source| CliError::ReadError {
			path: path.to_string(),
			source,
		})?;
	serde_json::from_str(&content).map_err(|source| CliError::ParseError {
		path: path.to_string(),
		source,
	})
}
