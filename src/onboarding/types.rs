use crate::accounts::AccountError;
use crate::api::{ApiError, ApiUser};
use crate::onboarding::orchestrator::RegistrationStep;
use crate::smart_wallet::SmartWalletError;
use crate::storage::StorageError;

use rand::seq::{SliceRandom, index};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

/// Wallet lifecycle states observable during registration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WalletState {
	Idle,
	Generating,
	Encrypting,
	Registering,
	Decrypted,
	Failed,
}

impl WalletState {
	pub fn is_terminal(&self) -> bool {
		matches!(self, WalletState::Decrypted | WalletState::Failed)
	}
}

/// Wallet key material held only for the duration of onboarding
#[derive(Clone)]
pub struct Wallet {
	pub address: String,
	pub private_key: Zeroizing<String>,
}

impl Wallet {
	pub fn new(address: &str, private_key: &str) -> Self {
		Self {
			address: address.to_string(),
			private_key: Zeroizing::new(private_key.to_string()),
		}
	}
}

impl fmt::Debug for Wallet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Wallet")
			.field("address", &self.address)
			.field("private_key", &"<redacted>")
			.finish()
	}
}

/// Encrypted key material as produced by the key service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EncryptedBlob(pub serde_json::Value);

/// What gets persisted for a wallet: the plaintext address and the encrypted keys
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredWallet {
	pub address: String,
	pub encrypted: EncryptedBlob,
}

/// Secret material a new wallet is derived from
pub enum WalletSecret {
	Mnemonic(Zeroizing<String>),
	Pin(Zeroizing<String>),
}

/// Recovery phrase with the words the user is asked to confirm
#[derive(Clone)]
pub struct Mnemonic {
	pub original: Zeroizing<String>,
	pub shuffled: Vec<String>,
	/// 1-based word positions the user must confirm.
	pub words_to_validate: Vec<usize>,
}

impl Mnemonic {
	/// Build a mnemonic challenge asking for `count` distinct words of `phrase`.
	pub fn new(phrase: &str, count: usize) -> Self {
		let words: Vec<&str> = phrase.split_whitespace().collect();
		let mut rng = rand::rng();

		let mut shuffled: Vec<String> = words.iter().map(|w| w.to_string()).collect();
		shuffled.shuffle(&mut rng);

		let amount = count.min(words.len());
		let mut words_to_validate: Vec<usize> = index::sample(&mut rng, words.len(), amount)
			.into_iter()
			.map(|i| i + 1)
			.collect();
		words_to_validate.sort_unstable();

		Self {
			original: Zeroizing::new(words.join(" ")),
			shuffled,
			words_to_validate,
		}
	}

	/// Check the user's answers, given in `words_to_validate` order.
	pub fn validate(&self, answers: &[&str]) -> bool {
		let words: Vec<&str> = self.original.split_whitespace().collect();
		answers.len() == self.words_to_validate.len()
			&& self
				.words_to_validate
				.iter()
				.zip(answers)
				.all(|(position, answer)| {
					position
						.checked_sub(1)
						.and_then(|index| words.get(index))
						== Some(answer)
				})
	}
}

/// Everything collected from the user before the wallet is registered
pub struct WalletOnboardingState {
	pub pin: Zeroizing<String>,
	/// Extra generated secret appended to the pin for encryption.
	pub additional_secret: Option<Zeroizing<String>>,
	pub mnemonic: Option<Mnemonic>,
	pub imported_wallet: Option<Wallet>,
	pub api_user: ApiUser,
}

impl WalletOnboardingState {
	pub fn new(pin: &str) -> Self {
		Self {
			pin: Zeroizing::new(pin.to_string()),
			additional_secret: None,
			mnemonic: None,
			imported_wallet: None,
			api_user: ApiUser::default(),
		}
	}

	pub fn with_mnemonic(mut self, mnemonic: Mnemonic) -> Self {
		self.mnemonic = Some(mnemonic);
		self
	}

	pub fn with_imported_wallet(mut self, wallet: Wallet) -> Self {
		self.imported_wallet = Some(wallet);
		self
	}

	pub fn with_api_user(mut self, api_user: ApiUser) -> Self {
		self.api_user = api_user;
		self
	}

	pub fn with_additional_secret(mut self, secret: Zeroizing<String>) -> Self {
		self.additional_secret = Some(secret);
		self
	}

	/// Mnemonic phrase when one was chosen, otherwise the pin.
	pub fn generation_secret(&self) -> WalletSecret {
		match &self.mnemonic {
			Some(mnemonic) if !mnemonic.original.is_empty() => {
				WalletSecret::Mnemonic(mnemonic.original.clone())
			}
			_ => WalletSecret::Pin(self.pin.clone()),
		}
	}

	/// Secret the wallet is encrypted under: the pin, plus the additional secret if any.
	pub fn encryption_secret(&self) -> Zeroizing<String> {
		let mut secret = Zeroizing::new(self.pin.to_string());
		if let Some(additional) = &self.additional_secret {
			secret.push_str(additional);
		}
		secret
	}
}

/// Error types for the registration flow
#[allow(clippy::enum_variant_names)]
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
	#[error("Key generation error: {0}")]
	KeyGenerationError(String),

	#[error("Encryption error: {0}")]
	EncryptionError(String),

	#[error("Storage error: {0}")]
	StorageError(#[from] StorageError),

	#[error("Remote registration error: {0}")]
	RemoteError(#[from] ApiError),

	#[error("Smart wallet SDK error: {0}")]
	SdkConnectionError(#[from] SmartWalletError),

	#[error("Account error: {0}")]
	AccountError(#[from] AccountError),

	#[error("Invalid wallet state transition from {from:?} to {to:?}")]
	InvalidTransition { from: WalletState, to: WalletState },

	#[error("Step {0:?} ran before its inputs were available")]
	MissingStepInput(RegistrationStep),

	#[error("Event handler error: {0}")]
	HandlerError(String),

	#[error("Serialization error: {0}")]
	SerializationError(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
	use super::*;

	const PHRASE: &str = "one two three four five six seven eight nine ten eleven twelve";

	#[test]
	fn mnemonic_challenge_uses_distinct_positions() {
		let mnemonic = Mnemonic::new(PHRASE, 3);

		assert_eq!(mnemonic.words_to_validate.len(), 3);
		assert!(mnemonic.words_to_validate.windows(2).all(|w| w[0] < w[1]));
		assert!(mnemonic.words_to_validate.iter().all(|p| (1..=12).contains(p)));

		let mut sorted = mnemonic.shuffled.clone();
		sorted.sort();
		let mut expected: Vec<String> = PHRASE.split(' ').map(String::from).collect();
		expected.sort();
		assert_eq!(sorted, expected);
	}

	#[test]
	fn mnemonic_validation_checks_requested_words() {
		let mnemonic = Mnemonic {
			original: Zeroizing::new(PHRASE.to_string()),
			shuffled: Vec::new(),
			words_to_validate: vec![2, 5],
		};

		assert!(mnemonic.validate(&["two", "five"]));
		assert!(!mnemonic.validate(&["five", "two"]));
		assert!(!mnemonic.validate(&["two"]));
	}

	#[test]
	fn mnemonic_validation_rejects_position_zero() {
		let mnemonic = Mnemonic {
			original: Zeroizing::new(PHRASE.to_string()),
			shuffled: Vec::new(),
			words_to_validate: vec![0, 13],
		};

		assert!(!mnemonic.validate(&["one", "twelve"]));
		assert!(!mnemonic.validate(&["", ""]));
	}

	#[test]
	fn encryption_secret_appends_additional_secret() {
		let state = WalletOnboardingState::new("123456")
			.with_additional_secret(Zeroizing::new("abcd".to_string()));
		assert_eq!(state.encryption_secret().as_str(), "123456abcd");
		assert_eq!(
			WalletOnboardingState::new("123456").encryption_secret().as_str(),
			"123456"
		);
	}

	#[test]
	fn generation_prefers_mnemonic_over_pin() {
		let state = WalletOnboardingState::new("123456").with_mnemonic(Mnemonic::new(PHRASE, 3));
		assert!(matches!(state.generation_secret(), WalletSecret::Mnemonic(m) if m.as_str() == PHRASE));

		let pin_only = WalletOnboardingState::new("123456");
		assert!(matches!(pin_only.generation_secret(), WalletSecret::Pin(p) if p.as_str() == "123456"));
	}

	#[test]
	fn wallet_debug_hides_private_key() {
		let wallet = Wallet::new("0x9c", "0xsecret");
		let rendered = format!("{:?}", wallet);
		assert!(rendered.contains("0x9c"));
		assert!(!rendered.contains("0xsecret"));
	}
}
