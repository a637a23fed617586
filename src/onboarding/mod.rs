//! Wallet Registration Module
//!
//! This module provides the logic for taking a new or imported wallet through registration.
//! It is composed of several submodules, each responsible for a specific aspect of onboarding:
//!
//! - `orchestrator`: The main entry point. It builds the step plan and runs it against the collaborators.
//! - `events`: Defines the notifications emitted during registration and the handlers consuming them.
//! - `progress_tracker`: Enforces the wallet state machine and records the states entered.
//! - `services`: Collaborator traits for key handling and push notification tokens.
//! - `state_persistence`: Writes registration results to local storage.
//! - `types`: Onboarding input, wallet key material and the registration error type.

/// Notifications and event handlers
pub mod events;
/// Main coordinator for the registration process
pub mod orchestrator;
/// Wallet state machine
pub mod progress_tracker;
/// Key service and push token seams
pub mod services;
/// Storage of registration results
pub mod state_persistence;
pub mod types;

pub use events::*;
pub use orchestrator::*;
pub use progress_tracker::WalletStateTracker;
pub use services::{KeyService, PushTokenProvider};
pub use state_persistence::OnboardingPersistence;
pub use types::*;

use rand::Rng;

/// Generate the extra secret combined with the pin when encrypting a wallet.
pub fn generate_additional_secret() -> String {
	let mut secret = [0u8; 32];
	rand::rng().fill(&mut secret);
	hex::encode(secret)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn additional_secret_is_random_hex() {
		let first = generate_additional_secret();
		let second = generate_additional_secret();

		assert_eq!(first.len(), 64);
		assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
		assert_ne!(first, second);
	}
}
