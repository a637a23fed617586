//! Collaborator seams used by the registration orchestrator.
//!
//! Key generation and encryption live in an external wallet-crypto library and push
//! notification tokens come from the platform; both are reached through these traits.

use crate::onboarding::types::{EncryptedBlob, RegistrationError, Wallet, WalletSecret};

/// Wallet key generation and encryption
#[async_trait::async_trait]
pub trait KeyService: Send + Sync {
    /// Derive a new wallet from a mnemonic phrase or pin.
    async fn generate(&self, secret: &WalletSecret) -> Result<Wallet, RegistrationError>;

    /// Encrypt the wallet's private material under `secret`.
    async fn encrypt(
        &self,
        wallet: &Wallet,
        secret: &str,
    ) -> Result<EncryptedBlob, RegistrationError>;
}

/// Source of the device push notification token sent along with registration
#[async_trait::async_trait]
pub trait PushTokenProvider: Send + Sync {
    /// Returns `None` when the platform could not provide a token; registration goes on without it.
    async fn push_token(&self) -> Option<String>;
}
