use std::sync::Mutex;

use serde_json::json;
use wallet_onboarding::onboarding::{
    EncryptedBlob, KeyService, PushTokenProvider, RegistrationError, Wallet, WalletSecret,
};

pub const GENERATED_ADDRESS: &str = "0x9c7a6a9b4c3b31dd3f13e33eb7e9e8b4de7e1c3a";
pub const GENERATED_PRIVATE_KEY: &str = "0x8a2f0a4d1e0b2c3d4e5f60718293a4b5c6d7e8f9";

pub struct MockKeyService {
    fail_encryption: bool,
    /// Kind of secret each generation was asked to use.
    generated_from: Mutex<Vec<&'static str>>,
    /// Secrets wallets were encrypted under.
    encrypted_with: Mutex<Vec<String>>,
}

impl MockKeyService {
    pub fn new() -> Self {
        Self {
            fail_encryption: false,
            generated_from: Mutex::new(Vec::new()),
            encrypted_with: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_encryption() -> Self {
        Self {
            fail_encryption: true,
            ..Self::new()
        }
    }

    pub fn generated_from(&self) -> Vec<&'static str> {
        self.generated_from.lock().unwrap().clone()
    }

    pub fn encrypted_with(&self) -> Vec<String> {
        self.encrypted_with.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl KeyService for MockKeyService {
    async fn generate(&self, secret: &WalletSecret) -> Result<Wallet, RegistrationError> {
        let kind = match secret {
            WalletSecret::Mnemonic(_) => "mnemonic",
            WalletSecret::Pin(_) => "pin",
        };
        self.generated_from.lock().unwrap().push(kind);
        Ok(Wallet::new(GENERATED_ADDRESS, GENERATED_PRIVATE_KEY))
    }

    async fn encrypt(
        &self,
        wallet: &Wallet,
        secret: &str,
    ) -> Result<EncryptedBlob, RegistrationError> {
        if self.fail_encryption {
            return Err(RegistrationError::EncryptionError(
                "scrypt parameters rejected".to_string(),
            ));
        }
        self.encrypted_with.lock().unwrap().push(secret.to_string());
        Ok(EncryptedBlob(json!({
            "address": wallet.address.trim_start_matches("0x"),
            "crypto": { "cipher": "aes-128-ctr", "ciphertext": "00ff" },
            "version": 3
        })))
    }
}

pub struct MockPushTokens(pub Option<String>);

#[async_trait::async_trait]
impl PushTokenProvider for MockPushTokens {
    async fn push_token(&self) -> Option<String> {
        self.0.clone()
    }
}
