//! Persistence of onboarding results.
//!
//! The `OnboardingPersistence` service writes what registration produces (the encrypted wallet,
//! OAuth tokens, the user profile, accounts and initial assets) to the local [`Storage`].
//! Writes are awaited but not transactional: a failure part way leaves earlier keys in place.

use crate::accounts::Account;
use crate::api::{AssetMap, OAuthTokens, UserProfile};
use crate::onboarding::types::{RegistrationError, StoredWallet};
use crate::storage::Storage;

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

pub const WALLET_KEY: &str = "wallet";
pub const OAUTH_TOKENS_KEY: &str = "oAuthTokens";
pub const USER_KEY: &str = "user";
pub const ACCOUNTS_KEY: &str = "accounts";
pub const ASSETS_KEY: &str = "assets";
pub const BALANCES_KEY: &str = "balances";

/// Service for persisting onboarding state through a [`Storage`] backend.
#[derive(Clone)]
pub struct OnboardingPersistence {
    storage: Arc<dyn Storage>,
}

impl OnboardingPersistence {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    async fn save<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), RegistrationError> {
        let value = serde_json::to_value(value)?;
        self.storage.save(key, value).await?;
        Ok(())
    }

    async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, RegistrationError> {
        match self.storage.load(key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Save the encrypted wallet together with its plaintext address.
    pub async fn save_wallet(&self, wallet: &StoredWallet) -> Result<(), RegistrationError> {
        self.save(WALLET_KEY, wallet).await?;
        info!("Saved encrypted wallet for {}", wallet.address);
        Ok(())
    }

    pub async fn load_wallet(&self) -> Result<Option<StoredWallet>, RegistrationError> {
        self.load(WALLET_KEY).await
    }

    pub async fn save_oauth_tokens(&self, tokens: &OAuthTokens) -> Result<(), RegistrationError> {
        self.save(OAUTH_TOKENS_KEY, tokens).await
    }

    pub async fn load_oauth_tokens(&self) -> Result<Option<OAuthTokens>, RegistrationError> {
        self.load(OAUTH_TOKENS_KEY).await
    }

    pub async fn save_user(&self, user: &UserProfile) -> Result<(), RegistrationError> {
        self.save(USER_KEY, user).await
    }

    pub async fn save_accounts(&self, accounts: &[Account]) -> Result<(), RegistrationError> {
        self.save(ACCOUNTS_KEY, accounts).await
    }

    pub async fn load_accounts(&self) -> Result<Vec<Account>, RegistrationError> {
        Ok(self.load(ACCOUNTS_KEY).await?.unwrap_or_default())
    }

    /// Save the initial assets and a zero balance entry for each of them.
    pub async fn save_initial_assets(&self, assets: &AssetMap) -> Result<(), RegistrationError> {
        self.save(ASSETS_KEY, assets).await?;

        let balances: BTreeMap<&str, serde_json::Value> = assets
            .keys()
            .map(|symbol| {
                (
                    symbol.as_str(),
                    serde_json::json!({ "symbol": symbol, "balance": "0" }),
                )
            })
            .collect();
        self.save(BALANCES_KEY, &balances).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Asset;
    use crate::onboarding::types::EncryptedBlob;
    use crate::storage::MemoryStorage;
    use serde_json::json;

    #[tokio::test]
    async fn initial_assets_get_zero_balances() {
        let storage = Arc::new(MemoryStorage::new());
        let persistence = OnboardingPersistence::new(storage.clone());

        let mut assets = AssetMap::new();
        assets.insert(
            "ETH".to_string(),
            Asset {
                symbol: "ETH".into(),
                name: "Ethereum".into(),
                address: String::new(),
                decimals: 18,
                icon_url: None,
            },
        );
        persistence.save_initial_assets(&assets).await.unwrap();

        let balances = storage.load(BALANCES_KEY).await.unwrap().unwrap();
        assert_eq!(balances, json!({ "ETH": { "symbol": "ETH", "balance": "0" } }));
    }

    #[tokio::test]
    async fn wallet_round_trips_through_storage() {
        let persistence = OnboardingPersistence::new(Arc::new(MemoryStorage::new()));
        let wallet = StoredWallet {
            address: "0x9c".into(),
            encrypted: EncryptedBlob(json!({ "cipher": "aes-128-ctr" })),
        };

        persistence.save_wallet(&wallet).await.unwrap();
        assert_eq!(persistence.load_wallet().await.unwrap(), Some(wallet));
        assert!(persistence.load_accounts().await.unwrap().is_empty());
    }
}
