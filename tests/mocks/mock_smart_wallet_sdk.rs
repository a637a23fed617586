use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use wallet_onboarding::smart_wallet::{SmartWalletAccountRecord, SmartWalletError, SmartWalletSdk};

pub struct MockSmartWalletSdk {
    accounts: Vec<SmartWalletAccountRecord>,
    inits: Arc<AtomicUsize>,
    fail_init: bool,
}

impl MockSmartWalletSdk {
    pub fn with_accounts(addresses: &[&str]) -> Self {
        let accounts = addresses
            .iter()
            .enumerate()
            .map(|(i, address)| SmartWalletAccountRecord {
                id: i as u64 + 1,
                address: address.to_string(),
                deploy_mode: None,
                ens_name: None,
                state: Some("Created".to_string()),
                next_state: None,
                updated_at: None,
            })
            .collect();
        Self {
            accounts,
            inits: Arc::new(AtomicUsize::new(0)),
            fail_init: false,
        }
    }

    /// SDK that cannot reach its service.
    pub fn failing_init() -> Self {
        Self {
            fail_init: true,
            ..Self::with_accounts(&[])
        }
    }

    /// Shared counter of successful `init` calls.
    pub fn init_counter(&self) -> Arc<AtomicUsize> {
        self.inits.clone()
    }
}

#[async_trait::async_trait]
impl SmartWalletSdk for MockSmartWalletSdk {
    async fn init(&mut self, private_key: &str) -> Result<(), SmartWalletError> {
        if private_key.is_empty() {
            return Err(SmartWalletError::ConnectionError("empty key".to_string()));
        }
        if self.fail_init {
            return Err(SmartWalletError::ConnectionError("sdk unreachable".to_string()));
        }
        self.inits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_accounts(&self) -> Result<Vec<SmartWalletAccountRecord>, SmartWalletError> {
        Ok(self.accounts.clone())
    }
}
