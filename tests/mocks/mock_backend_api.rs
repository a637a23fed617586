use std::collections::BTreeMap;
use std::sync::Mutex;

use serde_json::Map;
use wallet_onboarding::api::{
    ApiError, Asset, AssetMap, BackendApi, Rates, RegisteredWallet, RegistrationRequest,
    UpdateUserRequest, UserProfile,
};

pub const USER_ID: u64 = 1;
pub const WALLET_ID: u64 = 2;

pub struct MockBackendApi {
    failing_call: Option<&'static str>,
    calls: Mutex<Vec<String>>,
    registrations: Mutex<Vec<RegistrationRequest>>,
}

impl MockBackendApi {
    pub fn new() -> Self {
        Self {
            failing_call: None,
            calls: Mutex::new(Vec::new()),
            registrations: Mutex::new(Vec::new()),
        }
    }

    /// Answer `call` with a server error.
    pub fn failing(call: &'static str) -> Self {
        Self {
            failing_call: Some(call),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn registrations(&self) -> Vec<RegistrationRequest> {
        self.registrations.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call.to_string());
        if self.failing_call == Some(call) {
            return Err(ApiError::StatusError {
                endpoint: call.to_string(),
                status: 500,
            });
        }
        Ok(())
    }
}

fn asset(symbol: &str, address: &str, decimals: u32) -> Asset {
    Asset {
        symbol: symbol.to_string(),
        name: symbol.to_string(),
        address: address.to_string(),
        decimals,
        icon_url: None,
    }
}

#[async_trait::async_trait]
impl BackendApi for MockBackendApi {
    async fn register_on_auth_server(
        &self,
        request: &RegistrationRequest,
    ) -> Result<RegisteredWallet, ApiError> {
        self.record("register_on_auth_server")?;
        self.registrations.lock().unwrap().push(request.clone());
        Ok(RegisteredWallet {
            user_id: USER_ID,
            wallet_id: WALLET_ID,
            access_token: "accessToken".to_string(),
            refresh_token: "refreshToken".to_string(),
        })
    }

    async fn update_user(&self, request: &UpdateUserRequest) -> Result<UserProfile, ApiError> {
        self.record("update_user")?;
        Ok(UserProfile {
            username: request.username.clone(),
            wallet_id: Some(request.wallet_id),
            details: Map::new(),
        })
    }

    async fn user_info(&self, wallet_id: u64) -> Result<UserProfile, ApiError> {
        self.record("user_info")?;
        Ok(UserProfile {
            username: Some("snow".to_string()),
            wallet_id: Some(wallet_id),
            details: Map::new(),
        })
    }

    async fn fetch_initial_assets(&self) -> Result<AssetMap, ApiError> {
        self.record("fetch_initial_assets")?;
        Ok([asset("ETH", "", 18), asset("PLR", "0xe3818504c1b32bf1557b16c238b2e01fd3149c17", 18)]
            .into_iter()
            .map(|asset| (asset.symbol.clone(), asset))
            .collect())
    }

    async fn fetch_rates(&self, symbols: &[String]) -> Result<Rates, ApiError> {
        self.record("fetch_rates")?;
        Ok(symbols
            .iter()
            .map(|symbol| {
                let rate: BTreeMap<String, f64> = [("USD".to_string(), 1.5)].into_iter().collect();
                (symbol.clone(), rate)
            })
            .collect())
    }
}
