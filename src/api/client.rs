//!
//! REST client for the wallet backend.
//!
//! Provides the `BackendApi` seam used by the registration orchestrator and an HTTP
//! implementation of it. Transient failures (connection errors, 5xx responses) are retried
//! with exponential backoff here, so callers see one result per call.

use super::types::*;
use crate::config::OnboardingConfig;
use backoff::{ExponentialBackoff, future::retry};
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Backend operations needed to register a wallet and hydrate initial state
#[async_trait::async_trait]
pub trait BackendApi: Send + Sync {
	/// Register the wallet's public identity, returning ids and an OAuth token pair.
	async fn register_on_auth_server(
		&self,
		request: &RegistrationRequest,
	) -> Result<RegisteredWallet, ApiError>;

	async fn update_user(&self, request: &UpdateUserRequest) -> Result<UserProfile, ApiError>;

	async fn user_info(&self, wallet_id: u64) -> Result<UserProfile, ApiError>;

	async fn fetch_initial_assets(&self) -> Result<AssetMap, ApiError>;

	async fn fetch_rates(&self, symbols: &[String]) -> Result<Rates, ApiError>;
}

/// HTTP implementation of `BackendApi`
pub struct HttpBackendClient {
	/// The underlying HTTP client.
	http_client: Client,
	/// Base URL every endpoint is joined onto.
	base_url: Url,
	/// Bearer token, available once the wallet is registered.
	access_token: RwLock<Option<String>>,
	/// Upper bound on the time spent retrying a single call.
	max_retry_elapsed: Duration,
}

impl HttpBackendClient {
	/// Create a new backend client.
	///
	/// # Arguments
	/// * `base_url` - The API root, e.g. `https://api.example.com/`.
	/// * `max_retry_elapsed` - Retry budget per call for transient failures.
	pub fn new(base_url: &str, max_retry_elapsed: Duration) -> Result<Self, ApiError> {
		let http_client = Client::builder().timeout(Duration::from_secs(30)).build()?;

		// Url::join drops the last segment unless the base ends with a slash
		let normalized = if base_url.ends_with('/') {
			base_url.to_string()
		} else {
			format!("{}/", base_url)
		};
		let base_url = Url::parse(&normalized)
			.map_err(|e| ApiError::UrlError(format!("{}: {}", base_url, e)))?;

		Ok(Self {
			http_client,
			base_url,
			access_token: RwLock::new(None),
			max_retry_elapsed,
		})
	}

	/// Create a client for the configured API URL and retry budget.
	pub fn from_config(config: &OnboardingConfig) -> Result<Self, ApiError> {
		Self::new(&config.api_url, config.max_retry_elapsed)
	}

	/// Use an access token obtained elsewhere, e.g. restored from storage.
	pub async fn set_access_token(&self, token: Option<String>) {
		*self.access_token.write().await = token;
	}

	fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
		self.base_url
			.join(path)
			.map_err(|e| ApiError::UrlError(format!("{}: {}", path, e)))
	}

	async fn bearer_token(&self, endpoint: &str) -> Result<String, ApiError> {
		self.access_token
			.read()
			.await
			.clone()
			.ok_or_else(|| ApiError::Unauthorized(endpoint.to_string()))
	}

	/// Execute a JSON request, retrying transient failures.
	async fn execute<T: DeserializeOwned>(
		&self,
		method: Method,
		url: Url,
		token: Option<&str>,
		body: Option<&Value>,
	) -> Result<T, ApiError> {
		let backoff = ExponentialBackoff {
			max_elapsed_time: Some(self.max_retry_elapsed),
			..ExponentialBackoff::default()
		};
		let client = &self.http_client;
		let method = &method;
		let url = &url;

		retry(backoff, || async move {
			let mut request = client.request(method.clone(), url.clone());
			if let Some(token) = token {
				request = request.bearer_auth(token);
			}
			if let Some(body) = body {
				request = request.json(body);
			}

			let response = request.send().await.map_err(|e| {
				warn!("Request to {} failed: {}", url, e);
				backoff::Error::transient(ApiError::HttpError(e))
			})?;

			let status = response.status();
			if !status.is_success() {
				let error = ApiError::StatusError {
					endpoint: url.path().to_string(),
					status: status.as_u16(),
				};
				if status.is_server_error() {
					warn!("Server error from {}: {}", url, status);
					return Err(backoff::Error::transient(error));
				}
				return Err(backoff::Error::permanent(error));
			}

			response
				.json::<T>()
				.await
				.map_err(|e| backoff::Error::permanent(ApiError::HttpError(e)))
		})
		.await
	}
}

#[async_trait::async_trait]
impl BackendApi for HttpBackendClient {
	async fn register_on_auth_server(
		&self,
		request: &RegistrationRequest,
	) -> Result<RegisteredWallet, ApiError> {
		info!("Registering wallet {} on auth server", request.address);

		let body = serde_json::to_value(request)?;
		let registered: RegisteredWallet = self
			.execute(Method::POST, self.endpoint("wallet/register")?, None, Some(&body))
			.await?;

		self.set_access_token(Some(registered.access_token.clone()))
			.await;
		info!(
			"Registered user {} with wallet {}",
			registered.user_id, registered.wallet_id
		);
		Ok(registered)
	}

	async fn update_user(&self, request: &UpdateUserRequest) -> Result<UserProfile, ApiError> {
		let token = self.bearer_token("user/update").await?;
		let body = serde_json::to_value(request)?;
		self.execute(
			Method::POST,
			self.endpoint("user/update")?,
			Some(&token),
			Some(&body),
		)
		.await
	}

	async fn user_info(&self, wallet_id: u64) -> Result<UserProfile, ApiError> {
		let token = self.bearer_token("user/info").await?;
		let mut url = self.endpoint("user/info")?;
		url.query_pairs_mut()
			.append_pair("walletId", &wallet_id.to_string());
		self.execute(Method::GET, url, Some(&token), None).await
	}

	async fn fetch_initial_assets(&self) -> Result<AssetMap, ApiError> {
		let token = self.bearer_token("asset/defaults").await?;
		let assets: Vec<Asset> = self
			.execute(
				Method::GET,
				self.endpoint("asset/defaults")?,
				Some(&token),
				None,
			)
			.await?;

		debug!("Fetched {} default assets", assets.len());
		Ok(assets
			.into_iter()
			.map(|asset| (asset.symbol.clone(), asset))
			.collect())
	}

	async fn fetch_rates(&self, symbols: &[String]) -> Result<Rates, ApiError> {
		let mut url = self.endpoint("rates")?;
		url.query_pairs_mut()
			.append_pair("symbols", &symbols.join(","));
		debug!("Fetching rates for {:?}", symbols);
		self.execute(Method::GET, url, None, None).await
	}
}
