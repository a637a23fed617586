//! Types for the wallet backend REST API

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Asset metadata as served by the backend and used for token lookups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Ticker symbol, e.g. `ETH` or `PLR`.
    pub symbol: String,
    /// Human readable name.
    pub name: String,
    /// Token contract address; empty for the native coin.
    #[serde(default)]
    pub address: String,
    /// Number of decimals of the base unit.
    pub decimals: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// Assets keyed by symbol.
pub type AssetMap = BTreeMap<String, Asset>;

/// Exchange rates keyed by asset symbol, then fiat currency code.
pub type Rates = BTreeMap<String, BTreeMap<String, f64>>;

/// Payload sent when registering a wallet's public identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fcm_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Identity and credentials returned by a successful registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredWallet {
    pub user_id: u64,
    pub wallet_id: u64,
    pub access_token: String,
    pub refresh_token: String,
}

impl RegisteredWallet {
    /// The OAuth token pair carried by this registration.
    pub fn oauth_tokens(&self) -> OAuthTokens {
        OAuthTokens {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

/// OAuth access/refresh token pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Partial remote profile captured during onboarding, e.g. the chosen username.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Request body for updating a user after registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub wallet_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Remote user profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_id: Option<u64>,
    /// Any other profile fields, passed through untouched.
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

/// Error types for backend API calls
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {endpoint}")]
    StatusError { endpoint: String, status: u16 },

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(String),

    #[error("Not registered: {0}")]
    Unauthorized(String),
}
