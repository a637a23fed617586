//! Runtime configuration for onboarding.

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

const DEFAULT_API_URL: &str = "http://localhost:8080/";
const DEFAULT_DATA_DIR: &str = "onboarding_data";
const DEFAULT_RETRY_SECS: u64 = 30;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {name}")]
    InvalidValue { name: &'static str, value: String },
}

/// Settings shared by the registration orchestrator and the backend client
#[derive(Debug, Clone, PartialEq)]
pub struct OnboardingConfig {
    /// Whether registration also sets up smart-wallet accounts.
    pub smart_wallet_enabled: bool,
    pub api_url: String,
    pub data_dir: PathBuf,
    /// Upper bound on the time spent retrying one backend request.
    pub max_retry_elapsed: Duration,
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            smart_wallet_enabled: false,
            api_url: DEFAULT_API_URL.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            max_retry_elapsed: Duration::from_secs(DEFAULT_RETRY_SECS),
        }
    }
}

impl OnboardingConfig {
    /// Load configuration from environment variables, falling back to defaults.
    ///
    /// ```bash
    /// ONBOARDING_API_URL=https://api.example.com/ SMART_WALLET_ENABLED=true wallet-onboarding ...
    /// ```
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("ONBOARDING_API_URL") {
            config.api_url = url;
        }
        if let Some(dir) = lookup("ONBOARDING_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(flag) = lookup("SMART_WALLET_ENABLED") {
            config.smart_wallet_enabled = parse_flag("SMART_WALLET_ENABLED", &flag)?;
        }
        if let Some(secs) = lookup("ONBOARDING_MAX_RETRY_SECS") {
            let secs = secs.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                name: "ONBOARDING_MAX_RETRY_SECS",
                value: secs.clone(),
            })?;
            config.max_retry_elapsed = Duration::from_secs(secs);
        }

        info!(
            "Onboarding config: api {}, data dir {}, smart wallet {}",
            config.api_url,
            config.data_dir.display(),
            if config.smart_wallet_enabled { "enabled" } else { "disabled" }
        );
        Ok(config)
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn missing_variables_keep_defaults() {
        let config = OnboardingConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, OnboardingConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let config = OnboardingConfig::from_lookup(lookup(&[
            ("ONBOARDING_API_URL", "https://api.example.com/"),
            ("ONBOARDING_DATA_DIR", "/tmp/onboarding"),
            ("SMART_WALLET_ENABLED", "TRUE"),
            ("ONBOARDING_MAX_RETRY_SECS", "5"),
        ]))
        .unwrap();

        assert!(config.smart_wallet_enabled);
        assert_eq!(config.api_url, "https://api.example.com/");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/onboarding"));
        assert_eq!(config.max_retry_elapsed, Duration::from_secs(5));
    }

    #[test]
    fn rejects_unparseable_flag() {
        let result = OnboardingConfig::from_lookup(lookup(&[("SMART_WALLET_ENABLED", "maybe")]));
        assert_eq!(
            result,
            Err(ConfigError::InvalidValue {
                name: "SMART_WALLET_ENABLED",
                value: "maybe".to_string()
            })
        );
    }
}
