//! Wallet onboarding core.
//!
//! Registers new and imported wallets with the backend, wires up smart-wallet accounts, and
//! normalizes smart-wallet transaction history into canonical records.

pub mod accounts;
pub mod api;
pub mod config;
pub mod history;
pub mod onboarding;
pub mod smart_wallet;
pub mod storage;
pub mod utils;

pub use config::{ConfigError, OnboardingConfig};
