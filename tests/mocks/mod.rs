#![allow(dead_code)]

pub mod mock_backend_api;
pub mod mock_key_service;
pub mod mock_smart_wallet_sdk;
pub mod mock_storage;

pub use mock_backend_api::MockBackendApi;
pub use mock_key_service::{MockKeyService, MockPushTokens};
pub use mock_smart_wallet_sdk::MockSmartWalletSdk;
pub use mock_storage::FailingStorage;
