//! Notifications emitted during wallet registration.
//!
//! Every state change the orchestrator makes is published as an [`OnboardingEvent`] through an
//! [`EventDispatcher`]. UI layers, loggers and tests subscribe by registering handlers; the
//! orchestrator itself never reads them back.

use crate::accounts::Account;
use crate::api::{AssetMap, OAuthTokens, Rates, UserProfile};
use crate::onboarding::orchestrator::RegistrationStep;
use crate::onboarding::types::{RegistrationError, WalletState};
use crate::smart_wallet::{SmartWalletAccountRecord, UpgradeStatus};

use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserState {
    Registered,
}

/// Session fields updated during registration
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionUpdate {
    /// Push notification token registered with the backend.
    PushToken(String),
    /// The secure messaging channel has been set up.
    SignalInitiated(bool),
}

/// State-change notifications, in the order the orchestrator emits them
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnboardingEvent {
    AccountsUpdated(Vec<Account>),
    ContactsUpdated(Vec<Value>),
    InvitationsUpdated(Vec<Value>),
    AssetsUpdated(AssetMap),
    AppSettingsUpdated(Map<String, Value>),
    AccessTokensUpdated(Vec<Value>),
    HistorySet(Map<String, Value>),
    CollectiblesUpdated(Map<String, Value>),
    CollectiblesHistorySet(Map<String, Value>),
    WalletStateUpdated(WalletState),
    /// Carries only the address, never key material.
    EncryptedWalletGenerated {
        address: String,
    },
    OAuthTokensUpdated(OAuthTokens),
    SessionUpdated(SessionUpdate),
    UserUpdated {
        state: UserState,
        user: UserProfile,
    },
    AccountAdded(Account),
    RatesUpdated(Rates),
    InitialAssetsSet(AssetMap),
    SmartWalletSdkInitialized(bool),
    SmartWalletAccountsSet(Vec<SmartWalletAccountRecord>),
    SmartWalletUpgradeStatusSet(UpgradeStatus),
    /// Terminal failure; nothing follows it.
    RegistrationFailed {
        stage: RegistrationStep,
        reason: String,
    },
}

impl OnboardingEvent {
    /// Short name of the event, used for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            OnboardingEvent::AccountsUpdated(_) => "UPDATE_ACCOUNTS",
            OnboardingEvent::ContactsUpdated(_) => "UPDATE_CONTACTS",
            OnboardingEvent::InvitationsUpdated(_) => "UPDATE_INVITATIONS",
            OnboardingEvent::AssetsUpdated(_) => "UPDATE_ASSETS",
            OnboardingEvent::AppSettingsUpdated(_) => "UPDATE_APP_SETTINGS",
            OnboardingEvent::AccessTokensUpdated(_) => "UPDATE_ACCESS_TOKENS",
            OnboardingEvent::HistorySet(_) => "SET_HISTORY",
            OnboardingEvent::CollectiblesUpdated(_) => "UPDATE_COLLECTIBLES",
            OnboardingEvent::CollectiblesHistorySet(_) => "SET_COLLECTIBLES_TRANSACTION_HISTORY",
            OnboardingEvent::WalletStateUpdated(_) => "UPDATE_WALLET_STATE",
            OnboardingEvent::EncryptedWalletGenerated { .. } => "GENERATE_ENCRYPTED_WALLET",
            OnboardingEvent::OAuthTokensUpdated(_) => "UPDATE_OAUTH_TOKENS",
            OnboardingEvent::SessionUpdated(_) => "UPDATE_SESSION",
            OnboardingEvent::UserUpdated { .. } => "UPDATE_USER",
            OnboardingEvent::AccountAdded(_) => "ADD_ACCOUNT",
            OnboardingEvent::RatesUpdated(_) => "UPDATE_RATES",
            OnboardingEvent::InitialAssetsSet(_) => "SET_INITIAL_ASSETS",
            OnboardingEvent::SmartWalletSdkInitialized(_) => "SET_SMART_WALLET_SDK_INIT",
            OnboardingEvent::SmartWalletAccountsSet(_) => "SET_SMART_WALLET_ACCOUNTS",
            OnboardingEvent::SmartWalletUpgradeStatusSet(_) => "SET_SMART_WALLET_UPGRADE_STATUS",
            OnboardingEvent::RegistrationFailed { .. } => "REGISTRATION_FAILED",
        }
    }
}

/// Trait for handling onboarding events.
///
/// Implementors receive every event in emission order.
#[async_trait::async_trait]
pub trait OnboardingEventHandler: Send + Sync {
    /// Handle an onboarding event.
    async fn handle(&mut self, event: &OnboardingEvent) -> Result<(), RegistrationError>;

    /// Get the name of this handler for logging and diagnostics.
    fn name(&self) -> &'static str;
}

/// Event dispatcher that manages multiple event handlers.
///
/// Handlers are independent: one failing does not keep the others from seeing the event.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Box<dyn OnboardingEventHandler>>,
}

impl EventDispatcher {
    /// Create a new, empty event dispatcher.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register a new event handler.
    ///
    /// Handlers are called in the order they are registered.
    pub fn register_handler(&mut self, handler: Box<dyn OnboardingEventHandler>) {
        self.handlers.push(handler);
    }

    /// Dispatch an event to all registered handlers.
    ///
    /// Errors from handlers are logged, but do not stop other handlers from running.
    pub async fn dispatch(&mut self, event: &OnboardingEvent) -> Result<(), RegistrationError> {
        for handler in &mut self.handlers {
            if let Err(e) = handler.handle(event).await {
                error!("Handler {} failed to process event: {}", handler.name(), e);
            }
        }
        Ok(())
    }
}

/// Shared, cloneable record of dispatched events
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<OnboardingEvent>>>);

impl EventLog {
    pub fn snapshot(&self) -> Vec<OnboardingEvent> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.snapshot().iter().map(OnboardingEvent::kind).collect()
    }

    fn push(&self, event: OnboardingEvent) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

/// Records every event into an [`EventLog`]
pub struct RecordingHandler {
    log: EventLog,
}

impl RecordingHandler {
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }
}

#[async_trait::async_trait]
impl OnboardingEventHandler for RecordingHandler {
    async fn handle(&mut self, event: &OnboardingEvent) -> Result<(), RegistrationError> {
        self.log.push(event.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "RecordingHandler"
    }
}

/// Forwards events to a channel, e.g. the UI task
pub struct ChannelHandler {
    sender: UnboundedSender<OnboardingEvent>,
}

impl ChannelHandler {
    pub fn new(sender: UnboundedSender<OnboardingEvent>) -> Self {
        Self { sender }
    }
}

#[async_trait::async_trait]
impl OnboardingEventHandler for ChannelHandler {
    async fn handle(&mut self, event: &OnboardingEvent) -> Result<(), RegistrationError> {
        // a closed receiver only means nobody is listening anymore
        self.sender
            .send(event.clone())
            .map_err(|_| RegistrationError::HandlerError("event receiver closed".to_string()))
    }

    fn name(&self) -> &'static str {
        "ChannelHandler"
    }
}

/// Logs each event at info level
pub struct LoggingHandler;

#[async_trait::async_trait]
impl OnboardingEventHandler for LoggingHandler {
    async fn handle(&mut self, event: &OnboardingEvent) -> Result<(), RegistrationError> {
        match event {
            OnboardingEvent::WalletStateUpdated(state) => {
                info!("{} -> {:?}", event.kind(), state)
            }
            OnboardingEvent::RegistrationFailed { stage, reason } => {
                error!("{} at {:?}: {}", event.kind(), stage, reason)
            }
            _ => info!("{}", event.kind()),
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "LoggingHandler"
    }
}
