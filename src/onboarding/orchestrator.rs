//! Registration orchestrator and integration point for all onboarding services.
//!
//! This module defines the `RegistrationOrchestrator`, which takes a wallet from the data collected
//! during onboarding to a registered, persisted and usable account. It builds a step plan for the
//! given input, runs the steps in order and publishes every state change through the event
//! dispatcher.
//!
//! The orchestrator is responsible for:
//! - Generating or importing the wallet and encrypting it under the user's pin
//! - Registering the wallet with the backend and storing the returned credentials
//! - Creating the key-based account and, when enabled, wiring up smart-wallet accounts
//! - Tracking the wallet state machine and reporting a single failure notification on error
//!
//! Steps are not transactional. A failing step stops the run; anything emitted or written before
//! it stays in place.

use crate::accounts::{Account, AccountList};
use crate::api::{BackendApi, RegisteredWallet, RegistrationRequest, UpdateUserRequest, UserProfile};
use crate::config::OnboardingConfig;
use crate::onboarding::{
    events::{
        ChannelHandler, EventDispatcher, LoggingHandler, OnboardingEvent, OnboardingEventHandler,
        SessionUpdate, UserState,
    },
    progress_tracker::WalletStateTracker,
    services::{KeyService, PushTokenProvider},
    state_persistence::OnboardingPersistence,
    types::{RegistrationError, StoredWallet, Wallet, WalletOnboardingState, WalletState},
};
use crate::smart_wallet::{SmartWalletConnection, SmartWalletError, UpgradeStatus};
use crate::storage::Storage;

use serde::Serialize;
use serde_json::Map;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// One unit of work in a registration run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStep {
    ResetCollections,
    GenerateWallet,
    EncryptWallet,
    RegisterWallet,
    FetchProfile,
    InitSecureMessaging,
    AddKeyBasedAccount,
    FetchRatesAndAssets,
    SetupSmartWallet,
    Finalize,
}

/// Build the ordered list of steps for the given onboarding input.
///
/// Imported wallets skip generation, and the smart-wallet step only runs when the feature is on.
pub fn registration_plan(
    state: &WalletOnboardingState,
    config: &OnboardingConfig,
) -> Vec<RegistrationStep> {
    let mut plan = vec![RegistrationStep::ResetCollections];
    if state.imported_wallet.is_none() {
        plan.push(RegistrationStep::GenerateWallet);
    }
    plan.extend([
        RegistrationStep::EncryptWallet,
        RegistrationStep::RegisterWallet,
        RegistrationStep::FetchProfile,
        RegistrationStep::InitSecureMessaging,
        RegistrationStep::AddKeyBasedAccount,
        RegistrationStep::FetchRatesAndAssets,
    ]);
    if config.smart_wallet_enabled {
        plan.push(RegistrationStep::SetupSmartWallet);
    }
    plan.push(RegistrationStep::Finalize);
    plan
}

/// Result of a successful registration
#[derive(Debug, Clone)]
pub struct RegistrationOutcome {
    pub address: String,
    pub user_id: u64,
    pub wallet_id: u64,
    pub user: UserProfile,
    pub accounts: Vec<Account>,
    pub upgrade_status: Option<UpgradeStatus>,
}

/// Values produced by earlier steps and consumed by later ones
#[derive(Default)]
struct RegistrationContext {
    wallet: Option<Wallet>,
    registered: Option<RegisteredWallet>,
    user: Option<UserProfile>,
}

/// Main registration orchestrator that coordinates all onboarding components.
///
/// An orchestrator owns its smart-wallet connection and account list, so runs on the same
/// instance are sequential by construction.
pub struct RegistrationOrchestrator {
    // Collaborators
    key_service: Arc<dyn KeyService>,
    api: Arc<dyn BackendApi>,
    push_tokens: Option<Arc<dyn PushTokenProvider>>,
    smart_wallet: Option<SmartWalletConnection>,

    // Services
    persistence: OnboardingPersistence,
    dispatcher: EventDispatcher,
    tracker: WalletStateTracker,

    accounts: AccountList,
    upgrade_status: Option<UpgradeStatus>,
    config: OnboardingConfig,
}

impl RegistrationOrchestrator {
    pub fn new(
        key_service: Arc<dyn KeyService>,
        api: Arc<dyn BackendApi>,
        storage: Arc<dyn Storage>,
        config: OnboardingConfig,
    ) -> Self {
        let mut dispatcher = EventDispatcher::new();
        dispatcher.register_handler(Box::new(LoggingHandler));

        Self {
            key_service,
            api,
            push_tokens: None,
            smart_wallet: None,
            persistence: OnboardingPersistence::new(storage),
            dispatcher,
            tracker: WalletStateTracker::new(),
            accounts: AccountList::new(),
            upgrade_status: None,
            config,
        }
    }

    pub fn with_push_tokens(mut self, provider: Arc<dyn PushTokenProvider>) -> Self {
        self.push_tokens = Some(provider);
        self
    }

    pub fn with_smart_wallet(mut self, connection: SmartWalletConnection) -> Self {
        self.smart_wallet = Some(connection);
        self
    }

    /// Start from a known upgrade status, e.g. one restored from a previous session.
    pub fn with_upgrade_status(mut self, status: UpgradeStatus) -> Self {
        self.upgrade_status = Some(status);
        self
    }

    pub fn register_handler(&mut self, handler: Box<dyn OnboardingEventHandler>) {
        self.dispatcher.register_handler(handler);
    }

    pub fn wallet_state(&self) -> WalletState {
        self.tracker.current()
    }

    pub fn accounts(&self) -> &AccountList {
        &self.accounts
    }

    pub fn upgrade_status(&self) -> Option<UpgradeStatus> {
        self.upgrade_status
    }

    /// Run the full registration sequence for `state`.
    ///
    /// On failure the wallet state becomes `Failed`, a single `RegistrationFailed` event is
    /// emitted and the error is returned. Nothing done before the failing step is undone.
    pub async fn register_wallet(
        &mut self,
        state: &WalletOnboardingState,
    ) -> Result<RegistrationOutcome, RegistrationError> {
        let plan = registration_plan(state, &self.config);
        info!("Starting wallet registration with {} steps", plan.len());

        self.tracker = WalletStateTracker::new();
        let mut ctx = RegistrationContext {
            wallet: state.imported_wallet.clone(),
            ..RegistrationContext::default()
        };

        for step in plan {
            info!("Running registration step {:?}", step);
            if let Err(e) = self.run_step(step, state, &mut ctx).await {
                error!("Registration failed at {:?}: {}", step, e);
                self.tracker.fail();
                let failed = OnboardingEvent::RegistrationFailed {
                    stage: step,
                    reason: e.to_string(),
                };
                if let Err(dispatch_error) = self.emit(failed).await {
                    error!("Failed to report registration failure: {}", dispatch_error);
                }
                return Err(e);
            }
        }

        self.tracker.log_summary();

        let wallet = ctx
            .wallet
            .ok_or(RegistrationError::MissingStepInput(RegistrationStep::Finalize))?;
        let registered = ctx
            .registered
            .ok_or(RegistrationError::MissingStepInput(RegistrationStep::Finalize))?;

        Ok(RegistrationOutcome {
            address: wallet.address,
            user_id: registered.user_id,
            wallet_id: registered.wallet_id,
            user: ctx.user.unwrap_or_default(),
            accounts: self.accounts.to_vec(),
            upgrade_status: self.upgrade_status,
        })
    }

    /// Run the registration on a tokio task.
    ///
    /// Returns the task handle and a receiver for the events of the run. Aborting the handle is
    /// the only way to cancel; steps already completed are not undone.
    pub fn spawn(
        mut self,
        state: WalletOnboardingState,
    ) -> (
        JoinHandle<Result<RegistrationOutcome, RegistrationError>>,
        UnboundedReceiver<OnboardingEvent>,
    ) {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.register_handler(Box::new(ChannelHandler::new(sender)));

        let handle = tokio::spawn(async move { self.register_wallet(&state).await });
        (handle, receiver)
    }

    async fn run_step(
        &mut self,
        step: RegistrationStep,
        state: &WalletOnboardingState,
        ctx: &mut RegistrationContext,
    ) -> Result<(), RegistrationError> {
        match step {
            RegistrationStep::ResetCollections => self.reset_collections().await,
            RegistrationStep::GenerateWallet => self.generate_wallet(state, ctx).await,
            RegistrationStep::EncryptWallet => self.encrypt_wallet(state, ctx).await,
            RegistrationStep::RegisterWallet => self.register_remotely(state, ctx).await,
            RegistrationStep::FetchProfile => self.fetch_profile(state, ctx).await,
            RegistrationStep::InitSecureMessaging => {
                self.emit(OnboardingEvent::SessionUpdated(
                    SessionUpdate::SignalInitiated(true),
                ))
                .await
            }
            RegistrationStep::AddKeyBasedAccount => self.add_key_based_account(ctx).await,
            RegistrationStep::FetchRatesAndAssets => self.fetch_rates_and_assets().await,
            RegistrationStep::SetupSmartWallet => self.setup_smart_wallet(ctx).await,
            RegistrationStep::Finalize => self.set_wallet_state(WalletState::Decrypted).await,
        }
    }

    async fn emit(&mut self, event: OnboardingEvent) -> Result<(), RegistrationError> {
        self.dispatcher.dispatch(&event).await
    }

    async fn set_wallet_state(&mut self, to: WalletState) -> Result<(), RegistrationError> {
        self.tracker.transition(to)?;
        self.emit(OnboardingEvent::WalletStateUpdated(to)).await
    }

    /// Clear every collection a previous session may have left behind.
    async fn reset_collections(&mut self) -> Result<(), RegistrationError> {
        self.accounts.reset();

        let resets = [
            OnboardingEvent::AccountsUpdated(Vec::new()),
            OnboardingEvent::ContactsUpdated(Vec::new()),
            OnboardingEvent::InvitationsUpdated(Vec::new()),
            OnboardingEvent::AssetsUpdated(Default::default()),
            OnboardingEvent::AppSettingsUpdated(Map::new()),
            OnboardingEvent::AccessTokensUpdated(Vec::new()),
            OnboardingEvent::HistorySet(Map::new()),
            OnboardingEvent::CollectiblesUpdated(Map::new()),
            OnboardingEvent::CollectiblesHistorySet(Map::new()),
        ];
        for event in resets {
            self.emit(event).await?;
        }
        Ok(())
    }

    async fn generate_wallet(
        &mut self,
        state: &WalletOnboardingState,
        ctx: &mut RegistrationContext,
    ) -> Result<(), RegistrationError> {
        self.set_wallet_state(WalletState::Generating).await?;

        let wallet = self.key_service.generate(&state.generation_secret()).await?;
        info!("Generated wallet {}", wallet.address);
        ctx.wallet = Some(wallet);
        Ok(())
    }

    async fn encrypt_wallet(
        &mut self,
        state: &WalletOnboardingState,
        ctx: &mut RegistrationContext,
    ) -> Result<(), RegistrationError> {
        self.set_wallet_state(WalletState::Encrypting).await?;

        let wallet = ctx
            .wallet
            .as_ref()
            .ok_or(RegistrationError::MissingStepInput(RegistrationStep::EncryptWallet))?;
        let secret = state.encryption_secret();
        let encrypted = self.key_service.encrypt(wallet, &secret).await?;

        let stored = StoredWallet {
            address: wallet.address.clone(),
            encrypted,
        };
        self.persistence.save_wallet(&stored).await?;

        self.emit(OnboardingEvent::EncryptedWalletGenerated {
            address: stored.address,
        })
        .await
    }

    async fn register_remotely(
        &mut self,
        state: &WalletOnboardingState,
        ctx: &mut RegistrationContext,
    ) -> Result<(), RegistrationError> {
        self.set_wallet_state(WalletState::Registering).await?;

        let address = ctx
            .wallet
            .as_ref()
            .map(|wallet| wallet.address.clone())
            .ok_or(RegistrationError::MissingStepInput(RegistrationStep::RegisterWallet))?;

        let fcm_token = match &self.push_tokens {
            Some(provider) => provider.push_token().await,
            None => None,
        };
        let request = RegistrationRequest {
            address,
            fcm_token: fcm_token.clone(),
            username: state.api_user.username.clone(),
        };
        let registered = self.api.register_on_auth_server(&request).await?;
        info!(
            "Wallet registered as user {} (wallet {})",
            registered.user_id, registered.wallet_id
        );

        let tokens = registered.oauth_tokens();
        self.persistence.save_oauth_tokens(&tokens).await?;
        self.emit(OnboardingEvent::OAuthTokensUpdated(tokens)).await?;

        if let Some(token) = fcm_token {
            self.emit(OnboardingEvent::SessionUpdated(SessionUpdate::PushToken(token)))
                .await?;
        }

        ctx.registered = Some(registered);
        Ok(())
    }

    async fn fetch_profile(
        &mut self,
        state: &WalletOnboardingState,
        ctx: &mut RegistrationContext,
    ) -> Result<(), RegistrationError> {
        let wallet_id = ctx
            .registered
            .as_ref()
            .map(|registered| registered.wallet_id)
            .ok_or(RegistrationError::MissingStepInput(RegistrationStep::FetchProfile))?;

        let user = match &state.api_user.username {
            Some(username) => {
                let request = UpdateUserRequest {
                    wallet_id,
                    username: Some(username.clone()),
                };
                self.api.update_user(&request).await?
            }
            None => self.api.user_info(wallet_id).await?,
        };

        self.emit(OnboardingEvent::UserUpdated {
            state: UserState::Registered,
            user: user.clone(),
        })
        .await?;
        self.persistence.save_user(&user).await?;

        ctx.user = Some(user);
        Ok(())
    }

    async fn add_key_based_account(
        &mut self,
        ctx: &mut RegistrationContext,
    ) -> Result<(), RegistrationError> {
        let (address, wallet_id) = match (&ctx.wallet, &ctx.registered) {
            (Some(wallet), Some(registered)) => (wallet.address.clone(), registered.wallet_id),
            _ => {
                return Err(RegistrationError::MissingStepInput(
                    RegistrationStep::AddKeyBasedAccount,
                ));
            }
        };

        let account = self
            .accounts
            .create_account(Account::key_based(&address, wallet_id))
            .clone();
        self.persistence.save_accounts(self.accounts.as_slice()).await?;

        self.emit(OnboardingEvent::AccountAdded(account)).await
    }

    async fn fetch_rates_and_assets(&mut self) -> Result<(), RegistrationError> {
        let assets = self.api.fetch_initial_assets().await?;
        let symbols: Vec<String> = assets.keys().cloned().collect();
        let rates = self.api.fetch_rates(&symbols).await?;

        self.emit(OnboardingEvent::RatesUpdated(rates)).await?;
        self.emit(OnboardingEvent::InitialAssetsSet(assets.clone()))
            .await?;
        self.persistence.save_initial_assets(&assets).await
    }

    /// Connect the smart-wallet SDK, import its accounts and activate a lone new account.
    async fn setup_smart_wallet(
        &mut self,
        ctx: &mut RegistrationContext,
    ) -> Result<(), RegistrationError> {
        let wallet = ctx
            .wallet
            .as_ref()
            .ok_or(RegistrationError::MissingStepInput(RegistrationStep::SetupSmartWallet))?;

        let records = {
            let connection = self
                .smart_wallet
                .as_mut()
                .ok_or(SmartWalletError::NotConnected)?;
            connection.connect(&wallet.private_key).await?;
            match connection.accounts().await {
                Ok(records) => records,
                Err(e) => {
                    // next attempt re-initialises the SDK
                    connection.disconnect();
                    return Err(e.into());
                }
            }
        };
        info!("Smart wallet SDK returned {} accounts", records.len());

        self.emit(OnboardingEvent::SmartWalletSdkInitialized(true))
            .await?;
        self.emit(OnboardingEvent::SmartWalletAccountsSet(records.clone()))
            .await?;

        for record in &records {
            self.accounts
                .register_inactive(Account::smart_wallet(record.clone()));
        }
        self.persistence.save_accounts(self.accounts.as_slice()).await?;
        self.emit(OnboardingEvent::AccountsUpdated(self.accounts.to_vec()))
            .await?;

        if let [record] = records.as_slice() {
            if self.upgrade_status.is_none() {
                self.accounts.activate(&record.address)?;
                self.persistence.save_accounts(self.accounts.as_slice()).await?;
                self.emit(OnboardingEvent::AccountsUpdated(self.accounts.to_vec()))
                    .await?;

                self.upgrade_status = Some(UpgradeStatus::AccountCreated);
                self.emit(OnboardingEvent::SmartWalletUpgradeStatusSet(
                    UpgradeStatus::AccountCreated,
                ))
                .await?;
            }
        }
        Ok(())
    }
}
