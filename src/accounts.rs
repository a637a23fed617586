//! Accounts the wallet can transact as, and the manager enforcing exclusive activation.

use crate::smart_wallet::SmartWalletAccountRecord;

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    KeyBased,
    SmartWallet,
}

/// A persisted identity: a raw key-based address or a smart-wallet contract account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<SmartWalletAccountRecord>,
}

impl Account {
    pub fn key_based(address: &str, wallet_id: u64) -> Self {
        Self {
            id: address.to_string(),
            account_type: AccountType::KeyBased,
            is_active: true,
            wallet_id: Some(wallet_id),
            extra: None,
        }
    }

    /// Inactive smart-wallet account keyed by its contract address.
    pub fn smart_wallet(record: SmartWalletAccountRecord) -> Self {
        Self {
            id: record.address.clone(),
            account_type: AccountType::SmartWallet,
            is_active: false,
            wallet_id: None,
            extra: Some(record),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("Account not found: {0}")]
    NotFound(String),
}

/// Ordered account list for the current wallet. At most one account is active.
#[derive(Debug, Clone, Default)]
pub struct AccountList {
    accounts: Vec<Account>,
}

impl AccountList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.accounts.clear();
    }

    pub fn as_slice(&self) -> &[Account] {
        &self.accounts
    }

    pub fn to_vec(&self) -> Vec<Account> {
        self.accounts.clone()
    }

    pub fn active(&self) -> Option<&Account> {
        self.accounts.iter().find(|account| account.is_active)
    }

    pub fn has_type(&self, account_type: AccountType) -> bool {
        self.accounts
            .iter()
            .any(|account| account.account_type == account_type)
    }

    pub fn count_of(&self, account_type: AccountType) -> usize {
        self.accounts
            .iter()
            .filter(|account| account.account_type == account_type)
            .count()
    }

    /// Create a new active account, replacing any account with the same id.
    ///
    /// A new account whose type differs from existing accounts deactivates all of them, and
    /// since activation is exclusive the remaining accounts are deactivated either way.
    pub fn create_account(&mut self, account: Account) -> &Account {
        let differs = self
            .accounts
            .iter()
            .any(|existing| existing.account_type != account.account_type);
        if differs {
            debug!(
                "New {:?} account {} deactivates other account types",
                account.account_type, account.id
            );
        }
        for existing in &mut self.accounts {
            existing.is_active = false;
        }

        let account = Account {
            is_active: true,
            ..account
        };
        self.upsert(account)
    }

    /// Insert or replace an account without touching activation of any account.
    ///
    /// A replaced account keeps its current active flag; a new one starts inactive.
    pub fn register_inactive(&mut self, account: Account) -> &Account {
        let is_active = self
            .accounts
            .iter()
            .find(|existing| existing.id == account.id)
            .is_some_and(|existing| existing.is_active);
        let account = Account {
            is_active,
            ..account
        };
        self.upsert(account)
    }

    /// Make exactly one account active.
    pub fn activate(&mut self, id: &str) -> Result<&Account, AccountError> {
        let index = self
            .accounts
            .iter()
            .position(|account| account.id == id)
            .ok_or_else(|| AccountError::NotFound(id.to_string()))?;

        for (i, account) in self.accounts.iter_mut().enumerate() {
            account.is_active = i == index;
        }
        Ok(&self.accounts[index])
    }

    fn upsert(&mut self, account: Account) -> &Account {
        match self.accounts.iter().position(|a| a.id == account.id) {
            Some(index) => {
                self.accounts[index] = account;
                &self.accounts[index]
            }
            None => {
                self.accounts.push(account);
                let last = self.accounts.len() - 1;
                &self.accounts[last]
            }
        }
    }
}
