use super::{DeploymentErrorKind, UpgradeStatus};
use crate::accounts::{Account, AccountType};
use crate::history::TransactionStatus;

use serde::{Deserialize, Serialize};

/// Title and body shown when sending is not possible yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockedMessage {
    pub title: String,
    pub message: String,
}

/// Upgrade progress as tracked by the app.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmartWalletUpgradeState {
    pub status: Option<UpgradeStatus>,
    /// Status of each asset transfer submitted while moving funds to the smart wallet.
    pub transfer_transactions: Vec<TransactionStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmartWalletStatus {
    pub has_account: bool,
    pub status: Option<UpgradeStatus>,
    pub sending_blocked_message: Option<BlockedMessage>,
}

pub fn user_has_smart_wallet(accounts: &[Account]) -> bool {
    accounts
        .iter()
        .any(|account| account.account_type == AccountType::SmartWallet)
}

/// Summarise the smart-wallet situation of the given accounts.
pub fn smart_wallet_status(
    accounts: &[Account],
    upgrade: &SmartWalletUpgradeState,
) -> SmartWalletStatus {
    let is_smart_wallet_active = accounts
        .iter()
        .find(|account| account.is_active)
        .is_some_and(|account| account.account_type == AccountType::SmartWallet);

    SmartWalletStatus {
        has_account: user_has_smart_wallet(accounts),
        status: upgrade.status,
        sending_blocked_message: blocked_message(upgrade, is_smart_wallet_active),
    }
}

fn blocked_message(
    upgrade: &SmartWalletUpgradeState,
    is_smart_wallet_active: bool,
) -> Option<BlockedMessage> {
    match upgrade.status? {
        UpgradeStatus::AccountCreated if is_smart_wallet_active => Some(BlockedMessage {
            title: "To send assets, deploy Smart Wallet first".to_string(),
            message: "You will have to pay a small fee".to_string(),
        }),
        UpgradeStatus::Deploying if is_smart_wallet_active => Some(BlockedMessage {
            title: "Smart Wallet is being deployed now".to_string(),
            message: "You will be able to send assets once it's deployed.\nCurrent average waiting time is 4 mins"
                .to_string(),
        }),
        UpgradeStatus::TransferringAssets => {
            let total = upgrade.transfer_transactions.len();
            let complete = upgrade
                .transfer_transactions
                .iter()
                .filter(|status| **status == TransactionStatus::Confirmed)
                .count();
            let deploy_note = if is_smart_wallet_active {
                " and Smart Wallet is deployed"
            } else {
                ""
            };
            Some(BlockedMessage {
                title: "Assets are being transferred to Smart Wallet".to_string(),
                message: format!(
                    "You will be able to send assets once submitted transfer is complete{}.\nCurrently {} of {} assets are transferred.",
                    deploy_note, complete, total
                ),
            })
        }
        _ => None,
    }
}

pub fn deploy_error_message(kind: DeploymentErrorKind) -> BlockedMessage {
    let message = match kind {
        DeploymentErrorKind::InsufficientFunds => "You need to top up your Smart Account first",
        _ => {
            "There was an error on our server. Please try to re-deploy the account by clicking the button below"
        }
    };
    BlockedMessage {
        title: "Smart Wallet deployment failed".to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smart_wallet::SmartWalletAccountRecord;

    fn accounts(smart_wallet_active: bool) -> Vec<Account> {
        let mut key_based = Account::key_based("0x9c", 2);
        key_based.is_active = !smart_wallet_active;
        let mut smart = Account::smart_wallet(SmartWalletAccountRecord {
            id: 1,
            address: "0xsw".into(),
            deploy_mode: None,
            ens_name: None,
            state: None,
            next_state: None,
            updated_at: None,
        });
        smart.is_active = smart_wallet_active;
        vec![key_based, smart]
    }

    #[test]
    fn account_created_blocks_only_active_smart_wallet() {
        let upgrade = SmartWalletUpgradeState {
            status: Some(UpgradeStatus::AccountCreated),
            ..Default::default()
        };

        let active = smart_wallet_status(&accounts(true), &upgrade);
        assert!(active.has_account);
        assert_eq!(
            active.sending_blocked_message.unwrap().title,
            "To send assets, deploy Smart Wallet first"
        );

        let inactive = smart_wallet_status(&accounts(false), &upgrade);
        assert!(inactive.sending_blocked_message.is_none());
    }

    #[test]
    fn deploying_message_includes_waiting_time() {
        let upgrade = SmartWalletUpgradeState {
            status: Some(UpgradeStatus::Deploying),
            ..Default::default()
        };

        let blocked = smart_wallet_status(&accounts(true), &upgrade)
            .sending_blocked_message
            .unwrap();
        assert_eq!(blocked.title, "Smart Wallet is being deployed now");
        assert_eq!(
            blocked.message,
            "You will be able to send assets once it's deployed.\nCurrent average waiting time is 4 mins"
        );
    }

    #[test]
    fn transfer_message_counts_confirmed_transfers() {
        let upgrade = SmartWalletUpgradeState {
            status: Some(UpgradeStatus::TransferringAssets),
            transfer_transactions: vec![
                TransactionStatus::Confirmed,
                TransactionStatus::Pending,
                TransactionStatus::Confirmed,
            ],
        };

        let status = smart_wallet_status(&accounts(false), &upgrade);
        let message = status.sending_blocked_message.unwrap().message;
        assert!(message.ends_with("Currently 2 of 3 assets are transferred."));
        assert!(!message.contains("and Smart Wallet is deployed"));
    }

    #[test]
    fn no_status_means_nothing_blocked() {
        let status = smart_wallet_status(&[], &SmartWalletUpgradeState::default());
        assert!(!status.has_account);
        assert_eq!(status.status, None);
        assert_eq!(status.sending_blocked_message, None);
    }

    #[test]
    fn deploy_errors_distinguish_missing_funds() {
        assert_eq!(
            deploy_error_message(DeploymentErrorKind::InsufficientFunds).message,
            "You need to top up your Smart Account first"
        );
        assert!(
            deploy_error_message(DeploymentErrorKind::ServerError)
                .message
                .starts_with("There was an error on our server")
        );
    }
}
