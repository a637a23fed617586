//! Wallet state tracking for registration.
//!
//! The `WalletStateTracker` enforces the registration state machine
//! `Idle -> Generating? -> Encrypting -> Registering -> Decrypted`, where any non-terminal state
//! may also move to `Failed`. It records every state entered so a run can be summarised.

use crate::onboarding::types::{RegistrationError, WalletState};
use tracing::{debug, info};

/// Tracks and validates wallet state transitions during one registration run
#[derive(Debug, Clone)]
pub struct WalletStateTracker {
    /// The state most recently entered
    current: WalletState,
    /// Every state entered, starting with `Idle`
    visited: Vec<WalletState>,
}

impl Default for WalletStateTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl WalletStateTracker {
    pub fn new() -> Self {
        Self {
            current: WalletState::Idle,
            visited: vec![WalletState::Idle],
        }
    }

    pub fn current(&self) -> WalletState {
        self.current
    }

    pub fn visited(&self) -> &[WalletState] {
        &self.visited
    }

    /// Whether `to` may follow `from`
    pub fn is_allowed(from: WalletState, to: WalletState) -> bool {
        use WalletState::*;
        match (from, to) {
            (Decrypted | Failed, _) => false,
            (_, Failed) => true,
            (Idle, Generating) | (Idle, Encrypting) => true,
            (Generating, Encrypting) => true,
            (Encrypting, Registering) => true,
            (Registering, Decrypted) => true,
            _ => false,
        }
    }

    /// Move to `to`, rejecting transitions the state machine does not allow.
    pub fn transition(&mut self, to: WalletState) -> Result<(), RegistrationError> {
        if !Self::is_allowed(self.current, to) {
            return Err(RegistrationError::InvalidTransition {
                from: self.current,
                to,
            });
        }

        debug!("Wallet state {:?} -> {:?}", self.current, to);
        self.current = to;
        self.visited.push(to);
        Ok(())
    }

    /// Mark the run as failed. Has no effect once a terminal state was reached.
    pub fn fail(&mut self) {
        if !self.current.is_terminal() {
            self.current = WalletState::Failed;
            self.visited.push(WalletState::Failed);
        }
    }

    /// Get a human-readable summary of the states visited
    pub fn summary(&self) -> String {
        let path: Vec<String> = self.visited.iter().map(|s| format!("{:?}", s)).collect();
        format!("{} ({} states)", path.join(" -> "), self.visited.len())
    }

    pub fn log_summary(&self) {
        info!("Registration path: {}", self.summary());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_and_imported_paths_are_allowed() {
        let mut generated = WalletStateTracker::new();
        for state in [
            WalletState::Generating,
            WalletState::Encrypting,
            WalletState::Registering,
            WalletState::Decrypted,
        ] {
            generated.transition(state).unwrap();
        }
        assert_eq!(generated.current(), WalletState::Decrypted);

        let mut imported = WalletStateTracker::new();
        imported.transition(WalletState::Encrypting).unwrap();
        imported.transition(WalletState::Registering).unwrap();
        imported.transition(WalletState::Decrypted).unwrap();
        assert_eq!(
            imported.summary(),
            "Idle -> Encrypting -> Registering -> Decrypted (4 states)"
        );
    }

    #[test]
    fn skipping_encryption_is_rejected() {
        let mut tracker = WalletStateTracker::new();
        tracker.transition(WalletState::Generating).unwrap();

        let err = tracker.transition(WalletState::Registering).unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::InvalidTransition {
                from: WalletState::Generating,
                to: WalletState::Registering
            }
        ));
    }

    #[test]
    fn nothing_follows_a_terminal_state() {
        let mut tracker = WalletStateTracker::new();
        tracker.transition(WalletState::Encrypting).unwrap();
        tracker.fail();
        tracker.fail();

        assert_eq!(tracker.current(), WalletState::Failed);
        assert_eq!(tracker.visited().len(), 3);
        assert!(tracker.transition(WalletState::Registering).is_err());
    }
}
