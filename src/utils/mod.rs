//!
//! Utility module for the onboarding crate.
//!
//! Re-exports formatting and comparison helpers used throughout the codebase.
/// Amount formatting, address comparison and serde helpers
pub mod index;

pub use index::{biguint_string, format_token_amount, is_case_insensitive_match};
