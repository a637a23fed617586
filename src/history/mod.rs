//! Smart-wallet transaction history.
//!
//! The smart-wallet SDK reports transactions in its own shape: nested party objects, token
//! fields next to native ones, and payment-network settlements split into one record per leg.
//! This module maps those records into [`CanonicalTransaction`]s, one per hash, which the rest
//! of the wallet treats like any other history entry.
//!
//! Normalization is pure and synchronous. Malformed records are dropped individually and never
//! fail a batch.

/// Record mapping and settlement reconciliation
pub mod normalizer;
/// SDK input and canonical output types
pub mod types;

pub use normalizer::{TransactionNormalizer, normalize};
pub use types::*;
