//! Backend API integration
//!
//! This module provides the client trait and types for talking to the wallet backend:
//! wallet registration, user profile updates, default assets and exchange rates.

/// REST client for the wallet backend
mod client;
/// Type definitions for backend payloads
mod types;

pub use client::{BackendApi, HttpBackendClient};
pub use types::*;
