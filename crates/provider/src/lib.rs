//! HTTP client for the account-aggregation provider.
//!
//! [`client::ProviderClient`] wraps the provider's session, merchant,
//! account, and transaction endpoints with retry/backoff and a single
//! error type callers can branch on by status. The [`sim`] module
//! synthesizes structurally identical responses for simulation mode, so
//! everything downstream of the mode decision is mode-agnostic.

pub mod backoff;
pub mod client;
pub mod config;
pub mod error;
pub mod sim;
pub mod types;

pub use client::ProviderClient;
pub use config::ProviderConfig;
pub use error::{ProviderError, ProviderErrorKind};
