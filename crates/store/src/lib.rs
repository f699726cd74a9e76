//! In-memory stores for linkage state.
//!
//! Durable storage is explicitly out of scope; what matters here is the
//! state machine and the concurrency contract a durable implementation
//! would have to preserve. Every store keys by user (and merchant where
//! relevant), takes its lock only for the map touch -- never across
//! provider I/O -- and there is no global mutex spanning users.

pub mod accounts;
pub mod cursors;
pub mod sessions;
pub mod transactions;

use std::sync::Arc;

pub use accounts::{AccountStore, NewAccount, UpsertOutcome};
pub use cursors::CursorStore;
pub use sessions::SessionStore;
pub use transactions::TransactionCache;

/// Bundle of all stores, shared across request handlers.
#[derive(Clone, Default)]
pub struct Stores {
    pub sessions: Arc<SessionStore>,
    pub accounts: Arc<AccountStore>,
    pub cursors: Arc<CursorStore>,
    pub transactions: Arc<TransactionCache>,
}
