//! Route definitions for transactions.
//!
//! Mounted at `/transactions` by `api_routes()`.

use axum::routing::get;
use axum::Router;

use crate::handlers::transactions;
use crate::state::AppState;

/// Transaction routes.
///
/// ```text
/// GET    /          -> get_transactions (cached only)
/// GET    /sync      -> sync_transactions (provider sync, then return)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(transactions::get_transactions))
        .route("/sync", get(transactions::sync_transactions))
}
