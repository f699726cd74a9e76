//! Route definitions for linked accounts.
//!
//! Mounted at `/accounts` by `api_routes()`.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::accounts;
use crate::state::AppState;

/// Account routes.
///
/// ```text
/// GET    /                  -> list_accounts (?force_refresh=bool)
/// DELETE /{account_id}      -> unlink_account
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(accounts::list_accounts))
        .route("/{account_id}", delete(accounts::unlink_account))
}
