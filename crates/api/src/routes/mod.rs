pub mod accounts;
pub mod health;
pub mod merchants;
pub mod onboarding;
pub mod transactions;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /onboarding/start         start a linking session (POST)
/// /onboarding/complete      reconcile linked accounts (POST)
///
/// /accounts                 list active linked accounts (GET)
/// /accounts/{id}            soft-revoke an account (DELETE)
///
/// /transactions             cached transactions (GET)
/// /transactions/sync        sync from the provider, then return (GET)
///
/// /merchants                provider merchant catalog (GET)
/// ```
///
/// Everything here requires the `x-user-id` header injected by the
/// upstream auth gateway.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/onboarding", onboarding::router())
        .nest("/accounts", accounts::router())
        .nest("/transactions", transactions::router())
        .nest("/merchants", merchants::router())
}
