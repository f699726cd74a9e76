//! Route definitions for the merchant catalog.
//!
//! Mounted at `/merchants` by `api_routes()`.

use axum::routing::get;
use axum::Router;

use crate::handlers::merchants;
use crate::state::AppState;

/// Merchant routes.
///
/// ```text
/// GET    /          -> list_merchants (?merchant_type=...)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(merchants::list_merchants))
}
