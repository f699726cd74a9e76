//! Route definitions for the onboarding flow.
//!
//! Mounted at `/onboarding` by `api_routes()`.

use axum::routing::post;
use axum::Router;

use crate::handlers::onboarding;
use crate::state::AppState;

/// Onboarding routes.
///
/// ```text
/// POST   /start      -> start_onboarding
/// POST   /complete   -> complete_onboarding
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/start", post(onboarding::start_onboarding))
        .route("/complete", post(onboarding::complete_onboarding))
}
