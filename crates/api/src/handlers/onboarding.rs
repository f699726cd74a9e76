//! Handlers for the account-linking onboarding flow.
//!
//! `start` issues a session for the client to drive the provider's
//! embedded widget with; `complete` reconciles the linked accounts after
//! the widget flow finishes. Both report the provider mode truthfully so
//! the client can adapt its copy (e.g. show a sandbox banner only in
//! simulation).

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use tally_core::error::CoreError;
use tally_core::mode::ProviderMode;
use tally_core::session::Contact;
use tally_provider::ProviderConfig;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /onboarding/start
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct StartOnboardingRequest {
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    /// Synthesize a unique provider-side external user id for this call.
    /// The provider rejects rapid consecutive sessions for the same
    /// external user, which trips up test harnesses.
    #[serde(default)]
    pub test_mode: bool,
}

#[derive(Debug, Serialize)]
pub struct StartOnboardingResponse {
    pub session_token: String,
    pub session_id: String,
    /// ISO-8601 expiry of the session window.
    pub expires_at: String,
    pub mode: ProviderMode,
}

/// Start the onboarding flow for the authenticated user.
pub async fn start_onboarding(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<StartOnboardingRequest>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    // Re-read provider configuration per request so credential and
    // toggle changes apply without a restart.
    let config = ProviderConfig::from_env();
    let contact = Contact {
        email: input.email,
        phone: input.phone,
    };

    let outcome = state
        .services
        .onboarding
        .start(&config, auth.user_id, &contact, input.test_mode)
        .await?;

    tracing::info!(
        user_id = auth.user_id,
        session_id = %outcome.session_id,
        mode = %outcome.mode,
        "Onboarding started",
    );

    Ok(Json(DataResponse {
        data: StartOnboardingResponse {
            session_token: outcome.session_token,
            session_id: outcome.session_id,
            expires_at: outcome.expires_at.to_rfc3339(),
            mode: outcome.mode,
        },
    }))
}

// ---------------------------------------------------------------------------
// POST /onboarding/complete
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CompleteOnboardingRequest {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct CompleteOnboardingResponse {
    pub success: bool,
    pub accounts_linked: u32,
    pub message: String,
}

/// Complete onboarding: fetch and store the accounts the user linked.
///
/// An expired session comes back as `success = false` with a message
/// telling the client to restart onboarding -- deliberately not an error
/// status, since retrying the same session can never succeed.
pub async fn complete_onboarding(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CompleteOnboardingRequest>,
) -> AppResult<impl IntoResponse> {
    let config = ProviderConfig::from_env();

    let outcome = state
        .services
        .onboarding
        .complete(&config, auth.user_id, &input.session_id)
        .await?;

    tracing::info!(
        user_id = auth.user_id,
        session_id = %input.session_id,
        success = outcome.success,
        accounts_linked = outcome.accounts_linked,
        "Onboarding completion handled",
    );

    Ok(Json(DataResponse {
        data: CompleteOnboardingResponse {
            success: outcome.success,
            accounts_linked: outcome.accounts_linked,
            message: outcome.message,
        },
    }))
}
