//! Authenticated-user extractor.
//!
//! Product authentication lives in an upstream gateway that verifies the
//! caller and injects their stable numeric id as the `x-user-id` header.
//! This extractor trusts that header and nothing else; requests that
//! reach the service without it are rejected.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use tally_core::error::CoreError;
use tally_core::types::UserId;

use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from the `x-user-id` header.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's stable internal id.
    pub user_id: UserId,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("Missing x-user-id header".into()))
            })?;

        let user_id: UserId = header.trim().parse().map_err(|_| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid x-user-id header. Expected a numeric user id".into(),
            ))
        })?;

        Ok(AuthUser { user_id })
    }
}
