//! Handlers for the linked-accounts listing and unlink operations.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use tally_core::account::LinkedAccount;
use tally_core::mode::ProviderMode;
use tally_core::types::DbId;
use tally_provider::ProviderConfig;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// How old the stored view may get before a plain read triggers a
/// provider refresh.
const STALENESS_WINDOW_MINUTES: i64 = 15;

// ---------------------------------------------------------------------------
// GET /accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ListAccountsQuery {
    #[serde(default)]
    pub force_refresh: bool,
}

#[derive(Debug, Serialize)]
pub struct AccountListResponse {
    pub accounts: Vec<LinkedAccount>,
    pub total: usize,
    pub mode: ProviderMode,
}

/// List the authenticated user's active linked accounts.
///
/// `force_refresh=true` pulls from the provider before responding; a
/// plain read also refreshes when the stored view is older than the
/// staleness window. A failed refresh logs and serves the stored rows --
/// a read endpoint should not go down with the provider.
pub async fn list_accounts(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListAccountsQuery>,
) -> AppResult<impl IntoResponse> {
    let config = ProviderConfig::from_env();

    let mut accounts = state.stores.accounts.list_active(auth.user_id).await;

    let stale = state
        .stores
        .accounts
        .last_refreshed(auth.user_id)
        .await
        .is_some_and(|at| Utc::now() - at > Duration::minutes(STALENESS_WINDOW_MINUTES));

    // Refresh only makes sense once the user has linked something; the
    // provider is queried by external user id, and an unlinked user has
    // nothing there to fetch.
    if !accounts.is_empty() && (query.force_refresh || stale) {
        match state
            .services
            .reconciler
            .refresh_accounts(&config, auth.user_id)
            .await
        {
            Ok(refreshed) => {
                tracing::info!(
                    user_id = auth.user_id,
                    total = refreshed.len(),
                    "Refreshed accounts from provider",
                );
                accounts = refreshed;
            }
            Err(err) => {
                tracing::warn!(
                    user_id = auth.user_id,
                    error = %err,
                    "Account refresh failed, serving stored rows",
                );
            }
        }
    }

    Ok(Json(DataResponse {
        data: AccountListResponse {
            total: accounts.len(),
            accounts,
            mode: config.resolve_mode(),
        },
    }))
}

// ---------------------------------------------------------------------------
// DELETE /accounts/{account_id}
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct UnlinkAccountResponse {
    pub account_id: DbId,
    pub message: String,
}

/// Soft-revoke a linked account.
///
/// Rows belonging to other users are indistinguishable from rows that do
/// not exist: both come back 404.
pub async fn unlink_account(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(account_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let account = state.stores.accounts.revoke(auth.user_id, account_id).await?;

    tracing::info!(
        user_id = auth.user_id,
        account_id,
        merchant_id = %account.merchant_id,
        "Account unlinked",
    );

    Ok(Json(DataResponse {
        data: UnlinkAccountResponse {
            account_id,
            message: format!("Account {} successfully unlinked", account.merchant_name),
        },
    }))
}
