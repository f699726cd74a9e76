//! Handlers for transaction sync and cached reads.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use tally_core::transaction::Transaction;
use tally_link::sync::MerchantSyncResult;
use tally_provider::ProviderConfig;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_LIMIT: u32 = 100;
const MAX_LIMIT: u32 = 500;

#[derive(Debug, Deserialize)]
pub struct TransactionsQuery {
    pub merchant_id: Option<String>,
    pub limit: Option<u32>,
}

impl TransactionsQuery {
    fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

// ---------------------------------------------------------------------------
// GET /transactions/sync
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct SyncTransactionsResponse {
    pub transactions: Vec<Transaction>,
    pub total_count: usize,
    /// Per-merchant outcomes; a failed merchant reports its error here
    /// while the others still return data.
    pub synced_merchants: Vec<MerchantSyncResult>,
}

/// Sync transactions from the provider for the authenticated user, then
/// return what was fetched.
///
/// With `merchant_id`, only that merchant is synced; otherwise every
/// merchant the user has an active linked account for.
pub async fn sync_transactions(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<TransactionsQuery>,
) -> AppResult<impl IntoResponse> {
    let config = ProviderConfig::from_env();

    let outcome = state
        .services
        .sync
        .sync(
            &config,
            auth.user_id,
            query.merchant_id.as_deref(),
            query.limit(),
        )
        .await?;

    tracing::info!(
        user_id = auth.user_id,
        total = outcome.transactions.len(),
        merchants = outcome.results.len(),
        "Transaction sync finished",
    );

    Ok(Json(DataResponse {
        data: SyncTransactionsResponse {
            total_count: outcome.transactions.len(),
            transactions: outcome.transactions,
            synced_merchants: outcome.results,
        },
    }))
}

// ---------------------------------------------------------------------------
// GET /transactions
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct CachedTransactionsResponse {
    pub transactions: Vec<Transaction>,
    pub total_count: usize,
    pub cached: bool,
}

/// Return cached transactions without calling the provider.
///
/// A snapshot read for callers that do not want to pay sync latency or
/// risk provider rate limits. Call `/transactions/sync` for fresh data.
pub async fn get_transactions(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<TransactionsQuery>,
) -> AppResult<impl IntoResponse> {
    let transactions = state
        .services
        .sync
        .cached(
            auth.user_id,
            query.merchant_id.as_deref(),
            query.limit() as usize,
        )
        .await;

    Ok(Json(DataResponse {
        data: CachedTransactionsResponse {
            total_count: transactions.len(),
            transactions,
            cached: true,
        },
    }))
}
