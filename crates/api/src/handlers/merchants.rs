//! Handler for the merchant catalog.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use tally_core::merchant::Merchant;
use tally_provider::ProviderConfig;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MerchantsQuery {
    /// Product variant filter; defaults to the configured session type.
    pub merchant_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MerchantListResponse {
    pub merchants: Vec<Merchant>,
    pub total: usize,
}

/// List merchants available for linking.
pub async fn list_merchants(
    auth: AuthUser,
    State(_state): State<AppState>,
    Query(query): Query<MerchantsQuery>,
) -> AppResult<impl IntoResponse> {
    let config = ProviderConfig::from_env();

    let merchants =
        tally_link::merchants::list(&config, query.merchant_type.as_deref()).await?;

    tracing::debug!(
        user_id = auth.user_id,
        total = merchants.len(),
        "Merchant catalog fetched",
    );

    Ok(Json(DataResponse {
        data: MerchantListResponse {
            total: merchants.len(),
            merchants,
        },
    }))
}
