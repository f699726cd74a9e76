//! Incremental transaction synchronization.
//!
//! Pulls transaction pages per `(user, merchant)` using the stored
//! cursor, merges them into the per-user cache, and persists the returned
//! cursor for the next call. Syncing several merchants is best-effort per
//! merchant: one merchant failing does not abort the others, and each
//! merchant reports its own result.

use tally_core::error::CoreError;
use tally_core::transaction::Transaction;
use tally_core::types::UserId;
use tally_provider::types::TransactionSyncPage;
use tally_provider::{sim, ProviderClient, ProviderConfig};
use tally_store::Stores;

use crate::provider_to_core;

/// Per-merchant outcome of one sync call.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MerchantSyncResult {
    pub merchant_id: String,
    pub merchant_name: String,
    /// Transactions fetched from the provider this call (pre-dedup).
    pub count: usize,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    /// Present when this merchant's sync failed; the others still ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a sync across one or all of a user's merchants.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// Transactions fetched this call, merchant info stamped on.
    pub transactions: Vec<Transaction>,
    pub results: Vec<MerchantSyncResult>,
}

#[derive(Clone)]
pub struct SyncEngine {
    stores: Stores,
}

impl SyncEngine {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// Sync transactions for one merchant, or every merchant the user has
    /// an active linked account for.
    pub async fn sync(
        &self,
        config: &ProviderConfig,
        user_id: UserId,
        merchant_id: Option<&str>,
        limit: u32,
    ) -> Result<SyncOutcome, CoreError> {
        let mut merchants = self.stores.accounts.active_merchants(user_id).await;

        if merchants.is_empty() {
            return Err(CoreError::Validation(
                "No linked accounts found. Complete onboarding first.".into(),
            ));
        }

        if let Some(wanted) = merchant_id {
            merchants.retain(|(id, _)| id == wanted);
            if merchants.is_empty() {
                return Err(CoreError::NotFound {
                    entity: "merchant",
                    id: wanted.to_string(),
                });
            }
        }

        let mode = config.resolve_mode();
        let client = if mode.is_live() {
            Some(ProviderClient::new(config).map_err(provider_to_core)?)
        } else {
            None
        };

        let mut transactions = Vec::new();
        let mut results = Vec::with_capacity(merchants.len());

        for (merchant_id, merchant_name) in merchants {
            let cursor = self.stores.cursors.get(user_id, &merchant_id).await;

            let page = match &client {
                Some(client) => {
                    client
                        .sync_transactions(
                            &user_id.to_string(),
                            &merchant_id,
                            cursor.as_deref(),
                            limit,
                        )
                        .await
                }
                None => Ok(sim::sync_transactions(
                    user_id,
                    &merchant_id,
                    cursor.as_deref(),
                    limit,
                )),
            };

            match page {
                Ok(page) => {
                    let fetched = self
                        .absorb_page(user_id, &merchant_id, &merchant_name, &page)
                        .await;
                    results.push(MerchantSyncResult {
                        merchant_id,
                        merchant_name,
                        count: fetched.len(),
                        has_more: page.has_more,
                        next_cursor: page.next_cursor,
                        error: None,
                    });
                    transactions.extend(fetched);
                }
                Err(err) => {
                    tracing::warn!(
                        user_id,
                        merchant_id = %merchant_id,
                        error = %err,
                        "Transaction sync failed for merchant",
                    );
                    results.push(MerchantSyncResult {
                        merchant_id,
                        merchant_name,
                        count: 0,
                        has_more: false,
                        next_cursor: None,
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        Ok(SyncOutcome {
            transactions,
            results,
        })
    }

    /// Read the last-synced cache without touching the provider.
    pub async fn cached(
        &self,
        user_id: UserId,
        merchant_id: Option<&str>,
        limit: usize,
    ) -> Vec<Transaction> {
        self.stores.transactions.list(user_id, merchant_id, limit).await
    }

    /// Stamp merchant identity onto a fetched page, merge it into the
    /// cache, and advance the stored cursor.
    async fn absorb_page(
        &self,
        user_id: UserId,
        merchant_id: &str,
        merchant_name: &str,
        page: &TransactionSyncPage,
    ) -> Vec<Transaction> {
        let fetched: Vec<Transaction> = page
            .transactions
            .iter()
            .map(|t| Transaction {
                id: t.id.clone(),
                merchant_id: merchant_id.to_string(),
                merchant_name: merchant_name.to_string(),
                amount: t.amount,
                currency: t.currency.clone(),
                description: t.description.clone(),
                date: t.date.clone(),
                category: t.category.clone(),
                metadata: t.metadata.clone(),
            })
            .collect();

        self.stores.transactions.merge(user_id, fetched.clone()).await;
        self.stores
            .cursors
            .advance(user_id, merchant_id, page.next_cursor.as_deref())
            .await;

        fetched
    }
}
