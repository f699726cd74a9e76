//! Per-user transaction cache.
//!
//! Filled by the sync engine, read by the cached-only endpoint. Merging
//! dedups by transaction id and keeps the newest-first order, so repeated
//! syncs (or a cursor replay after a provider hiccup) never double-count.

use std::collections::HashMap;

use tokio::sync::RwLock;

use tally_core::transaction::Transaction;
use tally_core::types::UserId;

#[derive(Default)]
pub struct TransactionCache {
    cache: RwLock<HashMap<UserId, Vec<Transaction>>>,
}

impl TransactionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a synced page into the user's cache. Returns how many of the
    /// incoming transactions were not already cached.
    pub async fn merge(&self, user_id: UserId, incoming: Vec<Transaction>) -> usize {
        let mut cache = self.cache.write().await;
        let rows = cache.entry(user_id).or_default();

        let mut added = 0;
        for txn in incoming {
            if !rows.iter().any(|t| t.id == txn.id) {
                rows.push(txn);
                added += 1;
            }
        }
        // Provider dates are ISO-8601, so string order is time order.
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        added
    }

    /// Snapshot of the cache, optionally filtered by merchant, capped at
    /// `limit`. Never touches the provider.
    pub async fn list(
        &self,
        user_id: UserId,
        merchant_id: Option<&str>,
        limit: usize,
    ) -> Vec<Transaction> {
        self.cache
            .read()
            .await
            .get(&user_id)
            .map(|rows| {
                rows.iter()
                    .filter(|t| merchant_id.is_none_or(|m| t.merchant_id == m))
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
