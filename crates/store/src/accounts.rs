//! Per-user linked-account store.
//!
//! Accounts dedup by `(user_id, provider_account_id)`: relinking updates
//! the existing row in place (same local `account_id`) instead of
//! inserting a duplicate. Unlinking flips status to `Revoked`; nothing is
//! hard-deleted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use tally_core::account::{AccountStatus, LinkedAccount};
use tally_core::error::CoreError;
use tally_core::types::{DbId, UserId};

/// Provider-reported account fields as the reconciler hands them over.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub provider_account_id: String,
    pub merchant_id: String,
    pub merchant_name: String,
    pub account_label: String,
    pub permissions: serde_json::Value,
}

/// Result of an upsert: the stored row plus whether it was new to the
/// store (as opposed to a relink of a known provider account).
#[derive(Debug, Clone)]
pub struct UpsertOutcome {
    pub account: LinkedAccount,
    pub newly_linked: bool,
}

pub struct AccountStore {
    accounts: RwLock<HashMap<UserId, Vec<LinkedAccount>>>,
    next_id: AtomicI64,
}

impl Default for AccountStore {
    fn default() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update the row for `(user_id, provider_account_id)`.
    ///
    /// Existing rows keep their local `account_id`; label, merchant
    /// fields, permissions, and `last_synced_at` are refreshed, and a
    /// previously revoked row is reactivated by the relink.
    pub async fn upsert(
        &self,
        user_id: UserId,
        incoming: NewAccount,
        now: DateTime<Utc>,
    ) -> UpsertOutcome {
        let mut accounts = self.accounts.write().await;
        let rows = accounts.entry(user_id).or_default();

        if let Some(existing) = rows
            .iter_mut()
            .find(|a| a.provider_account_id == incoming.provider_account_id)
        {
            existing.merchant_id = incoming.merchant_id;
            existing.merchant_name = incoming.merchant_name;
            existing.account_label = incoming.account_label;
            existing.permissions = incoming.permissions;
            existing.status = AccountStatus::Active;
            existing.last_synced_at = now;
            return UpsertOutcome {
                account: existing.clone(),
                newly_linked: false,
            };
        }

        let account = LinkedAccount {
            account_id: self.next_id.fetch_add(1, Ordering::Relaxed),
            user_id,
            provider_account_id: incoming.provider_account_id,
            merchant_id: incoming.merchant_id,
            merchant_name: incoming.merchant_name,
            account_label: incoming.account_label,
            permissions: incoming.permissions,
            status: AccountStatus::Active,
            linked_at: now,
            last_synced_at: now,
        };
        rows.push(account.clone());

        UpsertOutcome {
            account,
            newly_linked: true,
        }
    }

    /// All active rows for a user, in link order.
    pub async fn list_active(&self, user_id: UserId) -> Vec<LinkedAccount> {
        self.accounts
            .read()
            .await
            .get(&user_id)
            .map(|rows| rows.iter().filter(|a| a.is_active()).cloned().collect())
            .unwrap_or_default()
    }

    /// Soft-revoke an account. Fails with `NotFound` when the row does
    /// not exist, is already revoked, or belongs to a different user --
    /// the caller learns nothing about rows it does not own.
    pub async fn revoke(&self, user_id: UserId, account_id: DbId) -> Result<LinkedAccount, CoreError> {
        let mut accounts = self.accounts.write().await;
        let row = accounts
            .get_mut(&user_id)
            .and_then(|rows| {
                rows.iter_mut()
                    .find(|a| a.account_id == account_id && a.is_active())
            })
            .ok_or(CoreError::NotFound {
                entity: "account",
                id: account_id.to_string(),
            })?;

        row.status = AccountStatus::Revoked;
        Ok(row.clone())
    }

    /// Distinct `(merchant_id, merchant_name)` pairs the user has active
    /// links for. Drives the sync-all-merchants path.
    pub async fn active_merchants(&self, user_id: UserId) -> Vec<(String, String)> {
        let mut merchants: Vec<(String, String)> = Vec::new();
        for account in self.list_active(user_id).await {
            if !merchants.iter().any(|(id, _)| *id == account.merchant_id) {
                merchants.push((account.merchant_id, account.merchant_name));
            }
        }
        merchants
    }

    /// Most recent sync time across the user's active rows. `None` when
    /// nothing is linked. Drives the read-path staleness gate.
    pub async fn last_refreshed(&self, user_id: UserId) -> Option<DateTime<Utc>> {
        self.list_active(user_id)
            .await
            .iter()
            .map(|a| a.last_synced_at)
            .max()
    }
}
