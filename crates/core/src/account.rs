//! Linked account model.
//!
//! A [`LinkedAccount`] is a single external account associated with a
//! user. The dedup key is `(user_id, provider_account_id)`: relinking the
//! same provider account updates the existing row instead of inserting a
//! duplicate. Unlinking flips `status` to `Revoked`; rows are never hard
//! deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{DbId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Revoked,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedAccount {
    /// Locally assigned row id, monotonically increasing per process.
    pub account_id: DbId,
    pub user_id: UserId,
    /// Identifier assigned by the provider; the dedup key within a user.
    pub provider_account_id: String,
    pub merchant_id: String,
    pub merchant_name: String,
    /// Display label, e.g. "Amazon Account".
    pub account_label: String,
    /// Capability flags reported by the provider (read-transactions etc.),
    /// stored as the raw JSON object since the provider's flag set is not
    /// contractually exhaustive.
    pub permissions: serde_json::Value,
    pub status: AccountStatus,
    pub linked_at: DateTime<Utc>,
    pub last_synced_at: DateTime<Utc>,
}

impl LinkedAccount {
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}
