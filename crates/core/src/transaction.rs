//! Cached transaction model.

use serde::{Deserialize, Serialize};

/// A single transaction as cached per user after a sync.
///
/// `date` stays in the provider's string form; the cache orders by it
/// lexicographically, which is correct for the provider's ISO-8601
/// timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub merchant_id: String,
    pub merchant_name: String,
    pub amount: f64,
    pub currency: String,
    pub description: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}
