//! Merchant catalog entry.

use serde::{Deserialize, Serialize};

/// A merchant supported by the provider for linking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Merchant {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub supported_features: Vec<String>,
}
