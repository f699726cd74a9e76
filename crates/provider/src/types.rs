//! Wire types for provider responses.
//!
//! Every field the provider is not contractually guaranteed to send is
//! modeled as `Option` or given a serde default, and fallbacks are
//! computed here at the boundary rather than deep in business logic.
//! External partners' schemas are not exhaustive; tolerating absence is a
//! design requirement, not a workaround.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tally_core::merchant::Merchant;

/// Response from `POST /session/create` and `POST /session/extend`.
///
/// The provider names the identifier field `session`; older payloads used
/// `session_id`, so both spellings are accepted. `session_token` and
/// `expires_at` may be absent entirely.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionHandle {
    #[serde(alias = "session_id")]
    pub session: String,
    #[serde(default)]
    pub session_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
}

impl SessionHandle {
    pub fn session_id(&self) -> &str {
        &self.session
    }

    /// Token to hand to the embedded widget; the session id doubles as
    /// the token when the provider omits one.
    pub fn resolved_token(&self) -> String {
        self.session_token
            .clone()
            .unwrap_or_else(|| self.session.clone())
    }

    /// Parse the provider expiry if present and well-formed. Callers fall
    /// back to a locally computed window when this returns `None`.
    pub fn resolved_expiry(&self) -> Option<DateTime<Utc>> {
        self.expires_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// One linked account as reported by `GET /accounts/get`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderAccount {
    pub id: String,
    pub merchant_id: String,
    pub merchant_name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub permissions: serde_json::Value,
    #[serde(default)]
    pub linked_at: Option<String>,
}

/// Envelope for `GET /accounts/get`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountsResponse {
    #[serde(default)]
    pub accounts: Vec<ProviderAccount>,
}

/// Envelope for `POST /merchant/list`.
#[derive(Debug, Clone, Deserialize)]
pub struct MerchantListResponse {
    #[serde(default)]
    pub merchants: Vec<Merchant>,
}

/// One transaction as reported by `POST /transactions/sync`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderTransaction {
    pub id: String,
    /// Sometimes omitted; the sync engine stamps the merchant it asked
    /// about onto each transaction regardless.
    #[serde(default)]
    pub merchant_id: Option<String>,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub description: String,
    pub date: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Response from `POST /transactions/sync`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionSyncPage {
    #[serde(default)]
    pub transactions: Vec<ProviderTransaction>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_handle_tolerates_missing_token_and_expiry() {
        let handle: SessionHandle =
            serde_json::from_value(serde_json::json!({"session": "abc-123"})).unwrap();
        assert_eq!(handle.session_id(), "abc-123");
        assert_eq!(handle.resolved_token(), "abc-123");
        assert_eq!(handle.resolved_expiry(), None);
    }

    #[test]
    fn session_handle_accepts_legacy_field_name() {
        let handle: SessionHandle =
            serde_json::from_value(serde_json::json!({"session_id": "abc-123"})).unwrap();
        assert_eq!(handle.session_id(), "abc-123");
    }

    #[test]
    fn session_handle_parses_rfc3339_expiry() {
        let handle: SessionHandle = serde_json::from_value(serde_json::json!({
            "session": "abc",
            "session_token": "tok",
            "expires_at": "2026-01-01T00:00:00Z",
        }))
        .unwrap();
        assert_eq!(handle.resolved_token(), "tok");
        let expiry = handle.resolved_expiry().unwrap();
        assert_eq!(expiry.to_rfc3339(), "2026-01-01T00:00:00+00:00");
    }

    #[test]
    fn malformed_expiry_falls_back_to_none() {
        let handle: SessionHandle = serde_json::from_value(serde_json::json!({
            "session": "abc",
            "expires_at": "soon",
        }))
        .unwrap();
        assert_eq!(handle.resolved_expiry(), None);
    }

    #[test]
    fn transaction_defaults_currency_to_usd() {
        let txn: ProviderTransaction = serde_json::from_value(serde_json::json!({
            "id": "txn-1",
            "amount": 12.5,
            "description": "order",
            "date": "2026-01-02T03:04:05Z",
        }))
        .unwrap();
        assert_eq!(txn.currency, "USD");
        assert_eq!(txn.merchant_id, None);
    }

    #[test]
    fn empty_sync_page_decodes() {
        let page: TransactionSyncPage = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(page.transactions.is_empty());
        assert_eq!(page.next_cursor, None);
        assert!(!page.has_more);
    }
}
