//! REST client for the provider API.
//!
//! One method per provider operation. All methods share the same request
//! path: HTTP Basic auth, bounded per-attempt timeouts, a fixed total
//! attempt budget with exponential backoff, and normalization of every
//! failure into [`ProviderError`]. Retries apply only to transient
//! classes (transport failures, 5xx, 429); any other 4xx fails
//! immediately.

use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;

use tally_core::merchant::Merchant;
use tally_core::session::Contact;

use crate::backoff::{next_delay, with_jitter, RetryConfig};
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::types::{
    AccountsResponse, MerchantListResponse, ProviderAccount, SessionHandle, TransactionSyncPage,
};

/// Per-attempt request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// TCP connect timeout within each attempt.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for the provider REST API.
///
/// Cheap to construct per request; the underlying connection pool is
/// shared process-wide by `reqwest`.
pub struct ProviderClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    retry: RetryConfig,
}

impl ProviderClient {
    /// Build a client from provider configuration with default retry
    /// parameters.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Self::with_retry(config, RetryConfig::default())
    }

    /// Build a client with explicit retry parameters (tests shrink the
    /// delays).
    pub fn with_retry(config: &ProviderConfig, retry: RetryConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            retry,
        })
    }

    // ------------------------------------------------------------------
    // Session management
    // ------------------------------------------------------------------

    /// Create a linking session for a user.
    ///
    /// `external_user_id` is our user identifier as the provider sees it;
    /// `session_type` selects the product variant (`transaction_link` or
    /// `card_switcher`).
    pub async fn create_session(
        &self,
        external_user_id: &str,
        contact: &Contact,
        session_type: &str,
    ) -> Result<SessionHandle, ProviderError> {
        let payload = serde_json::json!({
            "type": session_type,
            "external_user_id": external_user_id,
            "contact": contact,
        });

        tracing::info!(external_user_id, session_type, "Creating provider session");
        self.request(Method::POST, "/session/create", Some(&payload), &[])
            .await
    }

    /// Extend an existing session's validity window.
    pub async fn extend_session(&self, session_id: &str) -> Result<SessionHandle, ProviderError> {
        let payload = serde_json::json!({ "session_id": session_id });
        self.request(Method::POST, "/session/extend", Some(&payload), &[])
            .await
    }

    // ------------------------------------------------------------------
    // Merchants
    // ------------------------------------------------------------------

    /// List merchants supporting the given product variant.
    pub async fn list_merchants(&self, merchant_type: &str) -> Result<Vec<Merchant>, ProviderError> {
        let payload = serde_json::json!({ "type": merchant_type });
        let response: MerchantListResponse = self
            .request(Method::POST, "/merchant/list", Some(&payload), &[])
            .await?;
        Ok(response.merchants)
    }

    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    /// Fetch all accounts the user has linked through the provider,
    /// optionally filtered to one merchant.
    pub async fn get_accounts(
        &self,
        external_user_id: &str,
        merchant_id: Option<&str>,
    ) -> Result<Vec<ProviderAccount>, ProviderError> {
        let mut query = vec![("external_user_id", external_user_id.to_string())];
        if let Some(m) = merchant_id {
            query.push(("merchant_id", m.to_string()));
        }

        tracing::info!(external_user_id, "Fetching provider accounts");
        let response: AccountsResponse = self
            .request(Method::GET, "/accounts/get", None, &query)
            .await?;
        Ok(response.accounts)
    }

    // ------------------------------------------------------------------
    // Transactions
    // ------------------------------------------------------------------

    /// Pull one page of transactions for a merchant, resuming from
    /// `cursor` when given.
    pub async fn sync_transactions(
        &self,
        external_user_id: &str,
        merchant_id: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<TransactionSyncPage, ProviderError> {
        let mut payload = serde_json::json!({
            "external_user_id": external_user_id,
            "merchant_id": merchant_id,
            "limit": limit,
        });
        if let Some(c) = cursor {
            payload["cursor"] = serde_json::Value::String(c.to_string());
        }

        tracing::info!(external_user_id, merchant_id, "Syncing provider transactions");
        self.request(Method::POST, "/transactions/sync", Some(&payload), &[])
            .await
    }

    // ------------------------------------------------------------------
    // User management
    // ------------------------------------------------------------------

    /// Delete all provider-side data for a user.
    pub async fn delete_user(&self, external_user_id: &str) -> Result<(), ProviderError> {
        let payload = serde_json::json!({ "external_user_id": external_user_id });
        let _: serde_json::Value = self
            .request(Method::POST, "/user/delete", Some(&payload), &[])
            .await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Request plumbing
    // ------------------------------------------------------------------

    /// Issue one logical request with the full retry budget, decoding the
    /// 2xx body into `T`.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        let mut delay = self.retry.initial_delay;
        let mut last_err: Option<ProviderError> = None;

        for attempt in 1..=self.retry.max_attempts {
            match self.attempt(method.clone(), &url, body, query).await {
                Ok(value) => {
                    return serde_json::from_value(value).map_err(|e| {
                        ProviderError::decode(format!(
                            "unexpected response shape from {path}: {e}"
                        ))
                    });
                }
                Err(err) if err.is_retryable() && attempt < self.retry.max_attempts => {
                    let sleep_for = with_jitter(delay);
                    tracing::warn!(
                        path,
                        attempt,
                        status = err.status,
                        delay_ms = sleep_for.as_millis() as u64,
                        "Provider call failed, retrying",
                    );
                    tokio::time::sleep(sleep_for).await;
                    delay = next_delay(delay, &self.retry);
                    last_err = Some(err);
                }
                Err(err) => {
                    tracing::error!(
                        path,
                        attempt,
                        status = err.status,
                        error = %err,
                        payload = ?err.payload,
                        "Provider call failed",
                    );
                    return Err(err);
                }
            }
        }

        // Unreachable unless max_attempts is zero; treat as exhaustion.
        Err(last_err.unwrap_or_else(|| ProviderError::transport("retry budget exhausted")))
    }

    /// A single network attempt. Returns the decoded JSON body on 2xx,
    /// a classified [`ProviderError`] otherwise.
    async fn attempt(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, ProviderError> {
        let mut request = self
            .http
            .request(method, url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header("Accept", "application/json");
        if let Some(json) = body {
            request = request.json(json);
        }
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::transport(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::transport(format!("reading response body failed: {e}")))?;

        let payload: Option<serde_json::Value> = serde_json::from_slice(&bytes).ok();

        if status.is_success() {
            return Ok(payload.unwrap_or(serde_json::Value::Null));
        }

        // Prefer the provider's own message field when it sent one.
        let message = payload
            .as_ref()
            .and_then(|p| p.get("message"))
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            });

        Err(ProviderError::http(status.as_u16(), message, payload))
    }
}
