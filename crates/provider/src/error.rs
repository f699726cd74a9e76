//! Single error type for all provider failures.
//!
//! Every failure -- transport, HTTP status, or an undecodable body -- is
//! normalized into [`ProviderError`] carrying an HTTP-status-like code,
//! a human message, and the raw provider payload when one was returned.
//! Callers branch on [`ProviderError::kind`] without knowing transport
//! details.

/// Coarse classification of a provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// The provider could not be reached or answered with a transient
    /// status (network failure, timeout, 5xx, 429). Retried up to the
    /// attempt budget; surfaced as a 503-equivalent when exhausted.
    Unavailable,
    /// The provider understood the request and refused it (4xx other
    /// than 429). Never retried.
    Rejected,
}

/// A failed provider call.
#[derive(Debug, thiserror::Error)]
#[error("Provider error {status}: {message}")]
pub struct ProviderError {
    /// HTTP status of the failing response, or `0` for transport
    /// failures that never produced a response.
    pub status: u16,
    pub message: String,
    /// Raw provider response body, kept for operator diagnosis.
    pub payload: Option<serde_json::Value>,
}

impl ProviderError {
    /// A transport-level failure (connect, timeout, TLS) with no response.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: 0,
            message: message.into(),
            payload: None,
        }
    }

    /// A non-2xx HTTP response from the provider.
    pub fn http(status: u16, message: impl Into<String>, payload: Option<serde_json::Value>) -> Self {
        Self {
            status,
            message: message.into(),
            payload,
        }
    }

    /// A 2xx response whose body did not match the expected shape.
    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            status: 502,
            message: message.into(),
            payload: None,
        }
    }

    pub fn kind(&self) -> ProviderErrorKind {
        match self.status {
            0 | 429 => ProviderErrorKind::Unavailable,
            s if s >= 500 => ProviderErrorKind::Unavailable,
            _ => ProviderErrorKind::Rejected,
        }
    }

    /// Whether another attempt may succeed. Transient classes only:
    /// transport failures, 5xx, and 429.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ProviderErrorKind::Unavailable
    }
}
