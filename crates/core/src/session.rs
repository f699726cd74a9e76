//! Link session model and state machine.
//!
//! A [`LinkSession`] is one time-bounded attempt to link accounts through
//! the provider's embedded widget. Sessions are created `Pending`, become
//! `Completed` exactly once when onboarding completion succeeds, and are
//! treated as expired whenever `now > expires_at` -- expiry is computed at
//! read time, never written back, so no background timer is needed.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::mode::ProviderMode;
use crate::types::UserId;

/// How long a newly created session stays valid when the provider does
/// not supply its own expiry.
pub const SESSION_TTL_MINUTES: i64 = 30;

/// Stored session status. `Expired` is intentionally absent: it is a
/// function of the clock, not a persisted transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Completed,
}

/// Contact details passed through to the provider when creating a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// One attempt to link accounts for a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSession {
    /// Opaque identifier, provider-assigned in live mode or locally
    /// synthesized in simulation mode. Unique per attempt.
    pub session_id: String,
    pub user_id: UserId,
    /// Token the client hands to the provider's embedded widget. Falls
    /// back to the session id when the provider omits it.
    pub session_token: String,
    /// Mode the session was created under. Fixed for the session's
    /// lifetime so real and synthetic account identifiers never mix.
    pub mode: ProviderMode,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Memoized reconciliation result, set when the session completes.
    /// Replayed on duplicate completion calls instead of re-linking.
    pub accounts_linked: Option<u32>,
}

impl LinkSession {
    /// Build a fresh `Pending` session expiring [`SESSION_TTL_MINUTES`]
    /// from `now` unless the provider supplied an expiry.
    pub fn new_pending(
        session_id: String,
        session_token: String,
        user_id: UserId,
        mode: ProviderMode,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id,
            user_id,
            session_token,
            mode,
            status: SessionStatus::Pending,
            created_at: now,
            expires_at: expires_at.unwrap_or(now + Duration::minutes(SESSION_TTL_MINUTES)),
            accounts_linked: None,
        }
    }

    /// Whether the session is past its validity window at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Whether the session reached its terminal completed state.
    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> LinkSession {
        LinkSession::new_pending(
            "sess-1".into(),
            "tok-1".into(),
            42,
            ProviderMode::Simulated,
            expires_at,
            now,
        )
    }

    #[test]
    fn default_expiry_is_thirty_minutes() {
        let now = Utc::now();
        let s = session(None, now);
        assert_eq!(s.expires_at, now + Duration::minutes(30));
        assert!(!s.is_expired(now));
        assert!(!s.is_expired(now + Duration::minutes(30)));
        assert!(s.is_expired(now + Duration::minutes(30) + Duration::seconds(1)));
    }

    #[test]
    fn provider_expiry_wins_over_default() {
        let now = Utc::now();
        let provided = now + Duration::minutes(5);
        let s = session(Some(provided), now);
        assert_eq!(s.expires_at, provided);
    }

    #[test]
    fn new_sessions_are_pending() {
        let s = session(None, Utc::now());
        assert_eq!(s.status, SessionStatus::Pending);
        assert_eq!(s.accounts_linked, None);
        assert!(!s.is_completed());
    }
}
