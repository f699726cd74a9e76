//! Session lifecycle: start and validate linking sessions.

use chrono::Utc;

use tally_core::error::CoreError;
use tally_core::session::{Contact, LinkSession};
use tally_core::types::UserId;
use tally_provider::{sim, ProviderClient, ProviderConfig};
use tally_store::Stores;

use crate::provider_to_core;

/// Creates and tracks linking sessions keyed by their opaque id.
#[derive(Clone)]
pub struct SessionManager {
    stores: Stores,
}

impl SessionManager {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// Start a new linking session for a user.
    ///
    /// The mode is resolved from the configuration passed in for this
    /// call and recorded on the session; completion later uses the
    /// recorded mode, not whatever the configuration says then.
    ///
    /// `test_mode` makes the provider-side external user id unique per
    /// call -- the provider rejects rapid consecutive sessions for the
    /// same external user, which trips up test harnesses.
    pub async fn start(
        &self,
        config: &ProviderConfig,
        user_id: UserId,
        contact: &Contact,
        test_mode: bool,
    ) -> Result<LinkSession, CoreError> {
        let mode = config.resolve_mode();
        let now = Utc::now();

        let handle = if mode.is_live() {
            let external_user_id = if test_mode {
                format!("test_{user_id}_{}", now.timestamp_millis())
            } else {
                user_id.to_string()
            };
            let client = ProviderClient::new(config).map_err(provider_to_core)?;
            client
                .create_session(&external_user_id, contact, &config.session_type)
                .await
                .map_err(provider_to_core)?
        } else {
            sim::create_session(user_id, now)
        };

        let session = LinkSession::new_pending(
            handle.session_id().to_string(),
            handle.resolved_token(),
            user_id,
            mode,
            handle.resolved_expiry(),
            now,
        );

        tracing::info!(
            user_id,
            session_id = %session.session_id,
            mode = %mode,
            expires_at = %session.expires_at,
            "Linking session created",
        );

        self.stores.sessions.insert(session.clone()).await;
        Ok(session)
    }

    /// Return the session if the caller owns it and it has not expired.
    ///
    /// Ownership is checked first: a session id for a different user is a
    /// client bug or tampering and is rejected before any provider call.
    pub async fn touch(&self, user_id: UserId, session_id: &str) -> Result<LinkSession, CoreError> {
        let session = self
            .stores
            .sessions
            .get(session_id)
            .await
            .ok_or(CoreError::NotFound {
                entity: "session",
                id: session_id.to_string(),
            })?;

        if session.user_id != user_id {
            return Err(CoreError::Validation(
                "Session does not belong to the calling user".into(),
            ));
        }

        if session.is_expired(Utc::now()) {
            return Err(CoreError::SessionExpired(format!(
                "Session {session_id} expired at {}",
                session.expires_at
            )));
        }

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Duration;
    use tally_core::mode::ProviderMode;

    fn simulated_config() -> ProviderConfig {
        ProviderConfig {
            api_url: "https://provider.test".into(),
            client_id: String::new(),
            client_secret: String::new(),
            feature_enabled: false,
            session_type: "transaction_link".into(),
        }
    }

    fn contact() -> Contact {
        Contact {
            email: "u1@example.com".into(),
            phone: None,
        }
    }

    #[tokio::test]
    async fn start_in_simulation_persists_a_pending_session() {
        let manager = SessionManager::new(Stores::default());
        let session = manager
            .start(&simulated_config(), 1, &contact(), false)
            .await
            .unwrap();

        assert_eq!(session.mode, ProviderMode::Simulated);
        assert!(session.session_id.starts_with("sim-1-"));

        let touched = manager.touch(1, &session.session_id).await.unwrap();
        assert_eq!(touched.session_id, session.session_id);
    }

    #[tokio::test]
    async fn rapid_starts_yield_distinct_sessions() {
        let manager = SessionManager::new(Stores::default());
        let a = manager
            .start(&simulated_config(), 1, &contact(), false)
            .await
            .unwrap();
        let b = manager
            .start(&simulated_config(), 1, &contact(), false)
            .await
            .unwrap();
        assert_ne!(a.session_id, b.session_id);
    }

    #[tokio::test]
    async fn touch_rejects_foreign_session_before_expiry_check() {
        let stores = Stores::default();
        let manager = SessionManager::new(stores.clone());
        let session = manager
            .start(&simulated_config(), 1, &contact(), false)
            .await
            .unwrap();

        let err = manager.touch(2, &session.session_id).await.unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }

    #[tokio::test]
    async fn touch_flags_expired_sessions() {
        let stores = Stores::default();
        let manager = SessionManager::new(stores.clone());
        let mut session = manager
            .start(&simulated_config(), 1, &contact(), false)
            .await
            .unwrap();

        session.expires_at = Utc::now() - Duration::seconds(1);
        stores.sessions.insert(session.clone()).await;

        let err = manager.touch(1, &session.session_id).await.unwrap_err();
        assert_matches!(err, CoreError::SessionExpired(_));
    }

    #[tokio::test]
    async fn touch_unknown_session_is_not_found() {
        let manager = SessionManager::new(Stores::default());
        let err = manager.touch(1, "nope").await.unwrap_err();
        assert_matches!(err, CoreError::NotFound { entity: "session", .. });
    }
}
