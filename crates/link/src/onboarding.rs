//! Onboarding façade: the two operations external collaborators call.
//!
//! `start` hands the client a session to drive the provider's embedded
//! widget with; `complete` reconciles whatever the user linked. Both
//! return stable shapes regardless of mode, and `complete` folds the
//! expiry case into its result instead of erroring, so the UI can tell
//! "restart onboarding" apart from "something broke".

use chrono::{DateTime, Utc};

use tally_core::error::CoreError;
use tally_core::mode::ProviderMode;
use tally_core::session::Contact;
use tally_core::types::UserId;
use tally_provider::ProviderConfig;
use tally_store::Stores;

use crate::reconcile::Reconciler;
use crate::sessions::SessionManager;

/// Response shape of [`Onboarding::start`].
#[derive(Debug, Clone)]
pub struct StartOutcome {
    pub session_token: String,
    pub session_id: String,
    pub expires_at: DateTime<Utc>,
    /// Reported truthfully so the client can adapt UI copy (e.g. show a
    /// sandbox banner only in simulation).
    pub mode: ProviderMode,
}

/// Response shape of [`Onboarding::complete`].
#[derive(Debug, Clone)]
pub struct CompleteOutcome {
    pub success: bool,
    pub accounts_linked: u32,
    pub message: String,
}

#[derive(Clone)]
pub struct Onboarding {
    sessions: SessionManager,
    reconciler: Reconciler,
}

impl Onboarding {
    pub fn new(stores: Stores) -> Self {
        Self {
            sessions: SessionManager::new(stores.clone()),
            reconciler: Reconciler::new(stores),
        }
    }

    /// Start a linking session and return the handle the client widget
    /// needs.
    pub async fn start(
        &self,
        config: &ProviderConfig,
        user_id: UserId,
        contact: &Contact,
        test_mode: bool,
    ) -> Result<StartOutcome, CoreError> {
        let session = self.sessions.start(config, user_id, contact, test_mode).await?;
        Ok(StartOutcome {
            session_token: session.session_token.clone(),
            session_id: session.session_id.clone(),
            expires_at: session.expires_at,
            mode: session.mode,
        })
    }

    /// Complete onboarding: validate the session, then reconcile the
    /// accounts the user linked through the widget.
    ///
    /// An expired session is a normal outcome (`success = false` with a
    /// restart instruction), not an error; provider failures propagate so
    /// the session stays pending and the client can retry.
    pub async fn complete(
        &self,
        config: &ProviderConfig,
        user_id: UserId,
        session_id: &str,
    ) -> Result<CompleteOutcome, CoreError> {
        match self.sessions.touch(user_id, session_id).await {
            Ok(_) => {}
            Err(CoreError::SessionExpired(_)) => {
                tracing::info!(user_id, session_id, "Completion attempted on expired session");
                return Ok(CompleteOutcome {
                    success: false,
                    accounts_linked: 0,
                    message: "Linking session expired. Please restart onboarding.".into(),
                });
            }
            Err(other) => return Err(other),
        }

        let outcome = self.reconciler.reconcile(config, user_id, session_id).await?;

        let message = if outcome.already_completed {
            format!(
                "Onboarding already completed; {} account(s) were linked",
                outcome.accounts_linked
            )
        } else if outcome.accounts.is_empty() && outcome.accounts_linked == 0 {
            "Onboarding completed with no linked accounts".into()
        } else {
            format!("Successfully linked {} account(s)", outcome.accounts_linked)
        };

        Ok(CompleteOutcome {
            success: true,
            accounts_linked: outcome.accounts_linked,
            message,
        })
    }
}
