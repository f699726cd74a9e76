//! Session store with per-session completion serialization.
//!
//! Sessions are keyed by their opaque id and retained after reaching a
//! terminal state so duplicate completion calls can replay the original
//! result. Completion uses two pieces: a per-session async mutex (so two
//! concurrent completes never both run the account merge) and a
//! compare-and-swap style `Pending -> Completed` transition under the
//! write lock.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::{Mutex, RwLock};

use tally_core::error::CoreError;
use tally_core::session::{LinkSession, SessionStatus};

/// Terminal sessions older than this are pruned lazily on insert.
const RETENTION_DAYS: i64 = 7;

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, LinkSession>>,
    /// Per-session completion guards, created on demand.
    completion_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly created session.
    ///
    /// Piggybacks retention: terminal sessions (completed, or pending
    /// past expiry) belonging to the same user and older than
    /// [`RETENTION_DAYS`] are dropped, so cleanup needs no background
    /// timer.
    pub async fn insert(&self, session: LinkSession) {
        let user_id = session.user_id;
        let now = Utc::now();
        let horizon = now - Duration::days(RETENTION_DAYS);

        let mut sessions = self.sessions.write().await;

        let stale: Vec<String> = sessions
            .values()
            .filter(|s| {
                s.user_id == user_id
                    && s.created_at < horizon
                    && (s.is_completed() || s.is_expired(now))
            })
            .map(|s| s.session_id.clone())
            .collect();

        if !stale.is_empty() {
            tracing::debug!(user_id, pruned = stale.len(), "Pruning stale sessions");
            let mut locks = self.completion_locks.lock().await;
            for id in &stale {
                sessions.remove(id);
                locks.remove(id);
            }
        }

        sessions.insert(session.session_id.clone(), session);
    }

    pub async fn get(&self, session_id: &str) -> Option<LinkSession> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// The completion guard for a session. Hold it for the whole
    /// fetch-merge-complete sequence; the second caller blocks here and
    /// then observes the completed status.
    pub async fn completion_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.completion_locks.lock().await;
        Arc::clone(
            locks
                .entry(session_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// Transition a session `Pending -> Completed`, memoizing the
    /// reconciliation result for idempotent replay.
    ///
    /// Already-completed sessions are returned unchanged (no-op success,
    /// not an error). Only the stored status gates the swap; expiry is
    /// the caller's concern, checked before reconciliation starts.
    pub async fn mark_completed(
        &self,
        session_id: &str,
        accounts_linked: u32,
    ) -> Result<LinkSession, CoreError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(session_id).ok_or(CoreError::NotFound {
            entity: "session",
            id: session_id.to_string(),
        })?;

        if session.status == SessionStatus::Pending {
            session.status = SessionStatus::Completed;
            session.accounts_linked = Some(accounts_linked);
        }

        Ok(session.clone())
    }
}
