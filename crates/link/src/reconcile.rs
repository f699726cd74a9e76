//! Linkage reconciliation: merge provider-reported accounts into the
//! per-user store.
//!
//! Reconciliation runs under a per-session guard and marks the session
//! completed only after the merge succeeds, so a provider failure midway
//! leaves the session pending and retryable. A session that is already
//! completed replays its memoized result without calling the provider.

use chrono::Utc;

use tally_core::account::LinkedAccount;
use tally_core::error::CoreError;
use tally_core::types::UserId;
use tally_provider::types::ProviderAccount;
use tally_provider::{sim, ProviderClient, ProviderConfig};
use tally_store::{NewAccount, Stores};

use crate::provider_to_core;

/// Result of reconciling one session.
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    /// Accounts new to the store -- not the total the provider returned.
    /// Users repeat onboarding for merchants they already linked; those
    /// rows are updated, not counted.
    pub accounts_linked: u32,
    /// The user's active rows after the merge.
    pub accounts: Vec<LinkedAccount>,
    /// Whether this call replayed an earlier completion.
    pub already_completed: bool,
}

#[derive(Clone)]
pub struct Reconciler {
    stores: Stores,
}

impl Reconciler {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// Pull the user's accounts from the provider and merge them in,
    /// completing the session.
    ///
    /// Caller must have validated the session via
    /// [`crate::SessionManager::touch`] first (ownership and expiry).
    pub async fn reconcile(
        &self,
        config: &ProviderConfig,
        user_id: UserId,
        session_id: &str,
    ) -> Result<ReconcileOutcome, CoreError> {
        // Serialize completions of this session: the loser of a
        // concurrent race blocks here, then sees the completed status.
        let guard = self.stores.sessions.completion_lock(session_id).await;
        let _held = guard.lock().await;

        let session = self
            .stores
            .sessions
            .get(session_id)
            .await
            .ok_or(CoreError::NotFound {
                entity: "session",
                id: session_id.to_string(),
            })?;

        if session.is_completed() {
            tracing::info!(user_id, session_id, "Session already completed, replaying result");
            return Ok(ReconcileOutcome {
                accounts_linked: session.accounts_linked.unwrap_or(0),
                accounts: self.stores.accounts.list_active(user_id).await,
                already_completed: true,
            });
        }

        // Fetch with the mode the session was created under. A live
        // session whose credentials vanished mid-flow fails loudly here
        // rather than silently mixing in synthetic account ids.
        let provider_accounts = if session.mode.is_live() {
            let client = ProviderClient::new(config).map_err(provider_to_core)?;
            client
                .get_accounts(&user_id.to_string(), None)
                .await
                .map_err(provider_to_core)?
        } else {
            sim::get_accounts(user_id, None)
        };

        self.merge_and_complete(user_id, session_id, provider_accounts)
            .await
    }

    /// Merge a fetched account list and flip the session to completed.
    ///
    /// Split from [`reconcile`](Self::reconcile) so the merge semantics
    /// are testable against arbitrary provider payloads, the empty list
    /// included.
    pub async fn merge_and_complete(
        &self,
        user_id: UserId,
        session_id: &str,
        provider_accounts: Vec<ProviderAccount>,
    ) -> Result<ReconcileOutcome, CoreError> {
        let now = Utc::now();
        let total = provider_accounts.len();
        let mut newly_linked = 0u32;

        for account in provider_accounts {
            let outcome = self
                .stores
                .accounts
                .upsert(
                    user_id,
                    NewAccount {
                        provider_account_id: account.id,
                        merchant_id: account.merchant_id,
                        account_label: format!("{} Account", account.merchant_name),
                        merchant_name: account.merchant_name,
                        permissions: account.permissions,
                    },
                    now,
                )
                .await;
            if outcome.newly_linked {
                newly_linked += 1;
            }
        }

        // Merge succeeded; only now does the session reach its terminal
        // state. Zero accounts is a deliberate user choice, not an error.
        self.stores
            .sessions
            .mark_completed(session_id, newly_linked)
            .await?;

        tracing::info!(
            user_id,
            session_id,
            provider_accounts = total,
            newly_linked,
            "Onboarding reconciliation complete",
        );

        Ok(ReconcileOutcome {
            accounts_linked: newly_linked,
            accounts: self.stores.accounts.list_active(user_id).await,
            already_completed: false,
        })
    }

    /// Re-fetch the user's accounts from the provider (current mode) and
    /// merge them in. Backs the `force_refresh`/staleness path of the
    /// accounts listing.
    pub async fn refresh_accounts(
        &self,
        config: &ProviderConfig,
        user_id: UserId,
    ) -> Result<Vec<LinkedAccount>, CoreError> {
        let provider_accounts = if config.resolve_mode().is_live() {
            let client = ProviderClient::new(config).map_err(provider_to_core)?;
            client
                .get_accounts(&user_id.to_string(), None)
                .await
                .map_err(provider_to_core)?
        } else {
            sim::get_accounts(user_id, None)
        };

        let now = Utc::now();
        for account in provider_accounts {
            self.stores
                .accounts
                .upsert(
                    user_id,
                    NewAccount {
                        provider_account_id: account.id,
                        merchant_id: account.merchant_id,
                        account_label: format!("{} Account", account.merchant_name),
                        merchant_name: account.merchant_name,
                        permissions: account.permissions,
                    },
                    now,
                )
                .await;
        }

        Ok(self.stores.accounts.list_active(user_id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::mode::ProviderMode;
    use tally_core::session::LinkSession;

    async fn insert_pending(stores: &Stores, session_id: &str, user_id: UserId) {
        let session = LinkSession::new_pending(
            session_id.into(),
            "tok".into(),
            user_id,
            ProviderMode::Simulated,
            None,
            Utc::now(),
        );
        stores.sessions.insert(session).await;
    }

    fn provider_account(id: &str, merchant: &str) -> ProviderAccount {
        ProviderAccount {
            id: id.into(),
            merchant_id: merchant.into(),
            merchant_name: "Amazon".into(),
            status: Some("active".into()),
            permissions: serde_json::json!({ "transactions": true }),
            linked_at: None,
        }
    }

    fn simulated_config() -> ProviderConfig {
        ProviderConfig {
            api_url: "https://provider.test".into(),
            client_id: String::new(),
            client_secret: String::new(),
            feature_enabled: false,
            session_type: "transaction_link".into(),
        }
    }

    #[tokio::test]
    async fn empty_account_list_still_completes_the_session() {
        let stores = Stores::default();
        insert_pending(&stores, "s1", 1).await;
        let reconciler = Reconciler::new(stores.clone());

        let outcome = reconciler
            .merge_and_complete(1, "s1", Vec::new())
            .await
            .unwrap();

        assert_eq!(outcome.accounts_linked, 0);
        assert!(outcome.accounts.is_empty());
        assert!(stores.sessions.get("s1").await.unwrap().is_completed());
    }

    #[tokio::test]
    async fn relink_counts_zero_new_accounts() {
        let stores = Stores::default();
        insert_pending(&stores, "s1", 1).await;
        insert_pending(&stores, "s2", 1).await;
        let reconciler = Reconciler::new(stores.clone());

        let first = reconciler
            .merge_and_complete(1, "s1", vec![provider_account("acct-1", "amazon")])
            .await
            .unwrap();
        assert_eq!(first.accounts_linked, 1);

        // Same provider account through a second onboarding session.
        let second = reconciler
            .merge_and_complete(1, "s2", vec![provider_account("acct-1", "amazon")])
            .await
            .unwrap();
        assert_eq!(second.accounts_linked, 0);
        assert_eq!(second.accounts.len(), 1);
        assert_eq!(
            first.accounts[0].account_id,
            second.accounts[0].account_id
        );
    }

    #[tokio::test]
    async fn completed_session_replays_without_refetch() {
        let stores = Stores::default();
        insert_pending(&stores, "s1", 1).await;
        let reconciler = Reconciler::new(stores.clone());
        let config = simulated_config();

        let first = reconciler.reconcile(&config, 1, "s1").await.unwrap();
        assert_eq!(first.accounts_linked, 1);
        assert!(!first.already_completed);

        let second = reconciler.reconcile(&config, 1, "s1").await.unwrap();
        assert_eq!(second.accounts_linked, 1);
        assert!(second.already_completed);
        assert_eq!(second.accounts.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_completions_merge_once() {
        let stores = Stores::default();
        insert_pending(&stores, "s1", 1).await;
        let reconciler = Reconciler::new(stores.clone());
        let config = simulated_config();

        let (a, b) = tokio::join!(
            reconciler.reconcile(&config, 1, "s1"),
            reconciler.reconcile(&config, 1, "s1"),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        // Exactly one call performed the merge; both report one linked row.
        assert!(a.already_completed != b.already_completed);
        assert_eq!(a.accounts_linked, 1);
        assert_eq!(b.accounts_linked, 1);
        assert_eq!(stores.accounts.list_active(1).await.len(), 1);
    }

    #[tokio::test]
    async fn refresh_accounts_updates_sync_timestamps() {
        let stores = Stores::default();
        insert_pending(&stores, "s1", 1).await;
        let reconciler = Reconciler::new(stores.clone());
        let config = simulated_config();

        reconciler.reconcile(&config, 1, "s1").await.unwrap();
        let before = stores.accounts.last_refreshed(1).await.unwrap();

        let refreshed = reconciler.refresh_accounts(&config, 1).await.unwrap();
        assert_eq!(refreshed.len(), 1);
        let after = stores.accounts.last_refreshed(1).await.unwrap();
        assert!(after >= before);
    }
}
