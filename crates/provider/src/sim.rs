//! Deterministic local substitute for the provider API.
//!
//! Used whenever [`crate::ProviderConfig::resolve_mode`] selects
//! simulation mode. Responses reuse the exact wire types the live client
//! decodes, so everything downstream of the mode decision sees identical
//! shapes. All data is synthesized deterministically; no network, no
//! state beyond a process-wide sequence counter.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

use tally_core::merchant::Merchant;
use tally_core::types::UserId;

use crate::types::{ProviderAccount, ProviderTransaction, SessionHandle, TransactionSyncPage};

/// Process-wide sequence for simulated session ids. The embedded
/// timestamp alone can collide when a test harness or an impatient user
/// retries onboarding within the same millisecond.
static SESSION_SEQ: AtomicU64 = AtomicU64::new(0);

/// Transactions served per sync page.
const PAGE_SIZE: u32 = 2;
/// Simulated transaction history length per merchant.
const HISTORY_LEN: u32 = 5;

/// Synthesize a linking session for a user.
///
/// The id embeds the user, a unix-millis timestamp, and a sequence
/// number, guaranteeing uniqueness across rapid repeated calls from the
/// same user. Expiry is left unset so callers apply the standard local
/// window, same as when the live provider omits it.
pub fn create_session(user_id: UserId, now: DateTime<Utc>) -> SessionHandle {
    let seq = SESSION_SEQ.fetch_add(1, Ordering::Relaxed);
    let session = format!("sim-{user_id}-{}-{seq}", now.timestamp_millis());
    SessionHandle {
        session_token: Some(format!("sim-token-{session}")),
        session,
        expires_at: None,
    }
}

/// Re-issue a handle for an existing simulated session.
pub fn extend_session(session_id: &str) -> SessionHandle {
    SessionHandle {
        session: session_id.to_string(),
        session_token: Some(format!("sim-token-{session_id}")),
        expires_at: None,
    }
}

/// Fixed merchant catalog.
pub fn list_merchants(merchant_type: &str) -> Vec<Merchant> {
    let features = vec![merchant_type.to_string()];
    [("amazon", "Amazon"), ("doordash", "DoorDash"), ("ubereats", "Uber Eats")]
        .into_iter()
        .map(|(id, name)| Merchant {
            id: id.to_string(),
            name: name.to_string(),
            logo_url: None,
            supported_features: features.clone(),
        })
        .collect()
}

/// One linked Amazon account, the same for every user.
///
/// Account identity is stable across calls so reconciliation dedup takes
/// the update path on repeated onboarding, exactly as it would against
/// the live API.
pub fn get_accounts(_user_id: UserId, merchant_id: Option<&str>) -> Vec<ProviderAccount> {
    let account = ProviderAccount {
        id: "acct-amazon-001".to_string(),
        merchant_id: "amazon".to_string(),
        merchant_name: "Amazon".to_string(),
        status: Some("active".to_string()),
        permissions: serde_json::json!({ "transactions": true, "cards": true }),
        linked_at: Some("2026-01-15T09:00:00Z".to_string()),
    };

    match merchant_id {
        Some(m) if m != account.merchant_id => Vec::new(),
        _ => vec![account],
    }
}

/// One page of the simulated transaction history for a merchant.
///
/// Cursors have the form `cursor-{offset}`. A call without a cursor
/// starts from the beginning. Every page that served items carries a
/// `next_cursor` past them (so a caller storing it never re-requests a
/// page it already saw); only an empty catch-up page omits it.
pub fn sync_transactions(
    _user_id: UserId,
    merchant_id: &str,
    cursor: Option<&str>,
    limit: u32,
) -> TransactionSyncPage {
    let offset = cursor
        .and_then(|c| c.strip_prefix("cursor-"))
        .and_then(|n| n.parse::<u32>().ok())
        .unwrap_or(0)
        .min(HISTORY_LEN);

    let take = PAGE_SIZE.min(limit.max(1)).min(HISTORY_LEN - offset);
    let transactions = (offset..offset + take)
        .map(|i| transaction(merchant_id, i))
        .collect();

    let end = offset + take;
    TransactionSyncPage {
        transactions,
        next_cursor: (take > 0).then(|| format!("cursor-{end}")),
        has_more: end < HISTORY_LEN,
    }
}

fn transaction(merchant_id: &str, index: u32) -> ProviderTransaction {
    ProviderTransaction {
        id: format!("{merchant_id}-txn-{index:03}"),
        merchant_id: Some(merchant_id.to_string()),
        amount: 12.50 + 7.25 * index as f64,
        currency: "USD".to_string(),
        description: format!("Order #{:04}", 1000 + index),
        date: format!("2026-07-{:02}T12:00:00Z", 20 - index),
        category: Some("shopping".to_string()),
        metadata: serde_json::json!({}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_unique_under_rapid_calls() {
        let now = Utc::now();
        let mut ids: Vec<String> = (0..50)
            .map(|_| create_session(7, now).session)
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn session_embeds_user_and_has_token() {
        let handle = create_session(42, Utc::now());
        assert!(handle.session.starts_with("sim-42-"));
        assert!(handle.resolved_token().starts_with("sim-token-"));
        assert_eq!(handle.resolved_expiry(), None);
    }

    #[test]
    fn extend_reissues_the_same_session() {
        let handle = extend_session("sim-1-123-0");
        assert_eq!(handle.session, "sim-1-123-0");
        assert!(handle.resolved_token().contains("sim-1-123-0"));
    }

    #[test]
    fn accounts_are_stable_across_calls() {
        let first = get_accounts(1, None);
        let second = get_accounts(1, None);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, second[0].id);
        assert_eq!(first[0].id, "acct-amazon-001");
    }

    #[test]
    fn account_filter_by_merchant() {
        assert_eq!(get_accounts(1, Some("amazon")).len(), 1);
        assert!(get_accounts(1, Some("doordash")).is_empty());
    }

    #[test]
    fn pages_never_overlap_and_terminate() {
        let mut cursor: Option<String> = None;
        let mut seen = Vec::new();

        loop {
            let page = sync_transactions(1, "amazon", cursor.as_deref(), 100);
            for txn in &page.transactions {
                assert!(!seen.contains(&txn.id), "page re-served {}", txn.id);
                seen.push(txn.id.clone());
            }
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        assert_eq!(seen.len(), HISTORY_LEN as usize);
    }

    #[test]
    fn second_request_resumes_where_first_ended() {
        let first = sync_transactions(1, "amazon", None, 100);
        let next_cursor = first.next_cursor.clone().unwrap();
        let second = sync_transactions(1, "amazon", Some(&next_cursor), 100);
        assert_ne!(first.transactions[0].id, second.transactions[0].id);
    }

    #[test]
    fn limit_caps_page_size() {
        let page = sync_transactions(1, "amazon", None, 1);
        assert_eq!(page.transactions.len(), 1);
        assert_eq!(page.next_cursor.as_deref(), Some("cursor-1"));
    }

    #[test]
    fn exhausted_cursor_yields_empty_terminal_page() {
        let page = sync_transactions(1, "amazon", Some("cursor-5"), 100);
        assert!(page.transactions.is_empty());
        assert_eq!(page.next_cursor, None);
        assert!(!page.has_more);
    }
}
