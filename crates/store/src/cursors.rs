//! Transaction sync cursors, one live cursor per `(user, merchant)`.

use std::collections::HashMap;

use tokio::sync::RwLock;

use tally_core::types::UserId;

#[derive(Default)]
pub struct CursorStore {
    cursors: RwLock<HashMap<(UserId, String), String>>,
}

impl CursorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, user_id: UserId, merchant_id: &str) -> Option<String> {
        self.cursors
            .read()
            .await
            .get(&(user_id, merchant_id.to_string()))
            .cloned()
    }

    /// Record the cursor a sync returned. A `Some` overwrites the stored
    /// value; `None` (terminal page, history caught up) retains the
    /// previous cursor so the next sync resumes at the tail instead of
    /// re-reading history from the start.
    pub async fn advance(&self, user_id: UserId, merchant_id: &str, next_cursor: Option<&str>) {
        if let Some(cursor) = next_cursor {
            self.cursors
                .write()
                .await
                .insert((user_id, merchant_id.to_string()), cursor.to_string());
        }
    }
}
