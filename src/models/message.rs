use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::user::UserSummary;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: String,
    pub from_username: String,
    pub to_username: String,
    pub body: String,
    pub sent_at: String,
    pub read_at: Option<String>,
}

/// Full view returned for a single message: both counterpart snippets are
/// resolved through the users table at projection time, never stored on
/// the message row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageView {
    pub id: String,
    pub body: String,
    pub sent_at: String,
    pub read_at: Option<String>,
    pub from_user: UserSummary,
    pub to_user: UserSummary,
}

/// Directional view for "messages from X": the sender side is implied by
/// the query, only the recipient snippet is nested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentMessageView {
    pub id: String,
    pub body: String,
    pub sent_at: String,
    pub read_at: Option<String>,
    pub to_user: UserSummary,
}

/// Directional view for "messages to X": only the sender snippet is nested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceivedMessageView {
    pub id: String,
    pub body: String,
    pub sent_at: String,
    pub read_at: Option<String>,
    pub from_user: UserSummary,
}

impl Message {
    pub fn new(from_username: String, to_username: String, body: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            from_username,
            to_username,
            body,
            sent_at: Utc::now().to_rfc3339(),
            read_at: None,
        }
    }

    pub fn involves(&self, username: &str) -> bool {
        self.from_username == username || self.to_username == username
    }
}
