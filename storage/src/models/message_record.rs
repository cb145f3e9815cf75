//! Message record model for persistence.
//!
//! Maps to the `channel_messages` table and is returned by MessageRepository::get_message.

use serde::{Deserialize, Serialize};

use super::normalized_message::MessageSource;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MessageRecord {
    /// Surrogate id, assigned on first insert and stable across edits.
    pub id: i64,
    pub chat_id: i64,
    pub message_id: i64,
    pub channel_username: Option<String>,
    pub source_link: Option<String>,
    pub text: String,
    /// Space-joined index terms the FTS5 table is built from.
    #[sqlx(rename = "tokens")]
    pub token_text: String,
    pub timestamp: i64,
    pub edited_timestamp: Option<i64>,
    pub source: MessageSource,
    pub created_at: i64,
    pub updated_at: i64,
}
