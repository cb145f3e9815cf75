//! Aggregate statistics for the message index.
//!
//! Returned by MessageRepository::stats.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_messages: i64,
    pub live_messages: i64,
    pub imported_messages: i64,
    pub unique_chats: i64,
    pub aliases: i64,
    pub first_timestamp: Option<i64>,
    pub last_timestamp: Option<i64>,
}
