//! One ranked search hit, as handed to rendering collaborators.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SearchRow {
    pub id: i64,
    pub chat_id: i64,
    pub message_id: i64,
    pub channel_username: Option<String>,
    pub source_link: Option<String>,
    pub text: String,
    pub timestamp: i64,
}

impl SearchRow {
    /// Public link to the message, if one can be formed.
    pub fn link(&self) -> Option<String> {
        build_message_link(
            self.channel_username.as_deref(),
            self.message_id,
            self.source_link.as_deref(),
            Some(self.chat_id),
        )
    }
}

/// Builds a `t.me` link: a stored link wins, then the public username form, then the
/// private `t.me/c/` form for `-100…` chat ids.
pub fn build_message_link(
    channel_username: Option<&str>,
    message_id: i64,
    source_link: Option<&str>,
    chat_id: Option<i64>,
) -> Option<String> {
    if let Some(link) = source_link.filter(|l| !l.is_empty()) {
        return Some(link.to_string());
    }
    let username = channel_username
        .map(|u| u.trim_start_matches('@'))
        .filter(|u| !u.is_empty());
    match username {
        Some(username) => Some(format!("https://t.me/{}/{}", username, message_id)),
        None => chat_id.and_then(|id| private_link(id, message_id)),
    }
}

// Bot API channel ids are -100 followed by the internal id.
fn private_link(chat_id: i64, message_id: i64) -> Option<String> {
    if chat_id >= 0 {
        return None;
    }
    let digits = chat_id.unsigned_abs().to_string();
    let internal_id = digits.strip_prefix("100")?;
    if internal_id.is_empty() {
        return None;
    }
    Some(format!("https://t.me/c/{}/{}", internal_id, message_id))
}
