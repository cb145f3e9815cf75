//! Normalized channel message handed to the index by ingestion.
//!
//! Live updates and export imports both produce this shape; the repository upserts it
//! under the natural key `(chat_id, message_id)`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a message was harvested from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MessageSource {
    Live,
    Import,
}

impl MessageSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageSource::Live => "live",
            MessageSource::Import => "import",
        }
    }
}

impl fmt::Display for MessageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(MessageSource::Live),
            "import" => Ok(MessageSource::Import),
            other => Err(format!("unknown message source: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedMessage {
    pub message_id: i64,
    pub chat_id: i64,
    /// Display text after normalization (trimmed, never empty for indexable messages).
    pub text: String,
    /// Origin time in unix seconds.
    pub timestamp: i64,
    pub edited_timestamp: Option<i64>,
    pub source: MessageSource,
    /// Public channel username without the leading `@`.
    pub channel_username: Option<String>,
    pub source_link: Option<String>,
}

impl NormalizedMessage {
    /// Creates a message with trimmed text and no username, link or edit time.
    pub fn new(
        chat_id: i64,
        message_id: i64,
        text: impl Into<String>,
        timestamp: i64,
        source: MessageSource,
    ) -> Self {
        Self {
            message_id,
            chat_id,
            text: text.into().trim().to_string(),
            timestamp,
            edited_timestamp: None,
            source,
            channel_username: None,
            source_link: None,
        }
    }

    /// Sets the channel username; a leading `@` is dropped and blank names become `None`.
    pub fn with_channel_username(mut self, username: Option<&str>) -> Self {
        self.channel_username = username
            .map(|u| u.trim().trim_start_matches('@').to_string())
            .filter(|u| !u.is_empty());
        self
    }

    pub fn with_source_link(mut self, link: Option<&str>) -> Self {
        self.source_link = link
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
        self
    }

    pub fn with_edited_timestamp(mut self, edited_timestamp: Option<i64>) -> Self {
        self.edited_timestamp = edited_timestamp.filter(|ts| *ts > 0);
        self
    }
}
