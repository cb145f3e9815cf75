//! Channel scoping for search.
//!
//! Users type `@name`, `#name` or a raw numeric chat id; [`ChannelFilter::parse`] turns that into
//! a tagged value once, and the repository resolves it to a [`ChannelScope`].

use serde::{Deserialize, Serialize};

/// A channel restriction as supplied by the caller, before resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelFilter {
    /// No restriction.
    #[default]
    None,
    /// Public username without sigil, looked up in the alias table.
    Username(String),
    /// Numeric chat identifier, used as-is.
    ChatId(i64),
}

impl ChannelFilter {
    /// Parses a raw filter: blank means no filter; one leading `@` or `#` is dropped; an optional
    /// `-` followed by digits is a chat id; anything else is a username.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return ChannelFilter::None;
        }
        let name = trimmed
            .strip_prefix('@')
            .or_else(|| trimmed.strip_prefix('#'))
            .unwrap_or(trimmed);
        if is_numeric_id(name) {
            if let Ok(chat_id) = name.parse::<i64>() {
                return ChannelFilter::ChatId(chat_id);
            }
        }
        ChannelFilter::Username(name.to_string())
    }

    /// Parses an optional raw filter; `None` means no filter.
    pub fn from_option(raw: Option<&str>) -> Self {
        raw.map(Self::parse).unwrap_or_default()
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ChannelFilter::None)
    }
}

fn is_numeric_id(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Outcome of resolving a [`ChannelFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelScope {
    /// No filter was supplied; search every chat.
    Unscoped,
    Chat(i64),
    /// A filter was supplied but names no known channel. Searches must return nothing.
    Unresolved,
}
