//! Raw search input parsing: an optional leading channel token followed by keywords.

use storage::ChannelFilter;

/// Where the raw text came from; decides which leading token names a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Free text in a private chat: `@channel keywords`.
    Private,
    /// `/search @channel keywords`.
    Command,
    /// Inline query: `#channel keywords`.
    Inline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchInput {
    pub channel: ChannelFilter,
    pub query: String,
}

impl SearchInput {
    pub fn parse(text: &str, mode: InputMode) -> Self {
        let mut raw = text.trim();
        if mode == InputMode::Command {
            if let Some(rest) = raw.strip_prefix("/search") {
                raw = rest.trim();
            }
        }
        if raw.is_empty() {
            return Self {
                channel: ChannelFilter::None,
                query: String::new(),
            };
        }

        let (first, rest) = raw.split_once(char::is_whitespace).unwrap_or((raw, ""));
        let sigil = match mode {
            InputMode::Private | InputMode::Command => '@',
            InputMode::Inline => '#',
        };
        if first.starts_with(sigil) {
            return Self {
                channel: ChannelFilter::parse(first),
                query: rest.trim().to_string(),
            };
        }

        Self {
            channel: ChannelFilter::None,
            query: raw.to_string(),
        }
    }
}
