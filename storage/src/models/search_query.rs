//! Parameters for one page of full-text search.
//!
//! Used by MessageIndex::search.

use serde::{Deserialize, Serialize};

use super::channel_filter::ChannelFilter;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// FTS5 match expression, never empty.
    pub match_expression: String,
    pub limit: i64,
    /// Pagination offset (used with limit).
    pub offset: i64,
    pub channel: ChannelFilter,
}

impl SearchQuery {
    pub fn new(match_expression: impl Into<String>, limit: i64, offset: i64) -> Self {
        Self {
            match_expression: match_expression.into(),
            limit,
            offset,
            channel: ChannelFilter::None,
        }
    }

    pub fn with_channel(mut self, channel: ChannelFilter) -> Self {
        self.channel = channel;
        self
    }
}
