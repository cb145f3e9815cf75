use async_trait::async_trait;

use crate::error::StorageError;
use crate::models::{ChannelFilter, ChannelScope, NormalizedMessage, SearchQuery, SearchRow};

/// Storage seam for the search service: message upsert, channel resolution and ranked search.
#[async_trait]
pub trait MessageIndex: Send + Sync {
    /// Inserts or merges a message with its index terms atomically; returns the surrogate id.
    async fn upsert(
        &self,
        message: &NormalizedMessage,
        tokens: &[String],
    ) -> Result<i64, StorageError>;

    async fn resolve_channel(&self, filter: &ChannelFilter) -> Result<ChannelScope, StorageError>;

    /// One page of hits, newest first. An unresolved channel filter yields an empty page.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchRow>, StorageError>;

    /// Total hits for the same filtering as [`MessageIndex::search`], without pagination.
    async fn count(
        &self,
        match_expression: &str,
        channel: &ChannelFilter,
    ) -> Result<i64, StorageError>;
}
