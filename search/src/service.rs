//! Search service: tokenize → build match expression → storage search / count.
//!
//! Empty input and input without indexable terms yield empty results, not errors. Storage
//! faults propagate unchanged; nothing is retried or cached here.

use std::sync::Arc;

use storage::{ChannelFilter, MessageIndex, SearchQuery, SearchRow};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::query_builder::build_match_expression;
use crate::tokenizer::Tokenizer;

#[derive(Clone)]
pub struct SearchService {
    index: Arc<dyn MessageIndex>,
    tokenizer: Arc<Tokenizer>,
}

impl SearchService {
    pub fn new(index: Arc<dyn MessageIndex>, tokenizer: Arc<Tokenizer>) -> Self {
        Self { index, tokenizer }
    }

    pub fn tokenizer(&self) -> &Arc<Tokenizer> {
        &self.tokenizer
    }

    /// One page of hits for `query_text`, newest first.
    #[instrument(skip(self, query_text, channel))]
    pub async fn search(
        &self,
        query_text: &str,
        limit: i64,
        offset: i64,
        channel: &ChannelFilter,
    ) -> Result<Vec<SearchRow>> {
        let Some(match_expression) = self.match_expression(query_text) else {
            return Ok(Vec::new());
        };

        let query = SearchQuery::new(match_expression, limit, offset).with_channel(channel.clone());
        let rows = self.index.search(&query).await?;
        debug!(rows = rows.len(), "step: search done");
        Ok(rows)
    }

    /// Total hits for `query_text`, used to compute page counts.
    #[instrument(skip(self, query_text, channel))]
    pub async fn count(&self, query_text: &str, channel: &ChannelFilter) -> Result<i64> {
        let Some(match_expression) = self.match_expression(query_text) else {
            return Ok(0);
        };
        Ok(self.index.count(&match_expression, channel).await?)
    }

    fn match_expression(&self, query_text: &str) -> Option<String> {
        let query_text = query_text.trim();
        if query_text.is_empty() {
            return None;
        }
        let tokens = self.tokenizer.tokenize(query_text);
        let match_expression = build_match_expression(&tokens);
        debug!(
            query = %query_text,
            tokens = tokens.len(),
            match_expression = ?match_expression,
            "step: query built"
        );
        match_expression
    }
}
