//! Ingestion path: tokenize a normalized message and upsert it with its index terms.

use std::sync::Arc;

use storage::{MessageIndex, NormalizedMessage};
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::tokenizer::Tokenizer;

#[derive(Clone)]
pub struct Indexer {
    index: Arc<dyn MessageIndex>,
    tokenizer: Arc<Tokenizer>,
}

impl Indexer {
    pub fn new(index: Arc<dyn MessageIndex>, tokenizer: Arc<Tokenizer>) -> Self {
        Self { index, tokenizer }
    }

    /// Indexes one message. Returns `Ok(None)` when the text has no index terms, otherwise the
    /// surrogate id of the inserted or merged row.
    #[instrument(skip(self, message), fields(chat_id = message.chat_id, message_id = message.message_id))]
    pub async fn index(&self, message: &NormalizedMessage) -> Result<Option<i64>> {
        let tokens = self.tokenizer.tokenize(&message.text);
        if tokens.is_empty() {
            debug!("step: message has no index terms, skipped");
            return Ok(None);
        }

        let id = self.index.upsert(message, &tokens).await?;
        info!(
            id,
            tokens = tokens.len(),
            source = %message.source,
            "step: message indexed"
        );
        Ok(Some(id))
    }
}
