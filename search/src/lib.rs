//! # search
//!
//! Indexing and retrieval over the [`storage`] crate:
//!
//! - [`tokenizer`] – normalization, pluggable word segmentation, stopwords, bigram fallback
//! - [`query_builder`] – FTS5 match expression (AND of prefix terms)
//! - [`service`] – [`SearchService`]: tokenize → build → search / count
//! - [`indexer`] – [`Indexer`]: tokenize and upsert one normalized message
//! - [`input`] – leading `@channel` / `#channel` parsing of raw search input
//! - [`session`] – bounded, expiring [`SessionCache`] for multi-page browsing
//! - [`pagination`] – [`PageCursor`] math, page callback tokens and [`Paginator`]

pub mod error;
pub mod indexer;
pub mod input;
pub mod pagination;
pub mod query_builder;
pub mod service;
pub mod session;
pub mod tokenizer;

pub use error::SearchError;
pub use indexer::Indexer;
pub use input::{InputMode, SearchInput};
pub use pagination::{Page, PageCursor, PageRequest, Paginator};
pub use query_builder::build_match_expression;
pub use service::SearchService;
pub use session::{SearchSession, SessionCache};
pub use tokenizer::{normalize_text, JiebaSegmenter, Segmenter, Tokenizer, DEFAULT_STOPWORDS};
