//! Storage crate: channel message persistence and the full-text index.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – NormalizedMessage, MessageRecord, SearchRow, SearchQuery, ChannelFilter, IndexStats
//! - [`repository`] – MessageIndex trait (upsert / resolve / search / count)
//! - [`message_repo`] – MessageRepository (SQLite + FTS5)
//! - [`schema`] – table, FTS5 and trigger bootstrap
//! - [`sqlite_pool`] – SqlitePoolManager

mod error;
mod message_repo;
mod models;
mod repository;
mod schema;
mod sqlite_pool;

pub use error::StorageError;
pub use message_repo::MessageRepository;
pub use models::{
    build_message_link, ChannelFilter, ChannelScope, IndexStats, MessageRecord, MessageSource,
    NormalizedMessage, SearchQuery, SearchRow,
};
pub use repository::MessageIndex;
pub use sqlite_pool::SqlitePoolManager;
