//! Storage models.

mod channel_filter;
mod index_stats;
mod message_record;
mod normalized_message;
mod search_query;
mod search_row;

pub use channel_filter::{ChannelFilter, ChannelScope};
pub use index_stats::IndexStats;
pub use message_record::MessageRecord;
pub use normalized_message::{MessageSource, NormalizedMessage};
pub use search_query::SearchQuery;
pub use search_row::{build_message_link, SearchRow};
