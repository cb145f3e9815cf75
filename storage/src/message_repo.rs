//! Message repository: channel message persistence and full-text search.
//!
//! Uses SqlitePoolManager and the schema in [`crate::schema`]. Every upsert runs in one
//! transaction; the FTS5 triggers update the index inside it.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::error::StorageError;
use crate::models::{
    ChannelFilter, ChannelScope, IndexStats, MessageRecord, MessageSource, NormalizedMessage,
    SearchQuery, SearchRow,
};
use crate::repository::MessageIndex;
use crate::schema::init_schema;
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct MessageRepository {
    pool_manager: SqlitePoolManager,
    write_lock: Arc<Mutex<()>>,
}

impl MessageRepository {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        init_schema(pool_manager.pool()).await?;
        Ok(Self {
            pool_manager,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Inserts the message or merges it into the row with the same `(chat_id, message_id)`.
    ///
    /// Content and metadata are overwritten, except `source_link`, which is never cleared by an
    /// update that carries none. A present username also refreshes the channel alias.
    #[instrument(skip(self, message, tokens), fields(chat_id = message.chat_id, message_id = message.message_id))]
    pub async fn upsert_message(
        &self,
        message: &NormalizedMessage,
        tokens: &[String],
    ) -> Result<i64, StorageError> {
        let now = Utc::now().timestamp();
        let token_text = tokens.join(" ");
        let username = message
            .channel_username
            .as_deref()
            .map(|u| u.trim_start_matches('@'))
            .filter(|u| !u.is_empty());

        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool_manager.pool().begin().await?;

        sqlx::query(
            r#"
            INSERT INTO channel_messages (
                chat_id, message_id, channel_username, source_link, text, tokens,
                timestamp, edited_timestamp, source, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(chat_id, message_id) DO UPDATE SET
                channel_username = excluded.channel_username,
                source_link = COALESCE(excluded.source_link, channel_messages.source_link),
                text = excluded.text,
                tokens = excluded.tokens,
                timestamp = excluded.timestamp,
                edited_timestamp = excluded.edited_timestamp,
                source = excluded.source,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(message.chat_id)
        .bind(message.message_id)
        .bind(username)
        .bind(message.source_link.as_deref())
        .bind(&message.text)
        .bind(&token_text)
        .bind(message.timestamp)
        .bind(message.edited_timestamp)
        .bind(message.source)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if let Some(username) = username {
            sqlx::query(
                r#"
                INSERT INTO channel_alias (chat_id, username, updated_at) VALUES (?, ?, ?)
                ON CONFLICT(chat_id) DO UPDATE SET
                    username = excluded.username,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(message.chat_id)
            .bind(username)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        let (id,): (i64,) =
            sqlx::query_as("SELECT id FROM channel_messages WHERE chat_id = ? AND message_id = ?")
                .bind(message.chat_id)
                .bind(message.message_id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;

        debug!(id, tokens = tokens.len(), "Upserted channel message");
        Ok(id)
    }

    /// Resolves a channel filter: numeric ids pass through, names go through the alias table.
    pub async fn resolve_channel(
        &self,
        filter: &ChannelFilter,
    ) -> Result<ChannelScope, StorageError> {
        match filter {
            ChannelFilter::None => Ok(ChannelScope::Unscoped),
            ChannelFilter::ChatId(chat_id) => Ok(ChannelScope::Chat(*chat_id)),
            ChannelFilter::Username(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Ok(ChannelScope::Unresolved);
                }
                let row: Option<(i64,)> = sqlx::query_as(
                    r#"
                    SELECT chat_id FROM channel_alias
                    WHERE username = ? COLLATE NOCASE
                    ORDER BY updated_at DESC
                    LIMIT 1
                    "#,
                )
                .bind(name)
                .fetch_optional(self.pool_manager.pool())
                .await?;
                Ok(row.map_or(ChannelScope::Unresolved, |(chat_id,)| ChannelScope::Chat(chat_id)))
            }
        }
    }

    /// Runs the match expression against the FTS5 index, newest first, ties broken by id.
    #[instrument(skip(self, query), fields(limit = query.limit, offset = query.offset))]
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchRow>, StorageError> {
        let chat_id = match self.resolve_channel(&query.channel).await? {
            ChannelScope::Unresolved => {
                info!(channel = ?query.channel, "Channel filter unresolved, returning no rows");
                return Ok(Vec::new());
            }
            ChannelScope::Chat(chat_id) => Some(chat_id),
            ChannelScope::Unscoped => None,
        };

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT m.id, m.chat_id, m.message_id, m.channel_username, m.source_link, m.text, m.timestamp
            FROM channel_messages_fts
            JOIN channel_messages m ON m.id = channel_messages_fts.rowid
            WHERE channel_messages_fts MATCH "#,
        );
        builder.push_bind(query.match_expression.as_str());
        if let Some(chat_id) = chat_id {
            builder.push(" AND m.chat_id = ").push_bind(chat_id);
        }
        builder
            .push(" ORDER BY m.timestamp DESC, m.id DESC LIMIT ")
            .push_bind(query.limit.max(0))
            .push(" OFFSET ")
            .push_bind(query.offset.max(0));

        let rows: Vec<SearchRow> = builder
            .build_query_as()
            .fetch_all(self.pool_manager.pool())
            .await?;

        debug!(
            match_expression = %query.match_expression,
            rows = rows.len(),
            "Search finished"
        );
        Ok(rows)
    }

    /// Counts hits with the same filtering as [`MessageRepository::search`].
    pub async fn search_count(
        &self,
        match_expression: &str,
        channel: &ChannelFilter,
    ) -> Result<i64, StorageError> {
        let chat_id = match self.resolve_channel(channel).await? {
            ChannelScope::Unresolved => return Ok(0),
            ChannelScope::Chat(chat_id) => Some(chat_id),
            ChannelScope::Unscoped => None,
        };

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT COUNT(1)
            FROM channel_messages_fts
            JOIN channel_messages m ON m.id = channel_messages_fts.rowid
            WHERE channel_messages_fts MATCH "#,
        );
        builder.push_bind(match_expression);
        if let Some(chat_id) = chat_id {
            builder.push(" AND m.chat_id = ").push_bind(chat_id);
        }

        let (count,): (i64,) = builder
            .build_query_as()
            .fetch_one(self.pool_manager.pool())
            .await?;
        Ok(count)
    }

    pub async fn get_message(
        &self,
        chat_id: i64,
        message_id: i64,
    ) -> Result<Option<MessageRecord>, StorageError> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT id, chat_id, message_id, channel_username, source_link, text, tokens,
                   timestamp, edited_timestamp, source, created_at, updated_at
            FROM channel_messages
            WHERE chat_id = ? AND message_id = ?
            "#,
        )
        .bind(chat_id)
        .bind(message_id)
        .fetch_optional(self.pool_manager.pool())
        .await?;

        Ok(record)
    }

    pub async fn stats(&self) -> Result<IndexStats, StorageError> {
        let pool = self.pool_manager.pool();

        let (total_messages, live_messages, imported_messages, unique_chats, first_timestamp, last_timestamp): (
            i64,
            i64,
            i64,
            i64,
            Option<i64>,
            Option<i64>,
        ) = sqlx::query_as(
            r#"
            SELECT
                COUNT(1),
                COALESCE(SUM(CASE WHEN source = ? THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN source = ? THEN 1 ELSE 0 END), 0),
                COUNT(DISTINCT chat_id),
                MIN(timestamp),
                MAX(timestamp)
            FROM channel_messages
            "#,
        )
        .bind(MessageSource::Live)
        .bind(MessageSource::Import)
        .fetch_one(pool)
        .await?;

        let (aliases,): (i64,) = sqlx::query_as("SELECT COUNT(1) FROM channel_alias")
            .fetch_one(pool)
            .await?;

        Ok(IndexStats {
            total_messages,
            live_messages,
            imported_messages,
            unique_chats,
            aliases,
            first_timestamp,
            last_timestamp,
        })
    }
}

#[async_trait]
impl MessageIndex for MessageRepository {
    async fn upsert(
        &self,
        message: &NormalizedMessage,
        tokens: &[String],
    ) -> Result<i64, StorageError> {
        self.upsert_message(message, tokens).await
    }

    async fn resolve_channel(&self, filter: &ChannelFilter) -> Result<ChannelScope, StorageError> {
        MessageRepository::resolve_channel(self, filter).await
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchRow>, StorageError> {
        MessageRepository::search(self, query).await
    }

    async fn count(
        &self,
        match_expression: &str,
        channel: &ChannelFilter,
    ) -> Result<i64, StorageError> {
        self.search_count(match_expression, channel).await
    }
}
