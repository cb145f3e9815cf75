//! Schema bootstrap for channel messages, channel aliases and the FTS5 index.
//!
//! `channel_messages_fts` is an external-content FTS5 table over `channel_messages.tokens`.
//! The triggers keep it in step with every insert, update and delete, inside the same
//! transaction as the row write.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::StorageError;

const CREATE_MESSAGES: &str = r#"
CREATE TABLE IF NOT EXISTS channel_messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    chat_id INTEGER NOT NULL,
    message_id INTEGER NOT NULL,
    channel_username TEXT,
    source_link TEXT,
    text TEXT NOT NULL,
    tokens TEXT NOT NULL,
    timestamp INTEGER NOT NULL,
    edited_timestamp INTEGER,
    source TEXT NOT NULL CHECK (source IN ('live', 'import')),
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    UNIQUE (chat_id, message_id)
)
"#;

const CREATE_ALIAS: &str = r#"
CREATE TABLE IF NOT EXISTS channel_alias (
    chat_id INTEGER PRIMARY KEY,
    username TEXT NOT NULL,
    updated_at INTEGER NOT NULL DEFAULT 0
)
"#;

const CREATE_FTS: &str = r#"
CREATE VIRTUAL TABLE IF NOT EXISTS channel_messages_fts USING fts5(
    tokens,
    content = 'channel_messages',
    content_rowid = 'id'
)
"#;

const TRIGGERS: [&str; 3] = [
    r#"
CREATE TRIGGER IF NOT EXISTS channel_messages_ai AFTER INSERT ON channel_messages BEGIN
    INSERT INTO channel_messages_fts(rowid, tokens) VALUES (NEW.id, NEW.tokens);
END
"#,
    r#"
CREATE TRIGGER IF NOT EXISTS channel_messages_ad AFTER DELETE ON channel_messages BEGIN
    INSERT INTO channel_messages_fts(channel_messages_fts, rowid, tokens)
    VALUES ('delete', OLD.id, OLD.tokens);
END
"#,
    r#"
CREATE TRIGGER IF NOT EXISTS channel_messages_au AFTER UPDATE ON channel_messages BEGIN
    INSERT INTO channel_messages_fts(channel_messages_fts, rowid, tokens)
    VALUES ('delete', OLD.id, OLD.tokens);
    INSERT INTO channel_messages_fts(rowid, tokens) VALUES (NEW.id, NEW.tokens);
END
"#,
];

const INDEXES: [&str; 3] = [
    "CREATE INDEX IF NOT EXISTS idx_channel_messages_chat_ts ON channel_messages(chat_id, timestamp DESC)",
    "CREATE INDEX IF NOT EXISTS idx_channel_messages_ts ON channel_messages(timestamp DESC)",
    "CREATE INDEX IF NOT EXISTS idx_channel_alias_username ON channel_alias(username COLLATE NOCASE)",
];

/// Creates every table, index and trigger if missing, and adds columns absent from older databases.
pub(crate) async fn init_schema(pool: &SqlitePool) -> Result<(), StorageError> {
    info!("Creating database tables if not exist");

    sqlx::query(CREATE_MESSAGES).execute(pool).await?;
    sqlx::query(CREATE_ALIAS).execute(pool).await?;
    ensure_columns(pool).await?;

    let fts_exists: Option<(String,)> = sqlx::query_as(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'channel_messages_fts'",
    )
    .fetch_optional(pool)
    .await?;
    sqlx::query(CREATE_FTS).execute(pool).await?;
    if fts_exists.is_none() {
        // Rows written before the index existed.
        sqlx::query("INSERT INTO channel_messages_fts(channel_messages_fts) VALUES ('rebuild')")
            .execute(pool)
            .await?;
    }
    for trigger in TRIGGERS {
        sqlx::query(trigger).execute(pool).await?;
    }
    for index in INDEXES {
        sqlx::query(index).execute(pool).await?;
    }

    info!("Database tables created successfully");
    Ok(())
}

async fn ensure_columns(pool: &SqlitePool) -> Result<(), StorageError> {
    let message_columns = table_columns(pool, "channel_messages").await?;
    if message_columns.is_empty() {
        return Err(StorageError::Schema(
            "channel_messages has no columns after creation".to_string(),
        ));
    }
    if !message_columns.iter().any(|c| c == "source_link") {
        info!("Adding missing column channel_messages.source_link");
        sqlx::query("ALTER TABLE channel_messages ADD COLUMN source_link TEXT")
            .execute(pool)
            .await?;
    }

    let alias_columns = table_columns(pool, "channel_alias").await?;
    if !alias_columns.iter().any(|c| c == "updated_at") {
        info!("Adding missing column channel_alias.updated_at");
        sqlx::query("ALTER TABLE channel_alias ADD COLUMN updated_at INTEGER NOT NULL DEFAULT 0")
            .execute(pool)
            .await?;
    }
    Ok(())
}

async fn table_columns(pool: &SqlitePool, table: &str) -> Result<Vec<String>, StorageError> {
    let columns: Vec<(String,)> = sqlx::query_as("SELECT name FROM pragma_table_info(?)")
        .bind(table)
        .fetch_all(pool)
        .await?;
    Ok(columns.into_iter().map(|(name,)| name).collect())
}
