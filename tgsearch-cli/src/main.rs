//! tgsearch CLI: index single channel messages, run ranked channel-scoped searches, show index
//! stats. Config from env (.env is loaded first).

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use search::{Indexer, InputMode, PageCursor, Paginator, SearchInput, SearchService, SessionCache, Tokenizer};
use serde::Serialize;
use storage::{ChannelFilter, MessageRepository, MessageSource, NormalizedMessage, SearchRow};
use tgsearch_core::{init_tracing, SearchConfig};
use tracing::info;

#[derive(Parser)]
#[command(name = "tgsearch")]
#[command(about = "Channel message search CLI: index, search, stats", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index (insert or update) one channel message.
    Index {
        #[arg(long, allow_negative_numbers = true)]
        chat_id: i64,
        #[arg(long)]
        message_id: i64,
        #[arg(long)]
        text: String,
        /// Origin time in unix seconds; defaults to now.
        #[arg(long)]
        timestamp: Option<i64>,
        #[arg(long)]
        edited_timestamp: Option<i64>,
        /// Channel username, with or without `@`.
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        link: Option<String>,
        #[arg(long, default_value = "import")]
        source: MessageSource,
    },
    /// Search indexed messages. A leading `@channel` word scopes the search.
    Search {
        #[arg(required = true)]
        query: Vec<String>,
        /// Channel filter (`@name`, `#name` or numeric chat id); overrides a leading `@channel`.
        #[arg(short, long, allow_hyphen_values = true)]
        channel: Option<String>,
        /// Defaults to DEFAULT_SEARCH_LIMIT.
        #[arg(short, long)]
        limit: Option<i64>,
        #[arg(short, long, default_value = "0")]
        offset: i64,
        #[arg(long)]
        json: bool,
        /// Walk every page (PRIVATE_PAGE_SIZE each) through a pagination session.
        #[arg(long)]
        all_pages: bool,
    },
    /// Show index statistics.
    Stats {
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = SearchConfig::load().context("Load search config from env")?;
    init_tracing(&config.log_file).context("Initialize tracing")?;

    let repo = Arc::new(
        MessageRepository::new(&config.database_url)
            .await
            .with_context(|| format!("Open index database {}", config.database_url))?,
    );
    let tokenizer = Arc::new(Tokenizer::default());

    match cli.command {
        Commands::Index {
            chat_id,
            message_id,
            text,
            timestamp,
            edited_timestamp,
            username,
            link,
            source,
        } => {
            let message = NormalizedMessage::new(
                chat_id,
                message_id,
                text,
                timestamp.unwrap_or_else(|| Utc::now().timestamp()),
                source,
            )
            .with_edited_timestamp(edited_timestamp)
            .with_channel_username(username.as_deref())
            .with_source_link(link.as_deref());
            handle_index(Indexer::new(repo, tokenizer), &message).await
        }
        Commands::Search {
            query,
            channel,
            limit,
            offset,
            json,
            all_pages,
        } => {
            let service = SearchService::new(repo, tokenizer);
            let raw = query.join(" ");
            let input = match channel {
                Some(channel) => SearchInput {
                    channel: ChannelFilter::parse(&channel),
                    query: raw.trim().to_string(),
                },
                None => SearchInput::parse(&raw, InputMode::Private),
            };
            if input.query.is_empty() {
                eprintln!("Please enter keywords, e.g. `tgsearch search 你好世界` or `tgsearch search @channel 你好`");
                return Ok(());
            }
            if all_pages {
                handle_all_pages(service, &config, &input, json).await
            } else {
                let limit = limit.unwrap_or(config.default_search_limit);
                handle_search(service, &input, limit, offset, json).await
            }
        }
        Commands::Stats { json } => handle_stats(&repo, json).await,
    }
}

async fn handle_index(indexer: Indexer, message: &NormalizedMessage) -> Result<()> {
    match indexer.index(message).await.context("Index message")? {
        Some(id) => println!(
            "Indexed chat_id={} message_id={} as id={}",
            message.chat_id, message.message_id, id
        ),
        None => println!("Skipped: message text has no indexable terms"),
    }
    Ok(())
}

async fn handle_search(
    service: SearchService,
    input: &SearchInput,
    limit: i64,
    offset: i64,
    json: bool,
) -> Result<()> {
    let rows = service
        .search(&input.query, limit, offset, &input.channel)
        .await
        .context("Search")?;
    let total = service
        .count(&input.query, &input.channel)
        .await
        .context("Count")?;

    info!(rows = rows.len(), total, "Search finished");

    if json {
        println!("{}", serde_json::to_string_pretty(&rows_view(&rows))?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("No matching results.");
        return Ok(());
    }
    println!("{} of {} result(s), offset {}:\n", rows.len(), total, offset);
    print_rows(&rows);
    Ok(())
}

/// Pages through every result the way an interactive client would: first page opens a
/// session, each next page is replayed from the session id.
async fn handle_all_pages(
    service: SearchService,
    config: &SearchConfig,
    input: &SearchInput,
    json: bool,
) -> Result<()> {
    let sessions = Arc::new(SessionCache::new(config.session_capacity, config.session_ttl));
    let paginator = Paginator::new(service, sessions, config.page_size);

    let Some(first) = paginator
        .first_page(&input.query, &input.channel)
        .await
        .context("Search first page")?
    else {
        if json {
            println!("[]");
        } else {
            println!("No matching results.");
        }
        return Ok(());
    };

    let mut all_rows = Vec::new();
    let mut page = first;
    loop {
        if !json {
            print_page_header(&page.cursor);
            print_rows(&page.rows);
        }
        let next = page.next_request();
        all_rows.append(&mut page.rows);
        let Some(request) = next else {
            break;
        };
        match paginator.page(&request).await.context("Search next page")? {
            Some(next_page) if !next_page.rows.is_empty() => page = next_page,
            Some(_) => break,
            None => {
                eprintln!("Pagination session expired, search again.");
                break;
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows_view(&all_rows))?);
    }
    Ok(())
}

async fn handle_stats(repo: &MessageRepository, json: bool) -> Result<()> {
    let stats = repo.stats().await.context("Query index stats")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }
    println!("Messages:        {}", stats.total_messages);
    println!("  live:          {}", stats.live_messages);
    println!("  import:        {}", stats.imported_messages);
    println!("Chats:           {}", stats.unique_chats);
    println!("Channel aliases: {}", stats.aliases);
    println!(
        "Time range:      {} .. {}",
        format_timestamp(stats.first_timestamp),
        format_timestamp(stats.last_timestamp)
    );
    Ok(())
}

#[derive(Serialize)]
struct RowView<'a> {
    #[serde(flatten)]
    row: &'a SearchRow,
    link: Option<String>,
}

fn rows_view(rows: &[SearchRow]) -> Vec<RowView<'_>> {
    rows.iter()
        .map(|row| RowView {
            row,
            link: row.link(),
        })
        .collect()
}

const TEXT_PREVIEW_CHARS: usize = 80;

fn print_page_header(cursor: &PageCursor) {
    println!("--- page {}/{} ---", cursor.current_page, cursor.total_pages);
}

fn print_rows(rows: &[SearchRow]) {
    for row in rows {
        let preview: String = row
            .text
            .chars()
            .take(TEXT_PREVIEW_CHARS)
            .collect::<String>()
            .replace('\n', " ");
        println!(
            "[{}] chat={} msg={} {}",
            format_timestamp(Some(row.timestamp)),
            row.chat_id,
            row.message_id,
            row.link().unwrap_or_else(|| "-".to_string())
        );
        println!("    {}", preview);
    }
}

fn format_timestamp(ts: Option<i64>) -> String {
    ts.and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_search_with_channel() {
        let cli = Cli::try_parse_from(["tgsearch", "search", "-c", "@chanA", "你好", "世界"]).unwrap();
        match cli.command {
            Commands::Search { query, channel, offset, .. } => {
                assert_eq!(query, vec!["你好".to_string(), "世界".to_string()]);
                assert_eq!(channel.as_deref(), Some("@chanA"));
                assert_eq!(offset, 0);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_cli_parses_index_with_negative_chat_id() {
        let cli = Cli::try_parse_from([
            "tgsearch",
            "index",
            "--chat-id",
            "-1001234",
            "--message-id",
            "7",
            "--text",
            "你好",
            "--source",
            "live",
        ])
        .unwrap();
        match cli.command {
            Commands::Index { chat_id, message_id, source, .. } => {
                assert_eq!(chat_id, -1001234);
                assert_eq!(message_id, 7);
                assert_eq!(source, MessageSource::Live);
            }
            _ => panic!("expected index"),
        }
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(Some(0)), "1970-01-01 00:00:00");
        assert_eq!(format_timestamp(None), "-");
    }
}
