use std::env;
use std::time::Duration;

use crate::error::{Result, TgSearchError};

const DEFAULT_SQLITE_PATH: &str = "data/tg_search.db";
const DEFAULT_LOG_FILE: &str = "logs/tgsearch.log";
const DEFAULT_SEARCH_LIMIT: i64 = 50;
const DEFAULT_PAGE_SIZE: i64 = 10;
const DEFAULT_SESSION_CAPACITY: usize = 1024;
const DEFAULT_SESSION_TTL_SECS: u64 = 1800;

/// 检索服务配置，从环境变量加载
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// SQLite 数据库文件路径，或 `:memory:`。环境变量：`SQLITE_PATH`，其次 `DATABASE_URL`。
    pub database_url: String,
    pub log_file: String,
    /// 普通检索的默认条数上限。
    pub default_search_limit: i64,
    /// 分页浏览时每页条数。
    pub page_size: i64,
    /// 同时保留的分页会话上限，超出时淘汰最早的会话。
    pub session_capacity: usize,
    pub session_ttl: Duration,
}

impl SearchConfig {
    /// 从环境变量加载配置；数值无法解析时使用默认值
    pub fn load() -> Result<Self> {
        let database_url = env::var("SQLITE_PATH")
            .or_else(|_| env::var("DATABASE_URL"))
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|_| DEFAULT_SQLITE_PATH.to_string());
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
        let default_search_limit = parse_env("DEFAULT_SEARCH_LIMIT", DEFAULT_SEARCH_LIMIT);
        let page_size = parse_env("PRIVATE_PAGE_SIZE", DEFAULT_PAGE_SIZE);
        let session_capacity = parse_env("SESSION_CAPACITY", DEFAULT_SESSION_CAPACITY);
        let session_ttl =
            Duration::from_secs(parse_env("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS));

        let config = Self {
            database_url,
            log_file,
            default_search_limit,
            page_size,
            session_capacity,
            session_ttl,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would make search or pagination meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.database_url.is_empty() {
            return Err(TgSearchError::Config("SQLITE_PATH must not be empty".to_string()));
        }
        if self.default_search_limit <= 0 {
            return Err(TgSearchError::Config(format!(
                "DEFAULT_SEARCH_LIMIT must be positive, got {}",
                self.default_search_limit
            )));
        }
        if self.page_size <= 0 {
            return Err(TgSearchError::Config(format!(
                "PRIVATE_PAGE_SIZE must be positive, got {}",
                self.page_size
            )));
        }
        if self.session_capacity == 0 {
            return Err(TgSearchError::Config("SESSION_CAPACITY must be positive".to_string()));
        }
        if self.session_ttl.is_zero() {
            return Err(TgSearchError::Config("SESSION_TTL_SECS must be positive".to_string()));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
