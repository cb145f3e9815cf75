//! 日志初始化：控制台（stderr）与日志文件共用同一个 fmt layer（级别、target、线程、span 关闭事件）。

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{
    fmt::format::FmtSpan, fmt::writer::MakeWriterExt, layer::SubscriberExt,
    util::SubscriberInitExt, EnvFilter, Registry,
};

use crate::error::{Result, TgSearchError};

/// 初始化全局 tracing 订阅者，同时写入 stderr 与 `log_file_path`（追加模式）。
///
/// 日志级别取自 `RUST_LOG`，未设置时为 `info`。需在调用前加载 .env，否则 `RUST_LOG` 不会生效。
/// 日志文件的父目录不存在时会自动创建。
pub fn init_tracing(log_file_path: &str) -> Result<()> {
    if let Some(parent) = Path::new(log_file_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    let file = Arc::new(file);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let writer = io::stderr.and(file);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .with_thread_ids(true)
        .with_level(true)
        .with_file(false)
        .with_line_number(false);

    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| TgSearchError::Logger(format!("Failed to set global subscriber: {}", e)))?;

    Ok(())
}
