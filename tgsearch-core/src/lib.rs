//! # tgsearch-core
//!
//! Shared plumbing for the channel search workspace: [`TgSearchError`], environment-driven
//! [`SearchConfig`], and tracing initialization. Used by the CLI and any process embedding the
//! storage and search crates.

pub mod config;
pub mod error;
pub mod logger;

pub use config::SearchConfig;
pub use error::{Result, TgSearchError};
pub use logger::init_tracing;
