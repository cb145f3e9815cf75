use thiserror::Error;

#[derive(Error, Debug)]
pub enum TgSearchError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logger error: {0}")]
    Logger(String),
}

pub type Result<T> = std::result::Result<T, TgSearchError>;
