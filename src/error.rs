//! Error types for the alert bot

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("feed unavailable: {0}")]
    FeedUnavailable(String),

    #[error("feed returned unexpected shape: {0}")]
    FeedMalformed(String),

    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("storage I/O error: {0}")]
    StoreIo(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BotError>;
