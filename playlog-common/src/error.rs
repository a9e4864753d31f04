//! Common error types for playlog

use thiserror::Error;

/// Common result type for playlog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the playlog crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A document is missing required fields or has an unexpected shape
    #[error("Malformed record: {0}")]
    MalformedRecord(String),
}
