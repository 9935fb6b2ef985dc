//! Common error types for the QA report services

use thiserror::Error;

/// Common result type for QA report operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the QA report crates
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

    /// Invalid caller input (malformed date, bad query parameter)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A stored report could not be decoded into a `ReportRecord`
    #[error("Record decode error: {0}")]
    Decode(#[from] crate::db::RecordDecodeError),
}
