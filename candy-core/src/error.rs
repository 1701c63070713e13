//! Error types for the candy reward engine.
//!
//! Unmet purchase or toggle preconditions are not errors; those operations
//! return `Ok(false)`. Everything here means the operation could not complete
//! and its in-memory effects were rolled back.

use thiserror::Error;

/// Top-level error type for all engine and storage operations.
#[derive(Error, Debug)]
pub enum CandyError {
    /// SQLite store error.
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// A store backend refused the write for a reason of its own.
    #[error("Store write rejected for key '{key}': {reason}")]
    WriteRejected {
        /// Key that was being written.
        key: String,
        /// Backend-provided reason.
        reason: String,
    },

    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An item identifier that is not part of the catalog.
    #[error("Unknown item: {0}")]
    UnknownItem(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for CandyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, CandyError>;
