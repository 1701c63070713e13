//! Leaderboard error types.

use thiserror::Error;

/// Errors that can occur while serving or talking to the leaderboard.
#[derive(Debug, Error)]
pub enum LeaderboardError {
    /// HTTP request failed.
    #[error("Leaderboard request failed: {0}")]
    RequestFailed(String),

    /// Response body was not the expected JSON.
    #[error("Failed to parse leaderboard response: {0}")]
    ParseError(String),

    /// The server answered with 400.
    #[error("Leaderboard rejected the submission: {0}")]
    Rejected(String),

    /// Request timed out.
    #[error("Leaderboard request timed out")]
    Timeout,

    /// Server not reachable.
    #[error("Leaderboard unavailable: {0}")]
    Unavailable(String),

    /// All retry attempts exhausted.
    #[error("All leaderboard retry attempts exhausted after {attempts} tries: {last_error}")]
    RetriesExhausted {
        /// Attempts made.
        attempts: u32,
        /// Error of the final attempt.
        last_error: String,
    },

    /// Socket or file error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Leaderboard configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for LeaderboardError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Unavailable(err.to_string())
        } else if err.is_decode() {
            Self::ParseError(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, LeaderboardError>;
