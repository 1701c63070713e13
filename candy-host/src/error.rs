//! Host error types.

use candy_core::CandyError;
use candy_leaderboard::LeaderboardError;
use thiserror::Error;

/// Errors surfaced by the game session.
#[derive(Debug, Error)]
pub enum HostError {
    /// Engine or store failure.
    #[error(transparent)]
    Engine(#[from] CandyError),

    /// Leaderboard failure.
    #[error(transparent)]
    Leaderboard(#[from] LeaderboardError),

    /// Configuration error.
    #[error("Host configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, HostError>;
