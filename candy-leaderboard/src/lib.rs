//! # candy-leaderboard: leaderboard service for the candy clicker
//!
//! Players submit `(playerName, level)` pairs; the board keeps the best level
//! per name and serves the top entries:
//!
//! ```text
//! game host ──LeaderboardClient──▶ POST /api/leaderboard ──▶ Leaderboard
//! browser   ────────────────────▶ GET  /api/leaderboard ◀── top N
//! ```
//!
//! Storage is in memory only; restarting the server empties the board.

#![deny(clippy::unwrap_used)]

pub mod board;
pub mod client;
pub mod config;
pub mod error;
pub mod server;
pub mod types;

pub use board::{Leaderboard, SubmitOutcome};
pub use client::LeaderboardClient;
pub use config::LeaderboardConfig;
pub use error::LeaderboardError;
pub use types::LeaderboardEntry;
