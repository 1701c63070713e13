//! # candy-host: host integration for the candy clicker
//!
//! This crate sits between a presentation layer (a browser page, a TUI, a
//! test harness) and the host-agnostic `candy-core` engine.
//!
//! ## Architecture
//!
//! ```text
//! presentation layer ──InputEvent──▶ hooks ──▶ GameSession
//!                                               │
//!          ┌────────────────────────────────────┼──────────────────┐
//!          ▼                                    ▼                  ▼
//!   candy-core RewardEngine ◀── auto-clicker task    candy-leaderboard client
//!          │
//!          └──EngineEvent──▶ SessionSink ──LevelUp──▶ leaderboard
//!                                 │
//!                                 └──▶ NotificationQueue ──▶ presentation layer
//! ```
//!
//! ## Modules
//!
//! - `events`: input events from the presentation layer
//! - `hooks`: event constructors and the buy-or-toggle shop rule
//! - `notifications`: transient level-up and reward messages
//! - `reporter`: bounded event buffer and immediate level-up reporting
//! - `session`: the running game, auto-clicker and leaderboard reporting

#![deny(clippy::unwrap_used)]

pub mod config;
pub mod error;
pub mod events;
pub mod hooks;
pub mod notifications;
pub mod reporter;
pub mod session;

pub use config::HostConfig;
pub use error::HostError;
pub use events::InputEvent;
pub use session::{Dispatched, GameSession};
