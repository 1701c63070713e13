//! # Candy Core Library
//!
//! Host-agnostic reward engine for the candy clicker.
//!
//! A single [`RewardEngine`] owns the player's [`PlayerState`] and turns
//! timestamped clicks into currency:
//!
//! - **Streaks**: clicks under 500ms apart build a streak; the multiplier
//!   steps to 2x at streak 5 and 3x at streak 10
//! - **Levels**: reaching `level * 10` currency raises the level and empties
//!   the balance
//! - **Modifiers**: auto-clicker, speed boost and golden click, bought once
//!   and switched on or off
//! - **Click-objects**: one equipped item adding a flat bonus per click
//!
//! Every change is written through to a [`KeyValueStore`] under the same
//! keys the browser game uses (`candyCount`, `level`, `ownedItems`, ...).
//!
//! ```
//! use candy_core::{CandyConfig, MemoryStore, RewardEngine, Timestamp};
//!
//! let mut engine = RewardEngine::load(MemoryStore::new(), &CandyConfig::default())?;
//! let outcome = engine.click(Timestamp::now())?;
//! assert_eq!(outcome.reward, 1);
//! # Ok::<(), candy_core::CandyError>(())
//! ```

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod autoclicker;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod metrics;
pub mod shop;
pub mod state;
pub mod store;
pub mod streak;
pub mod types;

pub use autoclicker::{AutoClickerHandle, SharedEngine};
pub use config::CandyConfig;
pub use engine::{AutoTick, ClickOutcome, Progress, RewardEngine};
pub use error::{CandyError, Result};
pub use events::{EngineEvent, EventSink};
pub use state::PlayerState;
pub use store::{KeyValueStore, KeyValueStoreExt, MemoryStore, SqliteStore};
pub use types::*;
