//! Host configuration: the game itself plus presentation and reporting.

use candy_core::CandyConfig;
use candy_leaderboard::config::ClientConfig;
use serde::{Deserialize, Serialize};

use crate::error::{HostError, Result};

/// Top-level host configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostConfig {
    /// Engine, shop, auto-clicker and store settings.
    #[serde(default)]
    pub game: CandyConfig,
    /// Who is playing.
    #[serde(default)]
    pub player: PlayerConfig,
    /// Transient notification timing.
    #[serde(default)]
    pub notifications: NotificationConfig,
    /// Report level-ups to this leaderboard; off when absent.
    #[serde(default)]
    pub leaderboard: Option<ClientConfig>,
}

impl HostConfig {
    /// Parse from a TOML string.
    ///
    /// # Errors
    /// Returns [`HostError::Config`] if the TOML is malformed.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| HostError::Config(e.to_string()))
    }

    /// Load from a file path.
    ///
    /// # Errors
    /// Returns an I/O error if the file can't be read, or a config error if
    /// the TOML is malformed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

/// Player identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Name submitted to the leaderboard.
    #[serde(default = "default_player_name")]
    pub name: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            name: default_player_name(),
        }
    }
}

/// How long notifications stay visible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// "Level Up!" banner.
    #[serde(default = "default_level_up_ms")]
    pub level_up_ms: u64,
    /// "+N" reward and "5x Bonus!" effects.
    #[serde(default = "default_effect_ms")]
    pub effect_ms: u64,
    /// Chance that an auto-clicker reward shows a "+N" effect.
    #[serde(default = "default_auto_effect_chance")]
    pub auto_effect_chance: f64,
    /// Engine events buffered between dispatches; older rewards are shed
    /// first.
    #[serde(default = "default_max_pending_events")]
    pub max_pending_events: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            level_up_ms: default_level_up_ms(),
            effect_ms: default_effect_ms(),
            auto_effect_chance: default_auto_effect_chance(),
            max_pending_events: default_max_pending_events(),
        }
    }
}

fn default_player_name() -> String { "Player".to_string() }
fn default_level_up_ms() -> u64 { 2_000 }
fn default_effect_ms() -> u64 { 1_000 }
fn default_auto_effect_chance() -> f64 { 0.1 }
fn default_max_pending_events() -> usize { 256 }
