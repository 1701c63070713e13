//! Configuration for the candy reward engine.
//!
//! Maps directly to `candy.toml`. Every field has a default, so an empty
//! file yields the stock game.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{ClickObjectId, ModifierId};

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandyConfig {
    /// Streak, multiplier and level tuning.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Shop prices, level gates and click-object bonuses.
    #[serde(default)]
    pub shop: ShopConfig,
    /// Auto-clicker tick rate.
    #[serde(default)]
    pub auto_clicker: AutoClickerConfig,
    /// Key-value store settings.
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl CandyConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `CandyError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::CandyError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Streak, multiplier and level tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Clicks closer together than this extend the streak.
    #[serde(default = "default_500")]
    pub streak_window_ms: u64,
    /// Streak length at which the multiplier becomes `tier2_multiplier`.
    #[serde(default = "default_5")]
    pub tier2_streak: u32,
    /// Streak length at which the multiplier becomes `tier3_multiplier`.
    #[serde(default = "default_10")]
    pub tier3_streak: u32,
    /// Multiplier for the second tier.
    #[serde(default = "default_2")]
    pub tier2_multiplier: u64,
    /// Multiplier for the third tier.
    #[serde(default = "default_3")]
    pub tier3_multiplier: u64,
    /// `currency_required_for_next_level = level * level_step`.
    #[serde(default = "default_10_u64")]
    pub level_step: u64,
    /// Reward factor applied by an active speed boost on a rapid click.
    #[serde(default = "default_2")]
    pub speed_boost_factor: u64,
    /// Probability per click of a golden click.
    #[serde(default = "default_0_05")]
    pub golden_click_chance: f64,
    /// Reward factor of a golden click.
    #[serde(default = "default_5_u64")]
    pub golden_click_factor: u64,
    /// Treat engine construction as the previous click, so the first click
    /// can already extend a streak.
    #[serde(default)]
    pub anchor_streak_at_startup: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            streak_window_ms: 500,
            tier2_streak: 5,
            tier3_streak: 10,
            tier2_multiplier: 2,
            tier3_multiplier: 3,
            level_step: 10,
            speed_boost_factor: 2,
            golden_click_chance: 0.05,
            golden_click_factor: 5,
            anchor_streak_at_startup: false,
        }
    }
}

/// Price and level gate of one modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierSpec {
    /// Currency cost.
    pub price: u64,
    /// Minimum level to buy.
    pub required_level: u32,
}

/// Price and flat bonus of one click-object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickObjectSpec {
    /// Currency cost.
    pub price: u64,
    /// Added to the per-click base while equipped.
    pub bonus: u64,
}

/// Shop catalog.
///
/// Currency resets on every level-up and never exceeds `level * 10 - 1`
/// between clicks, so a price must stay below that bound at its required
/// level to be reachable at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopConfig {
    /// Auto-clicker modifier.
    #[serde(default = "default_auto_clicker")]
    pub auto_clicker: ModifierSpec,
    /// Speed-boost modifier.
    #[serde(default = "default_speed_boost")]
    pub speed_boost: ModifierSpec,
    /// Golden-click modifier.
    #[serde(default = "default_golden_click")]
    pub golden_click: ModifierSpec,
    /// Candy stick click-object.
    #[serde(default = "default_candy_stick")]
    pub candy_stick: ClickObjectSpec,
    /// Candy box click-object.
    #[serde(default = "default_candy_box")]
    pub candy_box: ClickObjectSpec,
    /// Candy chest click-object.
    #[serde(default = "default_candy_chest")]
    pub candy_chest: ClickObjectSpec,
}

impl ShopConfig {
    /// Spec of a modifier.
    #[must_use]
    pub fn modifier(&self, id: ModifierId) -> ModifierSpec {
        match id {
            ModifierId::AutoClicker => self.auto_clicker,
            ModifierId::SpeedBoost => self.speed_boost,
            ModifierId::GoldenClick => self.golden_click,
        }
    }

    /// Spec of a click-object.
    #[must_use]
    pub fn click_object(&self, id: ClickObjectId) -> ClickObjectSpec {
        match id {
            ClickObjectId::CandyStick => self.candy_stick,
            ClickObjectId::CandyBox => self.candy_box,
            ClickObjectId::CandyChest => self.candy_chest,
        }
    }
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            auto_clicker: default_auto_clicker(),
            speed_boost: default_speed_boost(),
            golden_click: default_golden_click(),
            candy_stick: default_candy_stick(),
            candy_box: default_candy_box(),
            candy_chest: default_candy_chest(),
        }
    }
}

/// How often the auto-clicker ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickMode {
    /// Once per display frame at `refresh_hz`.
    DisplayRefresh,
    /// Once every `interval_ms`.
    Fixed,
}

/// Auto-clicker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoClickerConfig {
    /// Tick mode.
    #[serde(default = "default_tick_mode")]
    pub mode: TickMode,
    /// Display refresh rate used by `display_refresh`.
    #[serde(default = "default_60")]
    pub refresh_hz: u32,
    /// Interval used by `fixed`.
    #[serde(default = "default_100")]
    pub interval_ms: u64,
}

impl AutoClickerConfig {
    /// Time between two ticks.
    #[must_use]
    pub fn tick_period(&self) -> Duration {
        match self.mode {
            TickMode::DisplayRefresh => {
                Duration::from_secs_f64(1.0 / f64::from(self.refresh_hz.max(1)))
            }
            TickMode::Fixed => Duration::from_millis(self.interval_ms.max(1)),
        }
    }
}

impl Default for AutoClickerConfig {
    fn default() -> Self {
        Self {
            mode: TickMode::DisplayRefresh,
            refresh_hz: 60,
            interval_ms: 100,
        }
    }
}

/// Store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// SQLite file at `path`.
    Sqlite,
    /// Process-local map; nothing survives a restart.
    Memory,
}

/// Key-value store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Backend.
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,
    /// Database file for the SQLite backend.
    #[serde(default = "default_store_path")]
    pub path: String,
    /// Use WAL journaling.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
    /// Store a CRC-32 next to every value and verify it on read.
    #[serde(default = "default_true")]
    pub checksum_enabled: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            path: "candy_save.db".to_string(),
            wal_mode: true,
            checksum_enabled: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_store_path() -> String { "candy_save.db".to_string() }
fn default_backend() -> StoreBackend { StoreBackend::Sqlite }
fn default_tick_mode() -> TickMode { TickMode::DisplayRefresh }
fn default_0_05() -> f64 { 0.05 }
fn default_2() -> u64 { 2 }
fn default_3() -> u64 { 3 }
fn default_5() -> u32 { 5 }
fn default_5_u64() -> u64 { 5 }
fn default_10() -> u32 { 10 }
fn default_10_u64() -> u64 { 10 }
fn default_60() -> u32 { 60 }
fn default_100() -> u64 { 100 }
fn default_500() -> u64 { 500 }
fn default_auto_clicker() -> ModifierSpec { ModifierSpec { price: 15, required_level: 2 } }
fn default_speed_boost() -> ModifierSpec { ModifierSpec { price: 25, required_level: 3 } }
fn default_golden_click() -> ModifierSpec { ModifierSpec { price: 45, required_level: 5 } }
fn default_candy_stick() -> ClickObjectSpec { ClickObjectSpec { price: 5, bonus: 1 } }
fn default_candy_box() -> ClickObjectSpec { ClickObjectSpec { price: 15, bonus: 2 } }
fn default_candy_chest() -> ClickObjectSpec { ClickObjectSpec { price: 30, bonus: 5 } }
