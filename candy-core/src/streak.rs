//! Click streaks and the streak multiplier.
//!
//! A click less than `streak_window_ms` after the previous one extends the
//! streak; anything slower (or the very first click) resets it to zero and
//! the multiplier straight back to 1. While the streak grows the multiplier
//! steps up at the configured tiers and never goes past the top tier.

use crate::config::EngineConfig;
use crate::types::Timestamp;

/// Result of feeding one click into the streak rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakUpdate {
    /// Milliseconds since the previous click; `None` on the first click.
    pub delta_ms: Option<u64>,
    /// Whether the click fell inside the streak window.
    pub rapid: bool,
    /// Streak after this click.
    pub streak: u32,
    /// Multiplier after this click.
    pub multiplier: u64,
}

/// Streak window and multiplier tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakRules {
    window_ms: u64,
    tier2_streak: u32,
    tier3_streak: u32,
    tier2_multiplier: u64,
    tier3_multiplier: u64,
}

impl StreakRules {
    /// Rules from engine configuration.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            window_ms: config.streak_window_ms,
            tier2_streak: config.tier2_streak,
            tier3_streak: config.tier3_streak,
            tier2_multiplier: config.tier2_multiplier,
            tier3_multiplier: config.tier3_multiplier,
        }
    }

    /// Whether a gap of `delta_ms` counts as rapid.
    #[must_use]
    pub fn is_rapid(&self, delta_ms: Option<u64>) -> bool {
        delta_ms.is_some_and(|d| d < self.window_ms)
    }

    /// Advance the streak for a click at `now`.
    ///
    /// Below the second tier the previous multiplier is kept as-is, which is
    /// always 1 since only a reset can lower the streak.
    #[must_use]
    pub fn advance(
        &self,
        streak: u32,
        multiplier: u64,
        last_action: Option<Timestamp>,
        now: Timestamp,
    ) -> StreakUpdate {
        let delta_ms = last_action.map(|last| now.millis_since(last));
        let rapid = self.is_rapid(delta_ms);

        let (streak, multiplier) = if rapid {
            let streak = streak.saturating_add(1);
            let multiplier = if streak >= self.tier3_streak {
                self.tier3_multiplier
            } else if streak >= self.tier2_streak {
                self.tier2_multiplier
            } else {
                multiplier
            };
            (streak, multiplier)
        } else {
            (0, 1)
        };

        StreakUpdate {
            delta_ms,
            rapid,
            streak,
            multiplier,
        }
    }
}

impl Default for StreakRules {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}
