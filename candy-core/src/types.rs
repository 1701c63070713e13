//! Core type definitions for the candy reward engine.
//!
//! Item identifiers serialize with the same camelCase names the key-value
//! store uses, so a stored `ownedItems` object maps field-for-field.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::CandyError;

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Wall-clock instant in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        Self(u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0))
    }

    /// Build a timestamp from raw milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Milliseconds elapsed since `earlier` (zero if `earlier` is later).
    #[must_use]
    pub fn millis_since(self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// This timestamp shifted forward by `millis`.
    #[must_use]
    pub const fn plus_millis(self, millis: u64) -> Self {
        Self(self.0.saturating_add(millis))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

// ---------------------------------------------------------------------------
// Modifiers
// ---------------------------------------------------------------------------

/// A purchasable, toggleable permanent upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModifierId {
    /// Grants `level` currency on every auto-clicker tick.
    AutoClicker,
    /// Doubles rapid-click rewards.
    SpeedBoost,
    /// 5% chance per click of a 5× reward.
    GoldenClick,
}

impl ModifierId {
    /// Every modifier, in shop order.
    pub const ALL: [Self; 3] = [Self::AutoClicker, Self::SpeedBoost, Self::GoldenClick];

    /// Store/wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AutoClicker => "autoClicker",
            Self::SpeedBoost => "speedBoost",
            Self::GoldenClick => "goldenClick",
        }
    }
}

impl fmt::Display for ModifierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModifierId {
    type Err = CandyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| CandyError::UnknownItem(s.to_string()))
    }
}

/// One boolean per modifier. Serialized as
/// `{"autoClicker": bool, "speedBoost": bool, "goldenClick": bool}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModifierFlags {
    /// Auto-clicker flag.
    pub auto_clicker: bool,
    /// Speed-boost flag.
    pub speed_boost: bool,
    /// Golden-click flag.
    pub golden_click: bool,
}

impl ModifierFlags {
    /// Read the flag for `id`.
    #[must_use]
    pub fn get(self, id: ModifierId) -> bool {
        match id {
            ModifierId::AutoClicker => self.auto_clicker,
            ModifierId::SpeedBoost => self.speed_boost,
            ModifierId::GoldenClick => self.golden_click,
        }
    }

    /// Write the flag for `id`.
    pub fn set(&mut self, id: ModifierId, value: bool) {
        match id {
            ModifierId::AutoClicker => self.auto_clicker = value,
            ModifierId::SpeedBoost => self.speed_boost = value,
            ModifierId::GoldenClick => self.golden_click = value,
        }
    }
}

// ---------------------------------------------------------------------------
// Click objects
// ---------------------------------------------------------------------------

/// A mutually-exclusive equippable item adding a flat bonus per click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClickObjectId {
    /// Cheapest object.
    CandyStick,
    /// Mid-tier object.
    CandyBox,
    /// Most expensive object.
    CandyChest,
}

impl ClickObjectId {
    /// Every click-object, in shop order.
    pub const ALL: [Self; 3] = [Self::CandyStick, Self::CandyBox, Self::CandyChest];

    /// Store/wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CandyStick => "candyStick",
            Self::CandyBox => "candyBox",
            Self::CandyChest => "candyChest",
        }
    }
}

impl fmt::Display for ClickObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClickObjectId {
    type Err = CandyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| CandyError::UnknownItem(s.to_string()))
    }
}

/// Anything the shop sells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum ItemId {
    /// A modifier upgrade.
    Modifier(ModifierId),
    /// An equippable click-object.
    ClickObject(ClickObjectId),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Modifier(id) => write!(f, "{id}"),
            Self::ClickObject(id) => write!(f, "{id}"),
        }
    }
}

impl From<ModifierId> for ItemId {
    fn from(id: ModifierId) -> Self {
        Self::Modifier(id)
    }
}

impl From<ClickObjectId> for ItemId {
    fn from(id: ClickObjectId) -> Self {
        Self::ClickObject(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_names_round_trip_through_from_str() {
        for id in ModifierId::ALL {
            assert_eq!(id.as_str().parse::<ModifierId>().expect("parse"), id);
        }
        assert!("turbo".parse::<ModifierId>().is_err());
    }

    #[test]
    fn modifier_flags_use_store_field_names() {
        let mut flags = ModifierFlags::default();
        flags.set(ModifierId::SpeedBoost, true);
        let json = serde_json::to_string(&flags).expect("serialize");
        assert_eq!(
            json,
            r#"{"autoClicker":false,"speedBoost":true,"goldenClick":false}"#
        );
    }

    #[test]
    fn partial_flags_fill_missing_fields() {
        let flags: ModifierFlags =
            serde_json::from_str(r#"{"goldenClick":true}"#).expect("deserialize");
        assert!(flags.get(ModifierId::GoldenClick));
        assert!(!flags.get(ModifierId::AutoClicker));
    }

    #[test]
    fn timestamp_difference_saturates() {
        let a = Timestamp::from_millis(1_000);
        let b = a.plus_millis(250);
        assert_eq!(b.millis_since(a), 250);
        assert_eq!(a.millis_since(b), 0);
    }
}
