//! Shop rules: unlock gating, affordability and the shop listing.
//!
//! Everything here is a read-only function of [`PlayerState`] and
//! [`ShopConfig`]; the engine calls these before mutating anything.

use serde::Serialize;

use crate::config::ShopConfig;
use crate::state::PlayerState;
use crate::types::{ClickObjectId, ItemId, ModifierId};

/// Level gate of a modifier is met.
#[must_use]
pub fn is_unlocked(state: &PlayerState, shop: &ShopConfig, id: ModifierId) -> bool {
    state.level() >= shop.modifier(id).required_level
}

/// Balance covers a modifier's price.
#[must_use]
pub fn can_afford_modifier(state: &PlayerState, shop: &ShopConfig, id: ModifierId) -> bool {
    state.currency() >= shop.modifier(id).price
}

/// A purchase of `id` would go through right now.
#[must_use]
pub fn can_purchase_modifier(state: &PlayerState, shop: &ShopConfig, id: ModifierId) -> bool {
    !state.modifiers().owned.get(id)
        && is_unlocked(state, shop, id)
        && can_afford_modifier(state, shop, id)
}

/// Balance covers a click-object's price.
#[must_use]
pub fn can_afford_click_object(state: &PlayerState, shop: &ShopConfig, id: ClickObjectId) -> bool {
    state.currency() >= shop.click_object(id).price
}

/// A purchase of `id` would go through right now.
#[must_use]
pub fn can_purchase_click_object(
    state: &PlayerState,
    shop: &ShopConfig,
    id: ClickObjectId,
) -> bool {
    !state.click_objects().owns(id) && can_afford_click_object(state, shop, id)
}

/// Flat bonus of the equipped click-object, or 0.
#[must_use]
pub fn equipped_bonus(state: &PlayerState, shop: &ShopConfig) -> u64 {
    state
        .click_objects()
        .equipped
        .map_or(0, |id| shop.click_object(id).bonus)
}

/// How a shop row should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ShopStatus {
    /// Not owned and not purchasable (level or funds).
    Locked,
    /// Not owned, purchasable.
    Available,
    /// Owned but switched off / not equipped.
    Owned,
    /// Owned and switched on / equipped.
    Active,
}

impl ShopStatus {
    /// Label of the row's single button.
    #[must_use]
    pub fn button_label(self) -> &'static str {
        match self {
            Self::Locked | Self::Available => "Buy",
            Self::Owned => "Enable",
            Self::Active => "Disable",
        }
    }

    /// Status text shown under click-objects.
    #[must_use]
    pub fn status_label(self) -> &'static str {
        match self {
            Self::Locked | Self::Available => "Not Owned",
            Self::Owned => "Owned",
            Self::Active => "Active",
        }
    }

    /// Whether the button is clickable.
    #[must_use]
    pub fn is_enabled(self) -> bool {
        !matches!(self, Self::Locked)
    }
}

/// One row of the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopRow {
    /// Item on sale.
    pub item: ItemId,
    /// Price.
    pub price: u64,
    /// Level gate (modifiers only).
    pub required_level: Option<u32>,
    /// Per-click bonus (click-objects only).
    pub bonus: Option<u64>,
    /// Display status.
    pub status: ShopStatus,
}

/// Every catalog item with its current status, modifiers first.
#[must_use]
pub fn listing(state: &PlayerState, shop: &ShopConfig) -> Vec<ShopRow> {
    let modifiers = ModifierId::ALL.into_iter().map(|id| {
        let spec = shop.modifier(id);
        let status = if state.modifiers().owned.get(id) {
            if state.modifiers().active.get(id) {
                ShopStatus::Active
            } else {
                ShopStatus::Owned
            }
        } else if is_unlocked(state, shop, id) && can_afford_modifier(state, shop, id) {
            ShopStatus::Available
        } else {
            ShopStatus::Locked
        };
        ShopRow {
            item: ItemId::Modifier(id),
            price: spec.price,
            required_level: Some(spec.required_level),
            bonus: None,
            status,
        }
    });

    let objects = ClickObjectId::ALL.into_iter().map(|id| {
        let spec = shop.click_object(id);
        let status = if state.click_objects().owns(id) {
            if state.click_objects().equipped == Some(id) {
                ShopStatus::Active
            } else {
                ShopStatus::Owned
            }
        } else if can_afford_click_object(state, shop, id) {
            ShopStatus::Available
        } else {
            ShopStatus::Locked
        };
        ShopRow {
            item: ItemId::ClickObject(id),
            price: spec.price,
            required_level: None,
            bonus: Some(spec.bonus),
            status,
        }
    });

    modifiers.chain(objects).collect()
}
