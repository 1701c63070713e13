//! Integration hooks for the presentation layer.
//!
//! The shop shows one button per item. Pressing it buys the item if it is
//! not owned yet and toggles it otherwise; these hooks encode that rule so
//! hosts don't have to.

use candy_core::types::{ItemId, Timestamp};
use candy_core::{KeyValueStore, RewardEngine};

use crate::events::InputEvent;

/// What a shop button press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopAction {
    /// The item was bought.
    Purchased,
    /// An owned item was switched on or off.
    Toggled {
        /// State after the toggle.
        active: bool,
    },
    /// Not owned and not purchasable right now.
    Refused,
}

/// Create a click event from the candy's click handler.
#[must_use]
pub fn on_click(at: Timestamp) -> InputEvent {
    InputEvent::Click { at }
}

/// Create a shop event from a row's button handler.
#[must_use]
pub fn on_shop_button(item: impl Into<ItemId>) -> InputEvent {
    InputEvent::ShopButton { item: item.into() }
}

/// Create a frame event from the host's render loop.
#[must_use]
pub fn on_frame(at: Timestamp) -> InputEvent {
    InputEvent::Frame { at }
}

/// Buy `item` if it isn't owned, otherwise toggle it.
///
/// # Errors
/// Store write failures from the engine.
pub fn buy_or_toggle<S: KeyValueStore>(
    engine: &mut RewardEngine<S>,
    item: ItemId,
) -> candy_core::Result<ShopAction> {
    if engine.owns(item) {
        match item {
            ItemId::Modifier(id) => {
                engine.toggle_modifier(id)?;
                Ok(ShopAction::Toggled {
                    active: engine.state().modifiers().active.get(id),
                })
            }
            ItemId::ClickObject(id) => {
                engine.toggle_click_object(id)?;
                Ok(ShopAction::Toggled {
                    active: engine.state().click_objects().equipped == Some(id),
                })
            }
        }
    } else {
        let bought = match item {
            ItemId::Modifier(id) => engine.purchase_modifier(id)?,
            ItemId::ClickObject(id) => engine.purchase_click_object(id)?,
        };
        Ok(if bought {
            ShopAction::Purchased
        } else {
            ShopAction::Refused
        })
    }
}
