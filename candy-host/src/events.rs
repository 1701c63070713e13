//! Input events delivered by the presentation layer.

use candy_core::types::{ItemId, Timestamp};

/// Something the player or the host clock did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// The candy was clicked.
    Click {
        /// When.
        at: Timestamp,
    },
    /// A shop row's button was pressed.
    ShopButton {
        /// Which row.
        item: ItemId,
    },
    /// A display frame; expires notifications and collects auto-clicker
    /// activity.
    Frame {
        /// When.
        at: Timestamp,
    },
}
