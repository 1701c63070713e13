//! Notifications emitted by the engine for the presentation layer.
//!
//! Events only drive transient UI effects. Correctness never depends on a
//! sink receiving them, and they are emitted only after the change they
//! describe has been persisted.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::types::ItemId;

/// What produced a reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RewardSource {
    /// A player click.
    Click,
    /// An auto-clicker tick.
    AutoClicker,
}

/// A state change worth showing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EngineEvent {
    /// Currency was added.
    RewardGranted {
        /// Units added.
        amount: u64,
        /// Click or auto-clicker.
        source: RewardSource,
        /// Whether the golden-click roll hit.
        golden: bool,
    },
    /// The level went up.
    LevelUp {
        /// Level after the transition.
        new_level: u32,
    },
    /// A purchase went through.
    PurchaseSucceeded {
        /// What was bought.
        item: ItemId,
    },
    /// A purchase was refused (funds, level or already owned).
    PurchaseFailed {
        /// What was asked for.
        item: ItemId,
    },
    /// An owned modifier was switched, or a click-object equipped/unequipped.
    ItemToggled {
        /// Which item.
        item: ItemId,
        /// State after the toggle.
        active: bool,
    },
}

/// Receiver of [`EngineEvent`]s.
pub trait EventSink: Send + Sync {
    /// Deliver one event. Must not block.
    fn emit(&self, event: EngineEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: EngineEvent) {}
}

/// Buffers events until drained.
///
/// A bounded log evicts the oldest non-level-up event when full, so a host
/// that drains rarely still sees every level-up while reward effects are
/// shed first.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<VecDeque<EngineEvent>>,
    capacity: Option<usize>,
    evicted: AtomicU64,
}

impl EventLog {
    /// Create an empty, unbounded log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty log holding at most `capacity` events (minimum 1).
    #[must_use]
    pub fn bounded(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity.max(1)),
            ..Self::default()
        }
    }

    /// Take every buffered event.
    pub fn drain(&self) -> Vec<EngineEvent> {
        self.events.lock().drain(..).collect()
    }

    /// Number of buffered events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Events dropped because the log was full.
    #[must_use]
    pub fn evicted(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: EngineEvent) {
        let mut events = self.events.lock();
        if let Some(capacity) = self.capacity {
            if events.len() >= capacity {
                let victim = events
                    .iter()
                    .position(|e| !matches!(e, EngineEvent::LevelUp { .. }))
                    .unwrap_or(0);
                events.remove(victim);
                self.evicted.fetch_add(1, Ordering::Relaxed);
            }
        }
        events.push_back(event);
    }
}

impl EventSink for mpsc::UnboundedSender<EngineEvent> {
    fn emit(&self, event: EngineEvent) {
        // A closed receiver just means nobody is watching any more.
        let _ = self.send(event);
    }
}
