//! Transient notifications shown by the presentation layer.
//!
//! Engine events become short-lived messages: a level-up banner, a "+N"
//! reward effect and a "5x Bonus!" effect for golden clicks. Each carries its
//! own expiry; the host calls [`NotificationQueue::prune`] every frame.

use candy_core::events::{EngineEvent, RewardSource};
use candy_core::types::Timestamp;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::NotificationConfig;

/// Kind of notification, for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Level-up banner.
    LevelUp,
    /// "+N" near the candy.
    Reward,
    /// Golden-click burst.
    Golden,
}

/// One visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Kind.
    pub kind: NotificationKind,
    /// Text to display.
    pub text: String,
    /// First instant at which it is no longer shown.
    pub expires_at: Timestamp,
}

impl Notification {
    /// Still visible at `now`.
    #[must_use]
    pub fn is_visible(&self, now: Timestamp) -> bool {
        now < self.expires_at
    }
}

/// Visible notifications, oldest first.
#[derive(Debug)]
pub struct NotificationQueue {
    config: NotificationConfig,
    items: Vec<Notification>,
    rng: StdRng,
}

impl NotificationQueue {
    /// Empty queue.
    #[must_use]
    pub fn new(config: NotificationConfig) -> Self {
        Self {
            config,
            items: Vec::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Use a deterministic RNG for auto-clicker effect sampling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Turn an engine event observed at `now` into notifications.
    pub fn observe(&mut self, event: &EngineEvent, now: Timestamp) {
        match *event {
            EngineEvent::RewardGranted {
                amount,
                source,
                golden,
            } => {
                if golden {
                    self.push(NotificationKind::Golden, "5x Bonus!".to_string(), now);
                }
                let show = match source {
                    RewardSource::Click => true,
                    RewardSource::AutoClicker => {
                        self.rng.r#gen::<f64>() < self.config.auto_effect_chance
                    }
                };
                if show {
                    self.push(NotificationKind::Reward, format!("+{amount}"), now);
                }
            }
            EngineEvent::LevelUp { new_level } => {
                self.push(
                    NotificationKind::LevelUp,
                    format!("Level Up! Level {new_level}"),
                    now,
                );
            }
            EngineEvent::PurchaseSucceeded { .. }
            | EngineEvent::PurchaseFailed { .. }
            | EngineEvent::ItemToggled { .. } => {}
        }
    }

    fn push(&mut self, kind: NotificationKind, text: String, now: Timestamp) {
        let ttl = match kind {
            NotificationKind::LevelUp => self.config.level_up_ms,
            NotificationKind::Reward | NotificationKind::Golden => self.config.effect_ms,
        };
        self.items.push(Notification {
            kind,
            text,
            expires_at: now.plus_millis(ttl),
        });
    }

    /// Drop everything expired at `now`; returns how many were removed.
    pub fn prune(&mut self, now: Timestamp) -> usize {
        let before = self.items.len();
        self.items.retain(|n| n.is_visible(now));
        before - self.items.len()
    }

    /// Current notifications (call [`prune`](Self::prune) first).
    #[must_use]
    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    /// Whether nothing is shown.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
