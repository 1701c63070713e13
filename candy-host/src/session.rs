//! A running game: one engine, its auto-clicker, notifications and
//! leaderboard reporting.
//!
//! The host feeds [`InputEvent`]s into [`GameSession::dispatch`]. Engine
//! events are buffered in a bounded log and turned into notifications after
//! every dispatch. Level-ups are reported to the leaderboard, when one is
//! configured, as soon as the engine emits them, so auto-clicker level-ups
//! reach it even while no input arrives.
//! The auto-clicker task is (re)started whenever the modifier is owned and
//! switched on, and at most one task is ever alive.

use std::sync::Arc;
use std::time::Duration;

use candy_core::autoclicker::{self, AutoClickerHandle, SharedEngine};
use candy_core::engine::{ClickOutcome, Progress};
use candy_core::shop::ShopRow;
use candy_core::store::open_store;
use candy_core::types::Timestamp;
use candy_core::{KeyValueStore, RewardEngine};
use candy_leaderboard::LeaderboardClient;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::config::HostConfig;
use crate::error::Result;
use crate::events::InputEvent;
use crate::hooks::{self, ShopAction};
use crate::notifications::{Notification, NotificationQueue};
use crate::reporter::{LevelReporter, SessionSink};

/// What a dispatched input did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// A click was rewarded.
    Click(ClickOutcome),
    /// A shop button was handled.
    Shop(ShopAction),
    /// A frame was processed.
    Frame,
}

/// A single player's game.
pub struct GameSession<S: KeyValueStore + Send + 'static> {
    engine: SharedEngine<S>,
    sink: Arc<SessionSink>,
    notifications: NotificationQueue,
    auto_clicker: Option<AutoClickerHandle>,
    tick_period: Duration,
    player_name: String,
}

impl GameSession<Box<dyn KeyValueStore + Send>> {
    /// Open the store named by `config.game.persistence` and start a session.
    ///
    /// # Errors
    /// Store open or read failures.
    pub fn open(config: &HostConfig) -> Result<Self> {
        let store = open_store(&config.game.persistence)?;
        Self::new(store, config)
    }
}

impl<S: KeyValueStore + Send + 'static> GameSession<S> {
    /// Restore the engine from `store` and start the auto-clicker if it is
    /// already owned and switched on.
    ///
    /// # Errors
    /// Store read failures.
    pub fn new(store: S, config: &HostConfig) -> Result<Self> {
        let reporter = config.leaderboard.as_ref().map(|client| {
            LevelReporter::new(
                LeaderboardClient::from_config(client),
                config.player.name.clone(),
            )
        });
        let sink = Arc::new(SessionSink::new(
            config.notifications.max_pending_events,
            reporter,
        ));
        let engine = RewardEngine::load(store, &config.game)?.with_events(sink.clone());

        let mut session = Self {
            engine: Arc::new(Mutex::new(engine)),
            sink,
            notifications: NotificationQueue::new(config.notifications.clone()),
            auto_clicker: None,
            tick_period: config.game.auto_clicker.tick_period(),
            player_name: config.player.name.clone(),
        };
        session.sync_auto_clicker();
        info!(
            player = %session.player_name,
            reporting = session.sink.reporter().is_some(),
            "Game session started"
        );
        Ok(session)
    }

    /// Handle one input.
    ///
    /// # Errors
    /// Store write failures; the engine has already rolled back.
    pub fn dispatch(&mut self, input: InputEvent) -> Result<Dispatched> {
        let dispatched = match input {
            InputEvent::Click { at } => {
                let outcome = self.engine.lock().click(at)?;
                self.collect(at);
                Dispatched::Click(outcome)
            }
            InputEvent::ShopButton { item } => {
                let action = hooks::buy_or_toggle(&mut self.engine.lock(), item)?;
                self.sync_auto_clicker();
                self.collect(Timestamp::now());
                Dispatched::Shop(action)
            }
            InputEvent::Frame { at } => {
                self.collect(at);
                Dispatched::Frame
            }
        };
        Ok(dispatched)
    }

    /// Turn buffered engine events into notifications, then drop expired
    /// ones.
    fn collect(&mut self, now: Timestamp) {
        for event in self.sink.log().drain() {
            self.notifications.observe(&event, now);
        }
        self.notifications.prune(now);
    }

    /// Start the auto-clicker if it should run and isn't, stop it if it
    /// shouldn't run.
    fn sync_auto_clicker(&mut self) {
        let enabled = self.engine.lock().auto_clicker_enabled();
        let running = self.auto_clicker_running();

        if enabled && !running {
            if Handle::try_current().is_err() {
                warn!("No tokio runtime, auto-clicker not started");
                return;
            }
            self.auto_clicker = Some(autoclicker::spawn(
                Arc::clone(&self.engine),
                self.tick_period,
            ));
            debug!("Auto-clicker task spawned");
        } else if !enabled {
            if let Some(handle) = self.auto_clicker.take() {
                handle.stop();
                debug!("Auto-clicker task stopped");
            }
        }
    }

    /// Wait for every outstanding leaderboard report.
    pub async fn flush_reports(&self) {
        if let Some(reporter) = self.sink.reporter() {
            reporter.flush().await;
        }
    }

    /// Engine events waiting for the next dispatch.
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.sink.log().len()
    }

    /// The shared engine.
    #[must_use]
    pub fn engine(&self) -> &SharedEngine<S> {
        &self.engine
    }

    /// Progress toward the next level.
    #[must_use]
    pub fn progress(&self) -> Progress {
        self.engine.lock().progress()
    }

    /// Shop rows with their current status.
    #[must_use]
    pub fn shop_listing(&self) -> Vec<ShopRow> {
        self.engine.lock().shop_listing()
    }

    /// Visible notifications.
    #[must_use]
    pub fn notifications(&self) -> &[Notification] {
        self.notifications.items()
    }

    /// Whether an auto-clicker task is alive.
    #[must_use]
    pub fn auto_clicker_running(&self) -> bool {
        self.auto_clicker
            .as_ref()
            .is_some_and(AutoClickerHandle::is_running)
    }

    /// Player name used for reporting.
    #[must_use]
    pub fn player_name(&self) -> &str {
        &self.player_name
    }
}

impl<S: KeyValueStore + Send + 'static> std::fmt::Debug for GameSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("player_name", &self.player_name)
            .field("auto_clicker_running", &self.auto_clicker_running())
            .field("pending_events", &self.pending_events())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candy_core::config::TickMode;
    use candy_core::store::{KeyValueStoreExt, keys};
    use candy_core::types::{ItemId, ModifierFlags, ModifierId};
    use candy_core::MemoryStore;
    use crate::notifications::NotificationKind;

    fn config() -> HostConfig {
        let mut config = HostConfig::default();
        config.game.auto_clicker.mode = TickMode::Fixed;
        config.game.auto_clicker.interval_ms = 10;
        config
    }

    fn store(currency: u64, level: u32, auto_clicker: bool) -> MemoryStore {
        let mut store = MemoryStore::new();
        store.save(keys::CANDY_COUNT, &currency).expect("seed");
        store.save(keys::LEVEL, &level).expect("seed");
        let mut flags = ModifierFlags::default();
        flags.set(ModifierId::AutoClicker, auto_clicker);
        store.save(keys::OWNED_ITEMS, &flags).expect("seed");
        store.save(keys::ACTIVE_ITEMS, &flags).expect("seed");
        store
    }

    fn currency(session: &GameSession<MemoryStore>) -> u64 {
        session.engine().lock().state().currency()
    }

    #[tokio::test]
    async fn click_shows_reward_and_level_up() {
        let mut session = GameSession::new(store(9, 1, false), &config()).expect("session");
        let at = Timestamp::from_millis(50_000);
        let dispatched = session.dispatch(InputEvent::Click { at }).expect("click");
        assert!(matches!(dispatched, Dispatched::Click(o) if o.level_up == Some(2)));

        let kinds: Vec<NotificationKind> = session.notifications().iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NotificationKind::Reward, NotificationKind::LevelUp]);

        session
            .dispatch(InputEvent::Frame {
                at: at.plus_millis(1_500),
            })
            .expect("frame");
        assert_eq!(session.notifications().len(), 1);
        session
            .dispatch(InputEvent::Frame {
                at: at.plus_millis(2_000),
            })
            .expect("frame");
        assert!(session.notifications().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn owned_auto_clicker_starts_with_the_session() {
        let session = GameSession::new(store(0, 1, true), &config()).expect("session");
        assert!(session.auto_clicker_running());
        tokio::time::sleep(Duration::from_millis(55)).await;
        assert!(currency(&session) >= 4);
    }

    #[tokio::test(start_paused = true)]
    async fn purchase_and_toggle_keep_a_single_task() {
        let mut session = GameSession::new(store(15, 2, false), &config()).expect("session");
        assert!(!session.auto_clicker_running());

        let item = ItemId::Modifier(ModifierId::AutoClicker);
        let action = session.dispatch(InputEvent::ShopButton { item }).expect("buy");
        assert_eq!(action, Dispatched::Shop(ShopAction::Purchased));
        assert!(session.auto_clicker_running());

        tokio::time::sleep(Duration::from_millis(35)).await;
        let first = currency(&session);
        assert!((4..=6).contains(&first), "currency = {first}");

        let action = session.dispatch(InputEvent::ShopButton { item }).expect("off");
        assert_eq!(action, Dispatched::Shop(ShopAction::Toggled { active: false }));
        assert!(!session.auto_clicker_running());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(currency(&session), first);

        session.dispatch(InputEvent::ShopButton { item }).expect("on");
        session.dispatch(InputEvent::ShopButton { item }).expect("off");
        session.dispatch(InputEvent::ShopButton { item }).expect("on");
        assert!(session.auto_clicker_running());
        tokio::time::sleep(Duration::from_millis(35)).await;
        let gained = currency(&session) - first;
        assert!((4..=6).contains(&gained), "gained = {gained}");
    }

    #[tokio::test(start_paused = true)]
    async fn idle_session_keeps_a_bounded_event_buffer() {
        let mut config = config();
        config.notifications.max_pending_events = 16;
        let mut session = GameSession::new(store(0, 1_000, true), &config).expect("session");

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(session.pending_events(), 16);
        assert!(session.engine().lock().state().level() > 1_000);

        session
            .dispatch(InputEvent::Frame {
                at: Timestamp::from_millis(1),
            })
            .expect("frame");
        assert_eq!(session.pending_events(), 0);
        assert!(session
            .notifications()
            .iter()
            .any(|n| n.kind == NotificationKind::LevelUp));
    }

    #[test]
    fn without_runtime_the_session_still_plays() {
        let mut session = GameSession::new(store(0, 1, true), &config()).expect("session");
        assert!(!session.auto_clicker_running());
        session
            .dispatch(InputEvent::Click {
                at: Timestamp::from_millis(1),
            })
            .expect("click");
        assert_eq!(currency(&session), 1);
    }
}
