//! The reward engine.
//!
//! Turns timestamped clicks and auto-clicker ticks into currency, streak
//! multipliers and level-ups, and runs the shop. Every mutating operation
//! writes through to the [`KeyValueStore`] before returning. If a write
//! fails the in-memory state is restored to what it was before the call and
//! the error is returned; writes that already landed stay in the store.
//!
//! Unmet preconditions (funds, level, ownership) are not errors: the
//! operation returns `Ok(false)`, touches nothing and writes nothing.
//!
//! Reward per click, in order:
//!
//! 1. `base = level + equipped click-object bonus`
//! 2. `reward = base * multiplier`
//! 3. speed boost enabled and the click was rapid: `reward *= 2`
//! 4. golden click enabled and the 5% roll hits: `reward *= 5`
//! 5. `currency += reward`, then at most one level-up check

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use crate::config::{CandyConfig, EngineConfig, ShopConfig};
use crate::error::Result;
use crate::events::{EngineEvent, EventSink, NullSink, RewardSource};
use crate::metrics::{EngineCounters, spans};
use crate::shop::{self, ShopRow};
use crate::state::PlayerState;
use crate::store::{KeyValueStore, KeyValueStoreExt, keys};
use crate::streak::StreakRules;
use crate::types::{ClickObjectId, ItemId, ModifierId, Timestamp};

/// Result of one player click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickOutcome {
    /// Currency granted by this click.
    pub reward: u64,
    /// Streak after the click.
    pub streak: u32,
    /// Multiplier applied.
    pub multiplier: u64,
    /// Whether the click was inside the streak window.
    pub rapid: bool,
    /// Whether the speed boost doubled the reward.
    pub speed_boosted: bool,
    /// Whether the golden-click roll hit.
    pub golden: bool,
    /// New level if this click levelled up.
    pub level_up: Option<u32>,
}

/// Result of one auto-clicker tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoTick {
    /// Currency was granted.
    Granted {
        /// Units granted (the current level).
        reward: u64,
        /// New level if this tick levelled up.
        level_up: Option<u32>,
    },
    /// Auto-clicker not owned or switched off; nothing happened.
    Inactive,
}

/// Progress toward the next level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Current balance.
    pub currency: u64,
    /// Balance that triggers the next level-up.
    pub required: u64,
    /// `currency / required`, capped at 1.0.
    pub fraction: f64,
    /// Current level.
    pub level: u32,
    /// Current streak multiplier.
    pub multiplier: u64,
}

impl Progress {
    /// `"currency/required"`.
    #[must_use]
    pub fn text(&self) -> String {
        format!("{}/{}", self.currency, self.required)
    }

    /// `"2x"`.
    #[must_use]
    pub fn multiplier_text(&self) -> String {
        format!("{}x", self.multiplier)
    }
}

/// Owns [`PlayerState`] and mediates every change to it.
pub struct RewardEngine<S: KeyValueStore> {
    state: PlayerState,
    config: EngineConfig,
    shop: ShopConfig,
    rules: StreakRules,
    store: S,
    events: Arc<dyn EventSink>,
    counters: Arc<EngineCounters>,
    rng: StdRng,
}

impl<S: KeyValueStore> std::fmt::Debug for RewardEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewardEngine")
            .field("state", &self.state)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore> RewardEngine<S> {
    /// Restore an engine from `store`.
    ///
    /// # Errors
    /// Only backend read failures; see [`PlayerState::restore`].
    pub fn load(store: S, config: &CandyConfig) -> Result<Self> {
        Self::load_at(store, config, Timestamp::now())
    }

    /// Like [`load`](Self::load), with an explicit startup time used when
    /// `anchor_streak_at_startup` is set.
    ///
    /// # Errors
    /// Only backend read failures.
    pub fn load_at(store: S, config: &CandyConfig, startup: Timestamp) -> Result<Self> {
        let _span = info_span!(spans::RESTORE).entered();
        let mut state = PlayerState::restore(&store, &config.engine)?;
        if config.engine.anchor_streak_at_startup {
            state.set_last_action(startup);
        }

        info!(
            level = state.level(),
            currency = state.currency(),
            auto_clicker = state.modifiers().is_enabled(ModifierId::AutoClicker),
            "Reward engine ready"
        );

        Ok(Self {
            state,
            config: config.engine.clone(),
            shop: config.shop.clone(),
            rules: StreakRules::from_config(&config.engine),
            store,
            events: Arc::new(NullSink),
            counters: Arc::new(EngineCounters::new()),
            rng: StdRng::from_entropy(),
        })
    }

    /// Send events to `sink`.
    #[must_use]
    pub fn with_events(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = sink;
        self
    }

    /// Record activity into shared `counters`.
    #[must_use]
    pub fn with_counters(mut self, counters: Arc<EngineCounters>) -> Self {
        self.counters = counters;
        self
    }

    /// Use a deterministic RNG for golden-click rolls.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    // ------------------------------------------------------------------
    // Read-only queries
    // ------------------------------------------------------------------

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    /// Shared counters.
    #[must_use]
    pub fn counters(&self) -> &Arc<EngineCounters> {
        &self.counters
    }

    /// Underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the underlying store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Give back the store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Modifier's level gate is met.
    #[must_use]
    pub fn is_unlocked(&self, id: ModifierId) -> bool {
        shop::is_unlocked(&self.state, &self.shop, id)
    }

    /// Balance covers the item's price.
    #[must_use]
    pub fn can_afford(&self, item: ItemId) -> bool {
        match item {
            ItemId::Modifier(id) => shop::can_afford_modifier(&self.state, &self.shop, id),
            ItemId::ClickObject(id) => shop::can_afford_click_object(&self.state, &self.shop, id),
        }
    }

    /// A purchase of `item` would go through right now.
    #[must_use]
    pub fn can_purchase(&self, item: ItemId) -> bool {
        match item {
            ItemId::Modifier(id) => shop::can_purchase_modifier(&self.state, &self.shop, id),
            ItemId::ClickObject(id) => {
                shop::can_purchase_click_object(&self.state, &self.shop, id)
            }
        }
    }

    /// Item is owned.
    #[must_use]
    pub fn owns(&self, item: ItemId) -> bool {
        match item {
            ItemId::Modifier(id) => self.state.modifiers().owned.get(id),
            ItemId::ClickObject(id) => self.state.click_objects().owns(id),
        }
    }

    /// Flat bonus of the equipped click-object, or 0.
    #[must_use]
    pub fn click_object_bonus(&self) -> u64 {
        shop::equipped_bonus(&self.state, &self.shop)
    }

    /// Auto-clicker is owned and switched on.
    #[must_use]
    pub fn auto_clicker_enabled(&self) -> bool {
        self.state.modifiers().is_enabled(ModifierId::AutoClicker)
    }

    /// Every catalog item with its display status.
    #[must_use]
    pub fn shop_listing(&self) -> Vec<ShopRow> {
        shop::listing(&self.state, &self.shop)
    }

    /// Progress toward the next level.
    #[must_use]
    pub fn progress(&self) -> Progress {
        let required = self.state.currency_required_for_next_level();
        #[allow(clippy::cast_precision_loss)]
        let fraction = if required == 0 {
            1.0
        } else {
            (self.state.currency() as f64 / required as f64).min(1.0)
        };
        Progress {
            currency: self.state.currency(),
            required,
            fraction,
            level: self.state.level(),
            multiplier: self.state.multiplier(),
        }
    }

    // ------------------------------------------------------------------
    // Rewards
    // ------------------------------------------------------------------

    /// Handle a player click at `now`.
    ///
    /// # Errors
    /// Store write failures; the state is rolled back.
    pub fn click(&mut self, now: Timestamp) -> Result<ClickOutcome> {
        let _span = info_span!(spans::CLICK).entered();

        let outcome = self.transaction("click", |engine| {
            let update = engine.rules.advance(
                engine.state.streak(),
                engine.state.multiplier(),
                engine.state.last_action(),
                now,
            );
            engine.state.set_streak(update.streak, update.multiplier);

            let base = u64::from(engine.state.level()) + engine.click_object_bonus();
            let mut reward = base.saturating_mul(update.multiplier);

            let speed_boosted =
                update.rapid && engine.state.modifiers().is_enabled(ModifierId::SpeedBoost);
            if speed_boosted {
                reward = reward.saturating_mul(engine.config.speed_boost_factor);
            }

            let golden = engine.state.modifiers().is_enabled(ModifierId::GoldenClick)
                && engine.rng.r#gen::<f64>() < engine.config.golden_click_chance;
            if golden {
                reward = reward.saturating_mul(engine.config.golden_click_factor);
            }

            engine.grant(reward)?;
            let level_up = engine.check_level_up()?;
            engine.state.set_last_action(now);

            Ok(ClickOutcome {
                reward,
                streak: update.streak,
                multiplier: update.multiplier,
                rapid: update.rapid,
                speed_boosted,
                golden,
                level_up,
            })
        })?;

        EngineCounters::bump(&self.counters.clicks, 1);
        EngineCounters::bump(&self.counters.currency_granted, outcome.reward);
        if outcome.golden {
            EngineCounters::bump(&self.counters.golden_clicks, 1);
        }
        debug!(
            reward = outcome.reward,
            streak = outcome.streak,
            multiplier = outcome.multiplier,
            golden = outcome.golden,
            currency = self.state.currency(),
            "Click rewarded"
        );
        self.events.emit(EngineEvent::RewardGranted {
            amount: outcome.reward,
            source: RewardSource::Click,
            golden: outcome.golden,
        });
        self.announce_level_up(outcome.level_up);
        Ok(outcome)
    }

    /// One auto-clicker tick: grant `level` with no multiplier, bonus, boost
    /// or golden roll, and leave the streak alone.
    ///
    /// # Errors
    /// Store write failures; the state is rolled back.
    pub fn auto_click(&mut self) -> Result<AutoTick> {
        if !self.auto_clicker_enabled() {
            return Ok(AutoTick::Inactive);
        }
        let _span = info_span!(spans::AUTO_CLICK).entered();

        let (reward, level_up) = self.transaction("auto_click", |engine| {
            let reward = u64::from(engine.state.level());
            engine.grant(reward)?;
            let level_up = engine.check_level_up()?;
            Ok((reward, level_up))
        })?;

        EngineCounters::bump(&self.counters.auto_clicks, 1);
        EngineCounters::bump(&self.counters.currency_granted, reward);
        self.events.emit(EngineEvent::RewardGranted {
            amount: reward,
            source: RewardSource::AutoClicker,
            golden: false,
        });
        self.announce_level_up(level_up);
        Ok(AutoTick::Granted { reward, level_up })
    }

    // ------------------------------------------------------------------
    // Shop
    // ------------------------------------------------------------------

    /// Buy a modifier; it is switched on immediately.
    ///
    /// Refused (returns `Ok(false)`) unless the level gate is met, the
    /// balance covers the price, and it is not already owned.
    ///
    /// # Errors
    /// Store write failures; the state is rolled back.
    pub fn purchase_modifier(&mut self, id: ModifierId) -> Result<bool> {
        let _span = info_span!(spans::SHOP, item = %id).entered();
        let item = ItemId::Modifier(id);
        if !shop::can_purchase_modifier(&self.state, &self.shop, id) {
            return Ok(self.refuse(item));
        }

        let price = self.shop.modifier(id).price;
        self.transaction("purchase_modifier", |engine| {
            let currency = engine.state.currency() - price;
            engine.state.set_currency(currency);
            let modifiers = engine.state.modifiers_mut();
            modifiers.owned.set(id, true);
            modifiers.active.set(id, true);
            engine.persist_modifiers()?;
            engine.persist(keys::CANDY_COUNT, &currency)
        })?;

        info!(item = %id, price, currency = self.state.currency(), "Modifier purchased");
        EngineCounters::bump(&self.counters.purchases_succeeded, 1);
        self.events.emit(EngineEvent::PurchaseSucceeded { item });
        Ok(true)
    }

    /// Switch an owned modifier on or off.
    ///
    /// # Errors
    /// Store write failures; the state is rolled back.
    pub fn toggle_modifier(&mut self, id: ModifierId) -> Result<bool> {
        if !self.state.modifiers().owned.get(id) {
            debug!(item = %id, "Toggle ignored, modifier not owned");
            return Ok(false);
        }

        let active = self.transaction("toggle_modifier", |engine| {
            let modifiers = engine.state.modifiers_mut();
            let active = !modifiers.active.get(id);
            modifiers.active.set(id, active);
            let flags = modifiers.active;
            engine.persist(keys::ACTIVE_ITEMS, &flags)?;
            Ok(active)
        })?;

        info!(item = %id, active, "Modifier toggled");
        EngineCounters::bump(&self.counters.toggles, 1);
        self.events.emit(EngineEvent::ItemToggled {
            item: ItemId::Modifier(id),
            active,
        });
        Ok(true)
    }

    /// Buy a click-object. Ownership is exclusive: every other object is
    /// given up, and the new one is equipped.
    ///
    /// # Errors
    /// Store write failures; the state is rolled back.
    pub fn purchase_click_object(&mut self, id: ClickObjectId) -> Result<bool> {
        let _span = info_span!(spans::SHOP, item = %id).entered();
        let item = ItemId::ClickObject(id);
        if !shop::can_purchase_click_object(&self.state, &self.shop, id) {
            return Ok(self.refuse(item));
        }

        let price = self.shop.click_object(id).price;
        self.transaction("purchase_click_object", |engine| {
            let currency = engine.state.currency() - price;
            engine.state.set_currency(currency);
            let objects = engine.state.click_objects_mut();
            for (other, owned) in &mut objects.owned {
                *owned = *other == id;
            }
            objects.equipped = Some(id);
            engine.persist_click_objects()?;
            engine.persist(keys::CANDY_COUNT, &currency)
        })?;

        info!(item = %id, price, currency = self.state.currency(), "Click-object purchased");
        EngineCounters::bump(&self.counters.purchases_succeeded, 1);
        self.events.emit(EngineEvent::PurchaseSucceeded { item });
        Ok(true)
    }

    /// Equip an owned click-object, or unequip it if it is already equipped.
    ///
    /// # Errors
    /// Store write failures; the state is rolled back.
    pub fn toggle_click_object(&mut self, id: ClickObjectId) -> Result<bool> {
        if !self.state.click_objects().owns(id) {
            debug!(item = %id, "Toggle ignored, click-object not owned");
            return Ok(false);
        }

        let equipped = self.transaction("toggle_click_object", |engine| {
            let objects = engine.state.click_objects_mut();
            objects.equipped = if objects.equipped == Some(id) {
                None
            } else {
                Some(id)
            };
            let equipped = objects.equipped;
            engine.persist(keys::ACTIVE_CLICKING_OBJECT, &equipped)?;
            Ok(equipped == Some(id))
        })?;

        info!(item = %id, equipped, "Click-object toggled");
        EngineCounters::bump(&self.counters.toggles, 1);
        self.events.emit(EngineEvent::ItemToggled {
            item: ItemId::ClickObject(id),
            active: equipped,
        });
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Run `op`; on error put the state back the way it was.
    fn transaction<T>(
        &mut self,
        operation: &'static str,
        op: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let snapshot = self.state.clone();
        match op(&mut *self) {
            Ok(value) => Ok(value),
            Err(error) => {
                warn!(operation, %error, "Store write failed, rolling back");
                self.state = snapshot;
                EngineCounters::bump(&self.counters.rollbacks, 1);
                Err(error)
            }
        }
    }

    fn refuse(&self, item: ItemId) -> bool {
        debug!(
            %item,
            level = self.state.level(),
            currency = self.state.currency(),
            "Purchase refused"
        );
        EngineCounters::bump(&self.counters.purchases_failed, 1);
        self.events.emit(EngineEvent::PurchaseFailed { item });
        false
    }

    fn grant(&mut self, reward: u64) -> Result<()> {
        let currency = self.state.currency().saturating_add(reward);
        self.state.set_currency(currency);
        self.persist(keys::CANDY_COUNT, &currency)
    }

    /// Single level-up check; surplus currency is discarded and no second
    /// level-up can follow from the same grant.
    fn check_level_up(&mut self) -> Result<Option<u32>> {
        if self.state.currency() < self.state.currency_required_for_next_level() {
            return Ok(None);
        }
        let new_level = self.state.level().saturating_add(1);
        self.state.set_level(new_level, &self.config);
        self.persist(keys::LEVEL, &new_level)?;
        self.state.set_currency(0);
        self.persist(keys::CANDY_COUNT, &0u64)?;
        Ok(Some(new_level))
    }

    fn announce_level_up(&self, level_up: Option<u32>) {
        if let Some(new_level) = level_up {
            info!(
                new_level,
                required = self.state.currency_required_for_next_level(),
                "Level up"
            );
            EngineCounters::bump(&self.counters.level_ups, 1);
            self.events.emit(EngineEvent::LevelUp { new_level });
        }
    }

    fn persist_modifiers(&mut self) -> Result<()> {
        let modifiers = *self.state.modifiers();
        self.persist(keys::OWNED_ITEMS, &modifiers.owned)?;
        self.persist(keys::ACTIVE_ITEMS, &modifiers.active)
    }

    fn persist_click_objects(&mut self) -> Result<()> {
        let ownership = self.state.click_objects().ownership_map();
        let equipped = self.state.click_objects().equipped;
        self.persist(keys::CLICKING_OBJECTS, &ownership)?;
        self.persist(keys::ACTIVE_CLICKING_OBJECT, &equipped)
    }

    fn persist<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        self.store.save(key, value)?;
        EngineCounters::bump(&self.counters.store_writes, 1);
        Ok(())
    }
}
