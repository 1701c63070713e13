//! Player state: balance, level, streak, modifiers and click-objects.
//!
//! [`PlayerState`] is plain data owned by a single
//! [`RewardEngine`](crate::engine::RewardEngine). Its setters are crate-private
//! so the invariants below hold everywhere outside the engine:
//!
//! - `currency_required_for_next_level == level * level_step`
//! - a modifier is only active if it is owned
//! - at most one click-object is owned, and only an owned one is equipped

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::{CandyError, Result};
use crate::store::{KeyValueStore, KeyValueStoreExt, keys};
use crate::types::{ClickObjectId, ModifierFlags, ModifierId, Timestamp};

/// Owned/active flags for every modifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Modifiers {
    /// Purchased (permanent).
    pub owned: ModifierFlags,
    /// Currently switched on.
    pub active: ModifierFlags,
}

impl Modifiers {
    /// Owned and switched on.
    #[must_use]
    pub fn is_enabled(&self, id: ModifierId) -> bool {
        self.owned.get(id) && self.active.get(id)
    }
}

/// Ownership flags and the equipped slot for click-objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClickObjects {
    /// One flag per object, as persisted under `clickingObjects`.
    pub owned: BTreeMap<ClickObjectId, bool>,
    /// The equipped object, persisted under `activeClickingObject`.
    pub equipped: Option<ClickObjectId>,
}

impl ClickObjects {
    /// Whether `id` is owned.
    #[must_use]
    pub fn owns(&self, id: ClickObjectId) -> bool {
        self.owned.get(&id).copied().unwrap_or(false)
    }

    /// Persisted form: `{"candyStick": bool, ...}`.
    #[must_use]
    pub fn ownership_map(&self) -> BTreeMap<&'static str, bool> {
        ClickObjectId::ALL
            .into_iter()
            .map(|id| (id.as_str(), self.owns(id)))
            .collect()
    }
}

impl Default for ClickObjects {
    fn default() -> Self {
        Self {
            owned: ClickObjectId::ALL.into_iter().map(|id| (id, false)).collect(),
            equipped: None,
        }
    }
}

/// The single player's full state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerState {
    currency: u64,
    level: u32,
    currency_required_for_next_level: u64,
    streak: u32,
    multiplier: u64,
    last_action: Option<Timestamp>,
    modifiers: Modifiers,
    click_objects: ClickObjects,
}

impl PlayerState {
    /// Fresh state: currency 0, level 1, nothing owned.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            currency: 0,
            level: 1,
            currency_required_for_next_level: config.level_step,
            streak: 0,
            multiplier: 1,
            last_action: None,
            modifiers: Modifiers::default(),
            click_objects: ClickObjects::default(),
        }
    }

    /// Accumulated reward units.
    #[must_use]
    pub fn currency(&self) -> u64 {
        self.currency
    }

    /// Current level (starts at 1).
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Always `level * level_step`.
    #[must_use]
    pub fn currency_required_for_next_level(&self) -> u64 {
        self.currency_required_for_next_level
    }

    /// Consecutive rapid clicks.
    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Streak-derived multiplier.
    #[must_use]
    pub fn multiplier(&self) -> u64 {
        self.multiplier
    }

    /// Time of the most recent reward-granting click.
    #[must_use]
    pub fn last_action(&self) -> Option<Timestamp> {
        self.last_action
    }

    /// Modifier flags.
    #[must_use]
    pub fn modifiers(&self) -> &Modifiers {
        &self.modifiers
    }

    /// Click-object inventory.
    #[must_use]
    pub fn click_objects(&self) -> &ClickObjects {
        &self.click_objects
    }

    // ------------------------------------------------------------------
    // Engine-only mutation
    // ------------------------------------------------------------------

    pub(crate) fn set_level(&mut self, level: u32, config: &EngineConfig) {
        self.level = level.max(1);
        self.currency_required_for_next_level = u64::from(self.level) * config.level_step;
    }

    pub(crate) fn set_currency(&mut self, currency: u64) {
        self.currency = currency;
    }

    pub(crate) fn set_streak(&mut self, streak: u32, multiplier: u64) {
        self.streak = streak;
        self.multiplier = multiplier;
    }

    pub(crate) fn set_last_action(&mut self, at: Timestamp) {
        self.last_action = Some(at);
    }

    pub(crate) fn modifiers_mut(&mut self) -> &mut Modifiers {
        &mut self.modifiers
    }

    pub(crate) fn click_objects_mut(&mut self) -> &mut ClickObjects {
        &mut self.click_objects
    }

    // ------------------------------------------------------------------
    // Restore
    // ------------------------------------------------------------------

    /// Rebuild state from `store`, key by key.
    ///
    /// An absent key takes its default. A present but unreadable value is
    /// logged and also takes its default; a stored `0` or `false` is a real
    /// value, never "absent". Inconsistent combinations (active without
    /// owned, equipped without owned, several owned objects) are repaired.
    ///
    /// # Errors
    /// Only backend read failures; bad data never fails the restore.
    pub fn restore<S: KeyValueStore + ?Sized>(store: &S, config: &EngineConfig) -> Result<Self> {
        let mut state = Self::new(config);

        if let Some(currency) = read_key::<u64, _>(store, keys::CANDY_COUNT)? {
            state.currency = currency;
        }

        match read_key::<u32, _>(store, keys::LEVEL)? {
            Some(0) => warn!(key = keys::LEVEL, "Stored level 0 is invalid, using 1"),
            Some(level) => state.set_level(level, config),
            None => {}
        }

        let owned = read_key::<ModifierFlags, _>(store, keys::OWNED_ITEMS)?.unwrap_or_default();
        let mut active =
            read_key::<ModifierFlags, _>(store, keys::ACTIVE_ITEMS)?.unwrap_or_default();
        for id in ModifierId::ALL {
            if active.get(id) && !owned.get(id) {
                warn!(modifier = %id, "Active flag without ownership, clearing");
                active.set(id, false);
            }
        }
        state.modifiers = Modifiers { owned, active };

        let stored_objects =
            read_key::<BTreeMap<String, bool>, _>(store, keys::CLICKING_OBJECTS)?.unwrap_or_default();
        for (name, owned) in stored_objects {
            match name.parse::<ClickObjectId>() {
                Ok(id) => {
                    state.click_objects.owned.insert(id, owned);
                }
                Err(_) => warn!(object = %name, "Ignoring unknown click-object"),
            }
        }

        let equipped = match read_key::<Option<String>, _>(store, keys::ACTIVE_CLICKING_OBJECT)? {
            Some(Some(name)) if name != "null" => match name.parse::<ClickObjectId>() {
                Ok(id) => Some(id),
                Err(_) => {
                    warn!(object = %name, "Ignoring unknown equipped click-object");
                    None
                }
            },
            _ => None,
        };
        state.click_objects.equipped = equipped.filter(|id| {
            let owned = state.click_objects.owns(*id);
            if !owned {
                warn!(object = %id, "Equipped click-object is not owned, unequipping");
            }
            owned
        });

        let owned_count = state.click_objects.owned.values().filter(|&&o| o).count();
        if owned_count > 1 {
            warn!(owned_count, "Several click-objects owned, keeping only the equipped one");
            let keep = state.click_objects.equipped;
            for (id, owned) in &mut state.click_objects.owned {
                *owned = Some(*id) == keep;
            }
        }

        debug!(
            currency = state.currency,
            level = state.level,
            equipped = ?state.click_objects.equipped,
            "Player state restored"
        );
        Ok(state)
    }
}

/// Load `key`, downgrading unparsable values to "absent" with a warning.
fn read_key<T: DeserializeOwned, S: KeyValueStore + ?Sized>(
    store: &S,
    key: &str,
) -> Result<Option<T>> {
    match store.load::<T>(key) {
        Ok(value) => Ok(value),
        Err(CandyError::Serialization(error)) => {
            warn!(key, %error, "Ignoring unreadable stored value");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn empty_store_gives_defaults() {
        let state = PlayerState::restore(&MemoryStore::new(), &config()).expect("restore");
        assert_eq!(state.currency(), 0);
        assert_eq!(state.level(), 1);
        assert_eq!(state.currency_required_for_next_level(), 10);
        assert_eq!(state.multiplier(), 1);
        assert!(state.last_action().is_none());
        assert!(state.click_objects().equipped.is_none());
    }

    #[test]
    fn stored_zero_is_not_absent() {
        let mut store = MemoryStore::new();
        store.set_raw(keys::CANDY_COUNT, "0").expect("set");
        store.set_raw(keys::LEVEL, "3").expect("set");
        let state = PlayerState::restore(&store, &config()).expect("restore");
        assert_eq!(state.currency(), 0);
        assert_eq!(state.level(), 3);
        assert_eq!(state.currency_required_for_next_level(), 30);
    }

    #[test]
    fn level_zero_falls_back_to_one() {
        let mut store = MemoryStore::new();
        store.set_raw(keys::LEVEL, "0").expect("set");
        let state = PlayerState::restore(&store, &config()).expect("restore");
        assert_eq!(state.level(), 1);
    }

    #[test]
    fn garbage_value_uses_default() {
        let mut store = MemoryStore::new();
        store.set_raw(keys::CANDY_COUNT, "not a number").expect("set");
        store.set_raw(keys::LEVEL, "4").expect("set");
        let state = PlayerState::restore(&store, &config()).expect("restore");
        assert_eq!(state.currency(), 0);
        assert_eq!(state.level(), 4);
    }

    #[test]
    fn active_without_owned_is_cleared() {
        let mut store = MemoryStore::new();
        store
            .set_raw(keys::ACTIVE_ITEMS, r#"{"autoClicker":true,"speedBoost":false,"goldenClick":false}"#)
            .expect("set");
        let state = PlayerState::restore(&store, &config()).expect("restore");
        assert!(!state.modifiers().active.get(ModifierId::AutoClicker));
    }

    #[test]
    fn legacy_null_string_means_nothing_equipped() {
        let mut store = MemoryStore::new();
        store.set_raw(keys::ACTIVE_CLICKING_OBJECT, r#""null""#).expect("set");
        let state = PlayerState::restore(&store, &config()).expect("restore");
        assert!(state.click_objects().equipped.is_none());
    }

    #[test]
    fn equipped_object_restored_when_owned() {
        let mut store = MemoryStore::new();
        store
            .set_raw(keys::CLICKING_OBJECTS, r#"{"candyStick":false,"candyBox":true,"candyChest":false}"#)
            .expect("set");
        store.set_raw(keys::ACTIVE_CLICKING_OBJECT, r#""candyBox""#).expect("set");
        let state = PlayerState::restore(&store, &config()).expect("restore");
        assert_eq!(state.click_objects().equipped, Some(ClickObjectId::CandyBox));
        assert!(state.click_objects().owns(ClickObjectId::CandyBox));
    }

    #[test]
    fn several_owned_objects_collapse_to_equipped() {
        let mut store = MemoryStore::new();
        store
            .set_raw(keys::CLICKING_OBJECTS, r#"{"candyStick":true,"candyBox":true,"mystery":true}"#)
            .expect("set");
        store.set_raw(keys::ACTIVE_CLICKING_OBJECT, r#""candyStick""#).expect("set");
        let state = PlayerState::restore(&store, &config()).expect("restore");
        assert!(state.click_objects().owns(ClickObjectId::CandyStick));
        assert!(!state.click_objects().owns(ClickObjectId::CandyBox));
    }

    #[test]
    fn equipped_but_not_owned_is_dropped() {
        let mut store = MemoryStore::new();
        store.set_raw(keys::ACTIVE_CLICKING_OBJECT, r#""candyChest""#).expect("set");
        let state = PlayerState::restore(&store, &config()).expect("restore");
        assert!(state.click_objects().equipped.is_none());
    }

    #[test]
    fn ownership_map_lists_every_object() {
        let objects = ClickObjects::default();
        let map = objects.ownership_map();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get("candyChest"), Some(&false));
    }
}
