//! Property-based tests for the reward engine.
//!
//! Random sequences of clicks, ticks, purchases and toggles must never break
//! the state invariants, and whatever the engine holds must be exactly what a
//! fresh engine restores from the same store.

use proptest::prelude::*;

use candy_core::config::CandyConfig;
use candy_core::store::MemoryStore;
use candy_core::types::{ClickObjectId, ModifierId, Timestamp};
use candy_core::{PlayerState, RewardEngine};

#[derive(Debug, Clone)]
enum Op {
    Click(u64),
    AutoTick,
    BuyModifier(ModifierId),
    ToggleModifier(ModifierId),
    BuyObject(ClickObjectId),
    ToggleObject(ClickObjectId),
}

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

fn arb_modifier() -> impl Strategy<Value = ModifierId> {
    prop::sample::select(ModifierId::ALL.to_vec())
}

fn arb_object() -> impl Strategy<Value = ClickObjectId> {
    prop::sample::select(ClickObjectId::ALL.to_vec())
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (0u64..1_500).prop_map(Op::Click),
        1 => Just(Op::AutoTick),
        1 => arb_modifier().prop_map(Op::BuyModifier),
        1 => arb_modifier().prop_map(Op::ToggleModifier),
        1 => arb_object().prop_map(Op::BuyObject),
        1 => arb_object().prop_map(Op::ToggleObject),
    ]
}

fn engine(seed: u64) -> RewardEngine<MemoryStore> {
    RewardEngine::load(MemoryStore::new(), &CandyConfig::default())
        .expect("load")
        .with_seed(seed)
}

fn apply(engine: &mut RewardEngine<MemoryStore>, now: &mut u64, op: &Op) {
    match *op {
        Op::Click(gap) => {
            *now += gap;
            engine.click(Timestamp::from_millis(*now)).expect("click");
        }
        Op::AutoTick => {
            engine.auto_click().expect("tick");
        }
        Op::BuyModifier(id) => {
            engine.purchase_modifier(id).expect("purchase");
        }
        Op::ToggleModifier(id) => {
            engine.toggle_modifier(id).expect("toggle");
        }
        Op::BuyObject(id) => {
            engine.purchase_click_object(id).expect("purchase");
        }
        Op::ToggleObject(id) => {
            engine.toggle_click_object(id).expect("toggle");
        }
    }
}

fn check_invariants(state: &PlayerState) -> Result<(), TestCaseError> {
    prop_assert!(state.level() >= 1);
    prop_assert_eq!(
        state.currency_required_for_next_level(),
        u64::from(state.level()) * 10
    );
    prop_assert!(state.currency() < state.currency_required_for_next_level());
    prop_assert!((1..=3).contains(&state.multiplier()));

    let modifiers = state.modifiers();
    for id in ModifierId::ALL {
        prop_assert!(!modifiers.active.get(id) || modifiers.owned.get(id));
    }

    let objects = state.click_objects();
    let owned = ClickObjectId::ALL.iter().filter(|id| objects.owns(**id)).count();
    prop_assert!(owned <= 1);
    if let Some(id) = objects.equipped {
        prop_assert!(objects.owns(id));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Property: invariants hold after every operation
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn invariants_hold_for_any_sequence(
        seed in any::<u64>(),
        ops in prop::collection::vec(arb_op(), 1..200),
    ) {
        let mut engine = engine(seed);
        let mut now = 1_000_000;
        for op in &ops {
            apply(&mut engine, &mut now, op);
            check_invariants(engine.state())?;
        }
    }
}

// ---------------------------------------------------------------------------
// Property: multiplier tier matches the streak
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn multiplier_tier_follows_streak(gaps in prop::collection::vec(0u64..1_000, 1..60)) {
        let mut engine = engine(1);
        let mut now = 1_000_000;
        for gap in gaps {
            now += gap;
            let outcome = engine.click(Timestamp::from_millis(now)).expect("click");
            let expected = match outcome.streak {
                s if s >= 10 => 3,
                s if s >= 5 => 2,
                _ => 1,
            };
            prop_assert_eq!(outcome.multiplier, expected);
            if !outcome.rapid {
                prop_assert_eq!(outcome.streak, 0);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property: stored state and in-memory state never diverge
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn restore_matches_live_state(
        seed in any::<u64>(),
        ops in prop::collection::vec(arb_op(), 1..150),
    ) {
        let mut live = engine(seed);
        let mut now = 1_000_000;
        for op in &ops {
            apply(&mut live, &mut now, op);
        }

        let store = live.store().clone();
        let restored = RewardEngine::load(store, &CandyConfig::default()).expect("reload");
        let (a, b) = (live.state(), restored.state());
        prop_assert_eq!(a.currency(), b.currency());
        prop_assert_eq!(a.level(), b.level());
        prop_assert_eq!(a.modifiers(), b.modifiers());
        prop_assert_eq!(a.click_objects(), b.click_objects());
    }
}

// ---------------------------------------------------------------------------
// Property: a refused purchase changes nothing and writes nothing
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn refused_purchase_is_a_no_op(
        clicks in 0usize..40,
        modifier in arb_modifier(),
        object in arb_object(),
    ) {
        let mut engine = engine(9);
        for i in 0..clicks {
            let t = 1_000_000 + 1_000 * i as u64;
            engine.click(Timestamp::from_millis(t)).expect("click");
        }

        let before = engine.state().clone();
        let writes = engine.store().writes();
        if !engine.can_purchase(modifier.into()) {
            prop_assert!(!engine.purchase_modifier(modifier).expect("purchase"));
        }
        if !engine.can_purchase(object.into()) {
            prop_assert!(!engine.purchase_click_object(object).expect("purchase"));
        }
        // only refused purchases were attempted
        prop_assert_eq!(engine.store().writes(), writes);
        prop_assert_eq!(engine.state(), &before);
    }
}
