//! Reward engine benchmark suite.
//!
//! Targets:
//!   click_rapid_memory_store ........ < 5μs
//!   auto_click_tick ................. < 5μs
//!   click_sqlite_store .............. < 200μs
//!   restore_from_store .............. < 50μs
//!   leaderboard_submit_1000_players . < 5ms

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

use candy_core::config::{CandyConfig, PersistenceConfig};
use candy_core::store::{KeyValueStoreExt, MemoryStore, SqliteStore, keys};
use candy_core::types::{ClickObjectId, ModifierFlags, ModifierId, Timestamp};
use candy_core::{PlayerState, RewardEngine};
use candy_leaderboard::Leaderboard;

/// A mid-game store: level 40, every modifier on, candy chest equipped.
fn late_game_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    let mut flags = ModifierFlags::default();
    for id in ModifierId::ALL {
        flags.set(id, true);
    }
    store.save(keys::LEVEL, &40u32).expect("seed");
    store.save(keys::OWNED_ITEMS, &flags).expect("seed");
    store.save(keys::ACTIVE_ITEMS, &flags).expect("seed");
    store
        .set_raw(
            keys::CLICKING_OBJECTS,
            r#"{"candyStick":false,"candyBox":false,"candyChest":true}"#,
        )
        .expect("seed");
    store.save(keys::ACTIVE_CLICKING_OBJECT, &ClickObjectId::CandyChest).expect("seed");
    store
}

/// Benchmark: one rapid click with every modifier on, in-memory store.
fn bench_click_memory(c: &mut Criterion) {
    let mut engine = RewardEngine::load(late_game_store(), &CandyConfig::default())
        .expect("load")
        .with_seed(1);
    let mut now = 1_000_000;
    c.bench_function("click_rapid_memory_store", |b| {
        b.iter(|| {
            now += 100;
            black_box(engine.click(Timestamp::from_millis(now)).expect("click"));
        });
    });
}

/// Benchmark: one auto-clicker tick.
fn bench_auto_click(c: &mut Criterion) {
    let mut engine = RewardEngine::load(late_game_store(), &CandyConfig::default())
        .expect("load");
    c.bench_function("auto_click_tick", |b| {
        b.iter(|| black_box(engine.auto_click().expect("tick")));
    });
}

/// Benchmark: click with write-through to a SQLite file.
fn bench_click_sqlite(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SqliteStore::open(dir.path().join("bench.db"), &PersistenceConfig::default())
        .expect("open");
    let mut engine = RewardEngine::load(store, &CandyConfig::default())
        .expect("load")
        .with_seed(1);
    let mut now = 1_000_000;
    c.bench_function("click_sqlite_store", |b| {
        b.iter(|| {
            now += 100;
            black_box(engine.click(Timestamp::from_millis(now)).expect("click"));
        });
    });
}

/// Benchmark: restore the full player state from a store.
fn bench_restore(c: &mut Criterion) {
    let store = late_game_store();
    let config = CandyConfig::default();
    c.bench_function("restore_from_store", |b| {
        b.iter(|| black_box(PlayerState::restore(&store, &config.engine).expect("restore")));
    });
}

/// Benchmark: 1000 players submitting, then a top-10 read.
fn bench_leaderboard(c: &mut Criterion) {
    c.bench_function("leaderboard_submit_1000_players", |b| {
        b.iter_batched(
            Leaderboard::new,
            |board| {
                for i in 0..1_000u32 {
                    board.submit(&format!("player{}", i % 700), i % 97 + 1);
                }
                black_box(board.top(10))
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_click_memory,
    bench_auto_click,
    bench_click_sqlite,
    bench_restore,
    bench_leaderboard,
);
criterion_main!(benches);
