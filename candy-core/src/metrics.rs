//! Runtime counters for the reward engine.
//!
//! Lock-free `AtomicU64` counters bumped on the hot path and read on
//! export. One [`EngineCounters`] is shared (via `Arc`) between an engine and
//! whoever wants to watch it.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters for engine activity.
#[derive(Debug)]
pub struct EngineCounters {
    /// Player clicks handled.
    pub clicks: AtomicU64,
    /// Auto-clicker ticks that granted currency.
    pub auto_clicks: AtomicU64,
    /// Total currency granted by clicks and ticks.
    pub currency_granted: AtomicU64,
    /// Golden-click rolls that hit.
    pub golden_clicks: AtomicU64,
    /// Level-up transitions.
    pub level_ups: AtomicU64,
    /// Purchases that went through.
    pub purchases_succeeded: AtomicU64,
    /// Purchases refused by a precondition.
    pub purchases_failed: AtomicU64,
    /// Successful toggles.
    pub toggles: AtomicU64,
    /// Successful store writes.
    pub store_writes: AtomicU64,
    /// Operations rolled back after a store failure.
    pub rollbacks: AtomicU64,
}

impl EngineCounters {
    /// Zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            clicks: AtomicU64::new(0),
            auto_clicks: AtomicU64::new(0),
            currency_granted: AtomicU64::new(0),
            golden_clicks: AtomicU64::new(0),
            level_ups: AtomicU64::new(0),
            purchases_succeeded: AtomicU64::new(0),
            purchases_failed: AtomicU64::new(0),
            toggles: AtomicU64::new(0),
            store_writes: AtomicU64::new(0),
            rollbacks: AtomicU64::new(0),
        }
    }

    pub(crate) fn bump(counter: &AtomicU64, by: u64) {
        counter.fetch_add(by, Ordering::Relaxed);
    }

    /// Snapshot all counters for export.
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            clicks: self.clicks.load(Ordering::Relaxed),
            auto_clicks: self.auto_clicks.load(Ordering::Relaxed),
            currency_granted: self.currency_granted.load(Ordering::Relaxed),
            golden_clicks: self.golden_clicks.load(Ordering::Relaxed),
            level_ups: self.level_ups.load(Ordering::Relaxed),
            purchases_succeeded: self.purchases_succeeded.load(Ordering::Relaxed),
            purchases_failed: self.purchases_failed.load(Ordering::Relaxed),
            toggles: self.toggles.load(Ordering::Relaxed),
            store_writes: self.store_writes.load(Ordering::Relaxed),
            rollbacks: self.rollbacks.load(Ordering::Relaxed),
        }
    }
}

impl Default for EngineCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Counter values at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Player clicks handled.
    pub clicks: u64,
    /// Auto-clicker ticks that granted currency.
    pub auto_clicks: u64,
    /// Total currency granted.
    pub currency_granted: u64,
    /// Golden-click hits.
    pub golden_clicks: u64,
    /// Level-ups.
    pub level_ups: u64,
    /// Successful purchases.
    pub purchases_succeeded: u64,
    /// Refused purchases.
    pub purchases_failed: u64,
    /// Successful toggles.
    pub toggles: u64,
    /// Store writes.
    pub store_writes: u64,
    /// Rollbacks.
    pub rollbacks: u64,
}

impl CounterSnapshot {
    /// Format as Prometheus-compatible text.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        let rows = [
            ("candy_clicks_total", "Player clicks handled", self.clicks),
            ("candy_auto_clicks_total", "Auto-clicker ticks that granted currency", self.auto_clicks),
            ("candy_currency_granted_total", "Currency granted", self.currency_granted),
            ("candy_golden_clicks_total", "Golden-click hits", self.golden_clicks),
            ("candy_level_ups_total", "Level-up transitions", self.level_ups),
            ("candy_purchases_succeeded_total", "Successful purchases", self.purchases_succeeded),
            ("candy_purchases_failed_total", "Refused purchases", self.purchases_failed),
            ("candy_toggles_total", "Successful toggles", self.toggles),
            ("candy_store_writes_total", "Store writes", self.store_writes),
            ("candy_rollbacks_total", "Operations rolled back after a store failure", self.rollbacks),
        ];
        let mut out = String::new();
        for (name, help, value) in rows {
            out.push_str(&format!(
                "# HELP {name} {help}\n# TYPE {name} counter\n{name} {value}\n"
            ));
        }
        out
    }
}

/// Span names used with `tracing::span!`.
pub mod spans {
    /// Player click.
    pub const CLICK: &str = "candy::click";
    /// Auto-clicker tick.
    pub const AUTO_CLICK: &str = "candy::auto_click";
    /// Purchase or toggle.
    pub const SHOP: &str = "candy::shop";
    /// Startup restore.
    pub const RESTORE: &str = "candy::restore";
}
