//! Background auto-clicker task.
//!
//! A tokio task ticks at the configured rate and calls
//! [`RewardEngine::auto_click`] under the shared engine lock. It stops by
//! itself on the first tick that finds the auto-clicker switched off, and it
//! can be cancelled through its [`AutoClickerHandle`]. The lock is never held
//! across an await point.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use crate::engine::{AutoTick, RewardEngine};
use crate::store::KeyValueStore;

/// An engine shared between the host and the auto-clicker task.
pub type SharedEngine<S> = Arc<Mutex<RewardEngine<S>>>;

/// Handle to a running auto-clicker task.
#[derive(Debug)]
pub struct AutoClickerHandle {
    cancel: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl AutoClickerHandle {
    /// Whether the task is still ticking.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Cancel the task. No tick runs after this returns.
    pub fn stop(&self) {
        self.cancel.store(true, Ordering::Release);
        self.task.abort();
    }
}

impl Drop for AutoClickerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Spawn the auto-clicker on the current tokio runtime.
///
/// The first grant happens one `period` after spawning. Ticks that fall
/// behind are skipped rather than bunched up.
pub fn spawn<S>(engine: SharedEngine<S>, period: Duration) -> AutoClickerHandle
where
    S: KeyValueStore + Send + 'static,
{
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);

    let task = tokio::spawn(async move {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await;

        debug!(period_ms = period.as_millis(), "Auto-clicker started");
        loop {
            ticker.tick().await;
            if flag.load(Ordering::Acquire) {
                break;
            }
            let tick = engine.lock().auto_click();
            match tick {
                Ok(AutoTick::Granted { .. }) => {}
                Ok(AutoTick::Inactive) => break,
                Err(error) => warn!(%error, "Auto-clicker tick failed"),
            }
        }
        debug!("Auto-clicker stopped");
    });

    AutoClickerHandle { cancel, task }
}
