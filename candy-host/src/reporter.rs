//! The session's engine event sink.
//!
//! Every event is buffered in a bounded [`EventLog`] for the notification
//! queue to pick up on the next dispatch. Level-ups are additionally
//! submitted to the leaderboard at the moment they are emitted, whether a
//! click or an auto-clicker tick caused them.

use candy_core::events::{EngineEvent, EventLog, EventSink};
use candy_leaderboard::LeaderboardClient;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Submits levels for one player in background tasks.
#[derive(Debug)]
pub struct LevelReporter {
    client: LeaderboardClient,
    player_name: String,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl LevelReporter {
    /// Reporter submitting as `player_name` through `client`.
    #[must_use]
    pub fn new(client: LeaderboardClient, player_name: String) -> Self {
        Self {
            client,
            player_name,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Submit `level` without waiting for the result.
    pub fn report(&self, level: u32) {
        let Ok(runtime) = Handle::try_current() else {
            warn!(level, "No tokio runtime, level-up not reported");
            return;
        };
        let client = self.client.clone();
        let name = self.player_name.clone();
        let task = runtime.spawn(async move {
            match client.submit(&name, level).await {
                Ok(()) => debug!(player = %name, level, "Level reported"),
                Err(error) => warn!(player = %name, level, %error, "Level report failed"),
            }
        });

        let mut pending = self.pending.lock();
        pending.retain(|h| !h.is_finished());
        pending.push(task);
    }

    /// Submissions still in flight.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.pending.lock().iter().filter(|h| !h.is_finished()).count()
    }

    /// Wait for every submission started so far.
    pub async fn flush(&self) {
        let handles = std::mem::take(&mut *self.pending.lock());
        for handle in handles {
            if let Err(error) = handle.await {
                warn!(%error, "Report task failed");
            }
        }
    }
}

/// Bounded event buffer plus immediate level-up reporting.
#[derive(Debug)]
pub struct SessionSink {
    log: EventLog,
    reporter: Option<LevelReporter>,
}

impl SessionSink {
    /// Sink buffering at most `capacity` events.
    #[must_use]
    pub fn new(capacity: usize, reporter: Option<LevelReporter>) -> Self {
        Self {
            log: EventLog::bounded(capacity),
            reporter,
        }
    }

    /// Buffered events awaiting the notification queue.
    #[must_use]
    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// The leaderboard reporter, if one is configured.
    #[must_use]
    pub fn reporter(&self) -> Option<&LevelReporter> {
        self.reporter.as_ref()
    }
}

impl EventSink for SessionSink {
    fn emit(&self, event: EngineEvent) {
        if let (EngineEvent::LevelUp { new_level }, Some(reporter)) = (&event, &self.reporter) {
            reporter.report(*new_level);
        }
        self.log.emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candy_core::events::RewardSource;

    fn reward(amount: u64) -> EngineEvent {
        EngineEvent::RewardGranted {
            amount,
            source: RewardSource::AutoClicker,
            golden: false,
        }
    }

    #[test]
    fn buffer_stays_bounded() {
        let sink = SessionSink::new(8, None);
        for amount in 0..1_000 {
            sink.emit(reward(amount));
        }
        sink.emit(EngineEvent::LevelUp { new_level: 4 });
        assert_eq!(sink.log().len(), 8);
        assert!(sink.log().drain().contains(&EngineEvent::LevelUp { new_level: 4 }));
    }

    #[test]
    fn level_up_without_runtime_is_only_buffered() {
        let client =
            LeaderboardClient::new("http://127.0.0.1:9", 0, std::time::Duration::from_millis(10));
        let sink = SessionSink::new(4, Some(LevelReporter::new(client, "Mia".to_string())));
        sink.emit(EngineEvent::LevelUp { new_level: 2 });
        assert_eq!(sink.reporter().map(LevelReporter::in_flight), Some(0));
        assert_eq!(sink.log().len(), 1);
    }
}
