//! In-memory leaderboard.
//!
//! One entry per player name, keeping the best level ever submitted. Entries
//! keep their insertion order, so players tied on level are listed in the
//! order they first appeared.

use parking_lot::Mutex;
use tracing::debug;

use crate::types::LeaderboardEntry;

/// What a submission did to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// First submission for this name.
    Inserted,
    /// The stored level went up.
    Raised {
        /// Level stored before.
        previous: u32,
    },
    /// Not higher than the stored level; ignored.
    Kept {
        /// Level still stored.
        best: u32,
    },
}

/// Thread-safe in-memory board.
#[derive(Debug, Default)]
pub struct Leaderboard {
    entries: Mutex<Vec<LeaderboardEntry>>,
}

impl Leaderboard {
    /// Create an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `level` for `player_name`, keeping the maximum.
    pub fn submit(&self, player_name: &str, level: u32) -> SubmitOutcome {
        let mut entries = self.entries.lock();
        let outcome = match entries.iter_mut().find(|e| e.player_name == player_name) {
            Some(entry) if level > entry.level => {
                let previous = entry.level;
                entry.level = level;
                SubmitOutcome::Raised { previous }
            }
            Some(entry) => SubmitOutcome::Kept { best: entry.level },
            None => {
                entries.push(LeaderboardEntry::new(player_name, level));
                SubmitOutcome::Inserted
            }
        };
        debug!(player = player_name, level, ?outcome, "Leaderboard submission");
        outcome
    }

    /// The best `n` entries by level, highest first.
    #[must_use]
    pub fn top(&self, n: usize) -> Vec<LeaderboardEntry> {
        let mut sorted = self.entries.lock().clone();
        sorted.sort_by(|a, b| b.level.cmp(&a.level));
        sorted.truncate(n);
        sorted
    }

    /// Stored level for `player_name`.
    #[must_use]
    pub fn level_of(&self, player_name: &str) -> Option<u32> {
        self.entries
            .lock()
            .iter()
            .find(|e| e.player_name == player_name)
            .map(|e| e.level)
    }

    /// Number of distinct players.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nobody has submitted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
