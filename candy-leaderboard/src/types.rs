//! Wire types shared by the server and the client.

use serde::{Deserialize, Serialize};

/// One row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// Name the player submitted under.
    pub player_name: String,
    /// Best level ever submitted for this name.
    pub level: u32,
}

impl LeaderboardEntry {
    /// Build an entry.
    #[must_use]
    pub fn new(player_name: impl Into<String>, level: u32) -> Self {
        Self {
            player_name: player_name.into(),
            level,
        }
    }
}

/// Body of `POST /api/leaderboard`.
///
/// Both fields are optional on the wire so that a missing field is reported
/// as a 400 with the usual error body instead of a bare rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Player name; empty counts as missing.
    #[serde(default)]
    pub player_name: Option<String>,
    /// Level; zero counts as missing.
    #[serde(default)]
    pub level: Option<u32>,
}

impl Submission {
    /// The `(name, level)` pair, if both are present and truthy.
    #[must_use]
    pub fn validated(&self) -> Option<(&str, u32)> {
        let name = self.player_name.as_deref().filter(|n| !n.is_empty())?;
        let level = self.level.filter(|l| *l > 0)?;
        Some((name, level))
    }
}

/// `{"success": true}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitAck {
    /// Always `true` on a 200.
    pub success: bool,
}

/// `{"error": "..."}` returned with a 400.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable reason.
    pub error: String,
}
