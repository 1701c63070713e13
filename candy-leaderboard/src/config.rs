//! Leaderboard configuration, loadable from TOML.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{LeaderboardError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeaderboardConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Client settings used by game hosts.
    #[serde(default)]
    pub client: ClientConfig,
}

impl LeaderboardConfig {
    /// Parse from a TOML string.
    ///
    /// # Errors
    /// Returns [`LeaderboardError::Config`] if the TOML is malformed.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| LeaderboardError::Config(e.to_string()))
    }

    /// Load from a file path.
    ///
    /// # Errors
    /// Returns an I/O error if the file can't be read, or a config error if
    /// the TOML is malformed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Entries returned by `GET /api/leaderboard`.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Directory served for every other path (the game's static files).
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            top_n: default_top_n(),
            static_dir: None,
            log_level: default_log_level(),
        }
    }
}

/// Client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server base URL, without the `/api/leaderboard` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Retries after the first failed attempt.
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            max_retries: default_retries(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_bind() -> String { "127.0.0.1:3000".to_string() }
fn default_top_n() -> usize { 10 }
fn default_log_level() -> String { "info".to_string() }
fn default_base_url() -> String { "http://127.0.0.1:3000".to_string() }
fn default_retries() -> u32 { 2 }
fn default_timeout_ms() -> u64 { 2_000 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = LeaderboardConfig::from_toml("").expect("parse");
        assert_eq!(config.server.bind, "127.0.0.1:3000");
        assert_eq!(config.server.top_n, 10);
        assert!(config.server.static_dir.is_none());
        assert_eq!(config.client.max_retries, 2);
        assert_eq!(config.server.log_level, "info");
    }

    #[test]
    fn log_level_is_read_from_server_section() {
        let config = LeaderboardConfig::from_toml("[server]\nlog_level = \"debug\"\n").expect("parse");
        assert_eq!(config.server.log_level, "debug");
    }

    #[test]
    fn partial_override() {
        let config = LeaderboardConfig::from_toml(
            "[server]\nbind = \"0.0.0.0:8080\"\nstatic_dir = \"public\"\n",
        )
        .expect("parse");
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.server.static_dir, Some(PathBuf::from("public")));
        assert_eq!(config.server.top_n, 10);
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = LeaderboardConfig::from_toml("[server\n").expect_err("must fail");
        assert!(matches!(err, LeaderboardError::Config(_)));
    }
}
