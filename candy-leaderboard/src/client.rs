//! Leaderboard client used by game hosts.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{LeaderboardError, Result};
use crate::server::API_PATH;
use crate::types::{ErrorBody, LeaderboardEntry, SubmitAck};

/// HTTP client for `/api/leaderboard`.
#[derive(Debug, Clone)]
pub struct LeaderboardClient {
    http: Client,
    url: String,
    max_retries: u32,
    timeout: Duration,
}

impl LeaderboardClient {
    /// Client for the server at `base_url` (e.g. `http://127.0.0.1:3000`).
    #[must_use]
    pub fn new(base_url: &str, max_retries: u32, timeout: Duration) -> Self {
        Self {
            http: Client::new(),
            url: format!("{}{API_PATH}", base_url.trim_end_matches('/')),
            max_retries,
            timeout,
        }
    }

    /// Client from configuration.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            &config.base_url,
            config.max_retries,
            Duration::from_millis(config.timeout_ms),
        )
    }

    /// Full endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Submit a level for `player_name`.
    ///
    /// A 400 is returned as [`LeaderboardError::Rejected`] straight away; it
    /// is not retried.
    ///
    /// # Errors
    /// Rejection, or every attempt failing.
    pub async fn submit(&self, player_name: &str, level: u32) -> Result<()> {
        let body = serde_json::json!({ "playerName": player_name, "level": level });

        let mut last_error = String::new();
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                debug!(attempt = attempt + 1, "Retrying leaderboard submit");
            }

            let result = self
                .http
                .post(&self.url)
                .json(&body)
                .timeout(self.timeout)
                .send()
                .await;

            match result {
                Ok(resp) if resp.status().is_success() => {
                    let ack: SubmitAck = resp.json().await?;
                    if ack.success {
                        return Ok(());
                    }
                    last_error = "server answered success=false".to_string();
                }
                Ok(resp) if resp.status() == StatusCode::BAD_REQUEST => {
                    let reason = resp
                        .json::<ErrorBody>()
                        .await
                        .map_or_else(|e| e.to_string(), |b| b.error);
                    return Err(LeaderboardError::Rejected(reason));
                }
                Ok(resp) => {
                    last_error = format!("HTTP {}", resp.status());
                    warn!(status = %resp.status(), "Leaderboard returned error");
                }
                Err(e) => {
                    last_error = e.to_string();
                    warn!(error = %e, "Leaderboard request failed");
                }
            }
        }

        Err(LeaderboardError::RetriesExhausted {
            attempts: self.max_retries + 1,
            last_error,
        })
    }

    /// Fetch the current top entries.
    ///
    /// # Errors
    /// Every attempt failing, or an unparsable body.
    pub async fn top(&self) -> Result<Vec<LeaderboardEntry>> {
        let mut last_error = String::new();
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                debug!(attempt = attempt + 1, "Retrying leaderboard fetch");
            }

            let result = self.http.get(&self.url).timeout(self.timeout).send().await;
            match result {
                Ok(resp) if resp.status().is_success() => {
                    return resp
                        .json()
                        .await
                        .map_err(|e| LeaderboardError::ParseError(e.to_string()));
                }
                Ok(resp) => {
                    last_error = format!("HTTP {}", resp.status());
                    warn!(status = %resp.status(), "Leaderboard returned error");
                }
                Err(e) => {
                    last_error = e.to_string();
                    warn!(error = %e, "Leaderboard request failed");
                }
            }
        }

        Err(LeaderboardError::RetriesExhausted {
            attempts: self.max_retries + 1,
            last_error,
        })
    }
}
