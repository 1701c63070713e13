//! `candy-leaderboard [config.toml]`

use std::path::PathBuf;

use anyhow::Context;
use candy_leaderboard::LeaderboardConfig;
use candy_leaderboard::server;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => LeaderboardConfig::from_file(&path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => LeaderboardConfig::default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    server::serve(&config.server)
        .await
        .with_context(|| format!("serving on {}", config.server.bind))
}
