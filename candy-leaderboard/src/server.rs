//! HTTP API over the in-memory [`Leaderboard`].
//!
//! ```text
//! GET  /api/leaderboard   -> 200 [{playerName, level}, ...]   (top N, level desc)
//! POST /api/leaderboard   -> 200 {success: true}
//!                         -> 400 {error}   missing/falsy field or bad JSON
//! *                       -> static files, if a directory is configured
//! ```

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::board::Leaderboard;
use crate::config::ServerConfig;
use crate::error::Result;
use crate::types::{ErrorBody, LeaderboardEntry, SubmitAck, Submission};

/// Route served by the API.
pub const API_PATH: &str = "/api/leaderboard";

const MISSING_FIELDS: &str = "Player name and level are required";

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    board: Arc<Leaderboard>,
    top_n: usize,
}

impl AppState {
    /// State over `board`, returning `top_n` rows per GET.
    #[must_use]
    pub fn new(board: Arc<Leaderboard>, top_n: usize) -> Self {
        Self { board, top_n }
    }

    /// The board behind the API.
    #[must_use]
    pub fn board(&self) -> &Arc<Leaderboard> {
        &self.board
    }
}

/// Build the router: API routes, permissive CORS, optional static fallback.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let mut router = Router::new()
        .route(API_PATH, get(list_entries).post(submit_entry))
        .with_state(state);

    if let Some(dir) = &config.static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router.layer(CorsLayer::permissive())
}

async fn list_entries(State(state): State<AppState>) -> Json<Vec<LeaderboardEntry>> {
    Json(state.board.top(state.top_n))
}

async fn submit_entry(
    State(state): State<AppState>,
    body: std::result::Result<Json<Submission>, JsonRejection>,
) -> Response {
    let submission = match body {
        Ok(Json(submission)) => submission,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Malformed leaderboard submission");
            return bad_request(MISSING_FIELDS);
        }
    };

    let Some((name, level)) = submission.validated() else {
        return bad_request(MISSING_FIELDS);
    };

    state.board.submit(name, level);
    Json(SubmitAck { success: true }).into_response()
}

fn bad_request(reason: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: reason.to_string(),
        }),
    )
        .into_response()
}

/// Bind `config.bind`, returning the listener and the address actually bound.
///
/// # Errors
/// Returns an I/O error if the address can't be bound.
pub async fn bind(config: &ServerConfig) -> Result<(TcpListener, SocketAddr)> {
    let listener = TcpListener::bind(&config.bind).await?;
    let addr = listener.local_addr()?;
    Ok((listener, addr))
}

/// Serve `app` on `listener` until `shutdown` resolves.
///
/// # Errors
/// Returns an I/O error if the server fails.
pub async fn run<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(%addr, "Leaderboard listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Leaderboard stopped");
    Ok(())
}

/// Serve a fresh board as configured until Ctrl-C.
///
/// # Errors
/// Returns an I/O error if binding or serving fails.
pub async fn serve(config: &ServerConfig) -> Result<()> {
    let state = AppState::new(Arc::new(Leaderboard::new()), config.top_n);
    let app = router(state, config);
    let (listener, _) = bind(config).await?;
    run(listener, app, async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(%error, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    })
    .await
}
