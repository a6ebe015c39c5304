//! Status Server - Liveness, Readiness and Snapshot Endpoints
//!
//! Exposes /live, /ready and /snapshot via axum 0.7. Readiness
//! flips to 200 once a first snapshot exists; /snapshot serves the
//! current `PollState` as JSON for a browser dashboard.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tokio::sync::{broadcast, watch};
use tracing::{info, instrument};

use crate::domain::poll_state::PollState;

/// Axum-based status HTTP server.
///
/// Reads the scheduler's state through a watch receiver; it never
/// triggers a fetch itself.
pub struct HealthServer {
    /// Latest poll state published by the scheduler.
    state_rx: watch::Receiver<PollState>,
    /// Bind port (default 8080 from config).
    port: u16,
}

impl HealthServer {
    /// Create a new status server.
    pub const fn new(state_rx: watch::Receiver<PollState>, port: u16) -> Self {
        Self { state_rx, port }
    }

    /// Routes served by this server.
    pub fn router(state_rx: watch::Receiver<PollState>) -> Router {
        Router::new()
            .route("/live", get(Self::liveness))
            .route("/ready", get(Self::readiness))
            .route("/snapshot", get(Self::snapshot))
            .with_state(state_rx)
    }

    /// Run until the shutdown signal fires.
    ///
    /// # Errors
    /// Fails if the port cannot be bound or the server stops abnormally.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) -> anyhow::Result<()> {
        let app = Self::router(self.state_rx);

        let addr = format!("0.0.0.0:{}", self.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!(address = %addr, "Status server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }

    /// Liveness probe: always returns 200 if the process is running.
    async fn liveness() -> impl IntoResponse {
        (StatusCode::OK, "OK")
    }

    /// Readiness probe: 200 once any snapshot has been fetched.
    async fn readiness(State(rx): State<watch::Receiver<PollState>>) -> impl IntoResponse {
        if rx.borrow().is_loading() {
            (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
        } else {
            (StatusCode::OK, "READY")
        }
    }

    /// Current poll state as JSON.
    async fn snapshot(State(rx): State<watch::Receiver<PollState>>) -> Json<PollState> {
        let state = rx.borrow().clone();
        Json(state)
    }
}
