//! Prometheus Metrics Registry - Poll Loop Observability
//!
//! Registers and exposes Prometheus metrics for the viewer: cycle
//! outcomes, error kinds, the latest price and staleness.

use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use prometheus::{Encoder, Gauge, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};

use crate::domain::poll_state::PollState;

/// Centralized Prometheus metrics for the viewer.
///
/// All metrics follow the naming convention `viewer_*`.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Completed poll cycles by outcome (success / failure).
    pub poll_cycles: IntCounterVec,
    /// Failed cycles by `FetchError` kind.
    pub fetch_errors: IntCounterVec,
    /// Price from the latest good snapshot.
    pub price: Gauge,
    /// Unix timestamp (seconds) of the latest good snapshot.
    pub last_success_ts: Gauge,
    /// 1 while the latest cycle failed with data on screen.
    pub stale: IntGauge,
    /// Failures since the last success.
    pub consecutive_failures: IntGauge,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    ///
    /// # Errors
    /// Fails if a metric definition is invalid or registered twice.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let poll_cycles = IntCounterVec::new(
            Opts::new("viewer_poll_cycles_total", "Completed poll cycles"),
            &["outcome"],
        )?;

        let fetch_errors = IntCounterVec::new(
            Opts::new("viewer_fetch_errors_total", "Failed fetches by error kind"),
            &["kind"],
        )?;

        let price = Gauge::new("viewer_price", "Price from the latest good snapshot")?;

        let last_success_ts = Gauge::new(
            "viewer_last_success_timestamp_seconds",
            "Unix time of the latest good snapshot",
        )?;

        let stale = IntGauge::new(
            "viewer_stale",
            "Whether the displayed snapshot is stale (1=yes, 0=no)",
        )?;

        let consecutive_failures = IntGauge::new(
            "viewer_consecutive_failures",
            "Failed poll cycles since the last success",
        )?;

        registry.register(Box::new(poll_cycles.clone()))?;
        registry.register(Box::new(fetch_errors.clone()))?;
        registry.register(Box::new(price.clone()))?;
        registry.register(Box::new(last_success_ts.clone()))?;
        registry.register(Box::new(stale.clone()))?;
        registry.register(Box::new(consecutive_failures.clone()))?;

        Ok(Self {
            registry,
            poll_cycles,
            fetch_errors,
            price,
            last_success_ts,
            stale,
            consecutive_failures,
        })
    }

    /// Record one committed cycle.
    pub fn observe(&self, state: &PollState) {
        match &state.last_error {
            None => self.poll_cycles.with_label_values(&["success"]).inc(),
            Some(e) => {
                self.poll_cycles.with_label_values(&["failure"]).inc();
                self.fetch_errors.with_label_values(&[e.kind()]).inc();
            }
        }

        if let Some(snapshot) = &state.last_good {
            self.price.set(snapshot.price());
            #[allow(clippy::cast_precision_loss)]
            let fetched_secs = snapshot.fetched_at().timestamp_millis() as f64 / 1000.0;
            self.last_success_ts.set(fetched_secs);
        }

        self.stale.set(i64::from(state.is_stale()));
        self.consecutive_failures
            .set(i64::from(state.consecutive_failures));
    }

    /// Encode all metrics in the Prometheus text format.
    ///
    /// # Errors
    /// Fails if encoding or UTF-8 conversion fails.
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Serve Prometheus metrics on the configured bind address.
    ///
    /// # Errors
    /// Fails if the listener cannot bind or the server stops abnormally.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn serve(
        self: Arc<Self>,
        bind_address: String,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let metrics_self = Arc::clone(&self);

        let app = Router::new().route(
            "/metrics",
            get(move || {
                let metrics = Arc::clone(&metrics_self);
                async move {
                    metrics.render().map_err(|e| {
                        warn!(error = %e, "Failed to encode metrics");
                        StatusCode::INTERNAL_SERVER_ERROR
                    })
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind(&bind_address).await?;
        info!(address = %bind_address, "Prometheus metrics server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}
