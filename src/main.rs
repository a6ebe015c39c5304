//! BTC Market Viewer — Entry Point
//!
//! Polls the configured price endpoint on a fixed period and keeps a
//! single status line on stdout up to date. Runs until SIGINT.
//!
//! Wiring sequence:
//! 1. Load config.toml (path from argv[1]) + validate
//! 2. Init tracing (JSON structured logging on stderr)
//! 3. Create CoinGecko price source + simulated indicator generator
//! 4. Create MarketSnapshotFetcher and PollScheduler
//! 5. Start the scheduler (console redraw + metrics per cycle)
//! 6. Spawn status server (/live, /ready, /snapshot) and metrics server
//! 7. Wait for SIGINT → stop scheduler → broadcast shutdown → exit

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use btc_market_viewer::adapters::console::ConsoleRenderer;
use btc_market_viewer::adapters::features::SimulatedFeatureGenerator;
use btc_market_viewer::adapters::feeds::CoinGeckoPriceSource;
use btc_market_viewer::adapters::metrics::{HealthServer, MetricsRegistry};
use btc_market_viewer::config;
use btc_market_viewer::usecases::{MarketSnapshotFetcher, PollScheduler};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config = config::loader::load_config(&config_path)
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.viewer.log_level)),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    info!(
        name = %config.viewer.name,
        version = env!("CARGO_PKG_VERSION"),
        endpoint = %config.feed.endpoint_url,
        period_ms = config.feed.period_ms,
        "Starting BTC Market Viewer"
    );

    // ── 3. Shutdown signal channel ──────────────────────────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);

    // ── 4. Price source + indicator strategy ────────────────
    let source = Arc::new(
        CoinGeckoPriceSource::new(&config.feed).context("Failed to create price source")?,
    );
    let features = Arc::new(
        SimulatedFeatureGenerator::new(config.features.clone())
            .context("Failed to create feature generator")?,
    );
    let fetcher = Arc::new(MarketSnapshotFetcher::new(source, features));

    // ── 5. Metrics registry ─────────────────────────────────
    let metrics = if config.metrics.enabled {
        Some(Arc::new(
            MetricsRegistry::new().context("Failed to create metrics registry")?,
        ))
    } else {
        None
    };

    // ── 6. Start the poll scheduler ─────────────────────────
    let scheduler = PollScheduler::new(fetcher, config.feed.fetch_timeout());
    let renderer = ConsoleRenderer::new(config.viewer.asset_label.clone());
    let cycle_metrics = metrics.clone();

    scheduler
        .start(config.feed.period(), move |state| {
            if let Some(m) = &cycle_metrics {
                m.observe(state);
            }
            if let Err(e) = renderer.redraw(state) {
                warn!(error = %e, "Failed to write status line");
            }
        })
        .context("Failed to start poll scheduler")?;

    // ── 7. Spawn status + metrics servers ───────────────────
    let status_server = HealthServer::new(scheduler.subscribe(), config.metrics.health_port);
    let status_shutdown = shutdown_tx.subscribe();
    let status_handle = tokio::spawn(async move {
        if let Err(e) = status_server.run(status_shutdown).await {
            error!(error = %e, "Status server failed");
        }
    });

    let metrics_handle = metrics.map(|m| {
        let bind = config.metrics.bind_address.clone();
        let metrics_shutdown = shutdown_tx.subscribe();
        tokio::spawn(async move {
            if let Err(e) = m.serve(bind, metrics_shutdown).await {
                error!(error = %e, "Metrics server failed");
            }
        })
    });

    info!("Viewer running, press Ctrl-C to exit");

    // ── 8. Wait for SIGINT ──────────────────────────────────
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C, shutting down");
    }
    println!();
    info!("SIGINT received, initiating graceful shutdown");

    // ── Graceful shutdown ───────────────────────────────────

    // 1. No further cycles or redraws
    scheduler.stop();

    // 2. Signal servers to stop
    let _ = shutdown_tx.send(());

    // 3. Let an in-flight fetch drain (bounded by the fetch timeout)
    let drain = config.feed.fetch_timeout() + Duration::from_secs(1);
    if tokio::time::timeout(drain, scheduler.wait()).await.is_err() {
        warn!("Poll loop did not exit in time");
    }

    // 4. Wait for servers to close (up to 5s)
    let _ = tokio::time::timeout(Duration::from_secs(5), status_handle).await;
    if let Some(handle) = metrics_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }

    let last = scheduler.current();
    info!(cycles = last.cycle_count, "Shutdown complete");
    Ok(())
}
