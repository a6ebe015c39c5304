//! Snapshot Fetcher - Price + Indicators to MarketSnapshot
//!
//! Combines one `PriceSource` request with one `FeatureGenerator`
//! draw into an immutable `MarketSnapshot`. Holds no state between
//! invocations; every call performs exactly one upstream request.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, instrument};

use crate::domain::errors::FetchError;
use crate::domain::snapshot::MarketSnapshot;
use crate::ports::feature_generator::FeatureGenerator;
use crate::ports::price_source::PriceSource;
use crate::ports::snapshot_fetcher::SnapshotFetcher;

/// Default `SnapshotFetcher` built from the two leaf ports.
pub struct MarketSnapshotFetcher {
  /// Upstream spot price.
  source: Arc<dyn PriceSource>,
  /// Indicator strategy (simulated today).
  features: Arc<dyn FeatureGenerator>,
}

impl MarketSnapshotFetcher {
  /// Create a fetcher from a price source and an indicator strategy.
  pub fn new(source: Arc<dyn PriceSource>, features: Arc<dyn FeatureGenerator>) -> Self {
    Self { source, features }
  }
}

#[async_trait]
impl SnapshotFetcher for MarketSnapshotFetcher {
  #[instrument(skip(self))]
  async fn fetch_once(&self) -> Result<MarketSnapshot, FetchError> {
    let price = self.source.fetch_price().await?;
    let fetched_at = Utc::now();

    let features = self.features.generate();
    let snapshot = MarketSnapshot::try_new(price, features, fetched_at)?;

    debug!(
      source = self.source.name(),
      price,
      fetched_at = %fetched_at,
      "Snapshot assembled"
    );
    Ok(snapshot)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicU32, Ordering};

  use super::*;
  use crate::domain::snapshot::{Feature, FeatureSet};

  /// Price source replaying a fixed outcome and counting requests.
  struct ScriptedSource {
    outcome: Result<f64, FetchError>,
    calls: AtomicU32,
  }

  #[async_trait]
  impl PriceSource for ScriptedSource {
    async fn fetch_price(&self) -> Result<f64, FetchError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      self.outcome.clone()
    }

    fn name(&self) -> &str {
      "scripted"
    }
  }

  fn fetcher(outcome: Result<f64, FetchError>) -> (MarketSnapshotFetcher, Arc<ScriptedSource>) {
    let source = Arc::new(ScriptedSource {
      outcome,
      calls: AtomicU32::new(0),
    });
    let features = Arc::new(|| FeatureSet::from_fn(|_| 0.5));
    (MarketSnapshotFetcher::new(source.clone(), features), source)
  }

  #[tokio::test]
  async fn test_success_builds_full_snapshot() {
    let (fetcher, source) = fetcher(Ok(65_000.0));
    let before = Utc::now();

    let snapshot = fetcher.fetch_once().await.unwrap();

    assert!((snapshot.price() - 65_000.0).abs() < f64::EPSILON);
    assert_eq!(snapshot.features().iter().count(), Feature::COUNT);
    assert!(snapshot.fetched_at() >= before);
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_source_error_passes_through() {
    let (fetcher, _) = fetcher(Err(FetchError::UnexpectedStatus { status: 502 }));
    let err = fetcher.fetch_once().await.unwrap_err();
    assert_eq!(err, FetchError::UnexpectedStatus { status: 502 });
  }

  #[tokio::test]
  async fn test_zero_price_is_malformed() {
    let (fetcher, _) = fetcher(Ok(0.0));
    let err = fetcher.fetch_once().await.unwrap_err();
    assert!(matches!(err, FetchError::MalformedResponse { .. }));
  }

  #[tokio::test]
  async fn test_one_request_per_invocation() {
    let (fetcher, source) = fetcher(Ok(1.0));
    for _ in 0..3 {
      let _ = fetcher.fetch_once().await;
    }
    assert_eq!(source.calls.load(Ordering::SeqCst), 3);
  }
}
