//! Feature Generator Port - Indicator Strategy
//!
//! The indicator values attached to a snapshot come from a pluggable
//! strategy. Today that is a simulated generator; a real data source
//! can replace it without touching the snapshot fetcher.

use crate::domain::snapshot::FeatureSet;

/// Produces a complete indicator mapping for one snapshot.
pub trait FeatureGenerator: Send + Sync + 'static {
  fn generate(&self) -> FeatureSet;
}

impl<F> FeatureGenerator for F
where
  F: Fn() -> FeatureSet + Send + Sync + 'static,
{
  fn generate(&self) -> FeatureSet {
    self()
  }
}
