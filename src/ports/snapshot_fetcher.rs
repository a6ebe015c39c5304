//! Snapshot Fetcher Port - One Cycle's Worth of Market Data
//!
//! The poll scheduler depends only on this trait, so tests can drive
//! it with scripted outcomes and the HTTP stack stays an adapter detail.

use async_trait::async_trait;

use crate::domain::errors::FetchError;
use crate::domain::snapshot::MarketSnapshot;

/// Produces exactly one snapshot (or failure) per invocation.
///
/// Implementors hold no state between calls.
#[async_trait]
pub trait SnapshotFetcher: Send + Sync + 'static {
  /// Run one fetch.
  ///
  /// # Errors
  /// Any `FetchError`; all variants are non-fatal to the caller.
  async fn fetch_once(&self) -> Result<MarketSnapshot, FetchError>;
}
