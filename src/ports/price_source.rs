//! Price Source Port - Upstream Spot Price Interface
//!
//! Abstracts the single outbound request made per fetch cycle.
//! Adapters own the transport (HTTP, test doubles) and must map
//! every failure onto a `FetchError` variant instead of panicking.

use async_trait::async_trait;

use crate::domain::errors::FetchError;

/// Trait for spot price providers.
///
/// One call equals exactly one upstream request. No retries: the
/// scheduler's fixed period is the only backoff.
#[async_trait]
pub trait PriceSource: Send + Sync + 'static {
  /// Fetch the current price in the source's quote currency.
  ///
  /// # Errors
  /// - `NetworkUnavailable` on connect failure or timeout
  /// - `UnexpectedStatus` on a non-2xx response
  /// - `MalformedResponse` when the price field is missing or non-numeric
  async fn fetch_price(&self) -> Result<f64, FetchError>;

  /// Short identifier for logs and metrics (e.g. "coingecko").
  fn name(&self) -> &str;
}
