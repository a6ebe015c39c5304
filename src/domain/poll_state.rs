//! Poll state - the read model exposed to renderers.
//!
//! The scheduler never mutates a published `PollState`; each cycle
//! derives the next value with `advance` and swaps it in whole.

use serde::Serialize;
use tracing::warn;

use super::errors::FetchError;
use super::snapshot::MarketSnapshot;

/// Latest known view of the market for consumers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PollState {
    /// Most recent successful snapshot. Never cleared by a failure.
    pub last_good: Option<MarketSnapshot>,
    /// Error from the most recent cycle, if it failed.
    pub last_error: Option<FetchError>,
    /// Completed cycles, success or failure.
    pub cycle_count: u64,
    /// Failed cycles since the last success.
    pub consecutive_failures: u32,
}

impl PollState {
    /// Derive the state that follows one completed cycle.
    #[must_use]
    pub fn advance(&self, outcome: Result<MarketSnapshot, FetchError>) -> Self {
        let cycle_count = self.cycle_count + 1;

        match outcome {
            Ok(snapshot) => {
                let last_good = match &self.last_good {
                    Some(prev) if snapshot.fetched_at() < prev.fetched_at() => {
                        warn!(
                            previous = %prev.fetched_at(),
                            incoming = %snapshot.fetched_at(),
                            "Discarding snapshot older than the current one"
                        );
                        Some(prev.clone())
                    }
                    _ => Some(snapshot),
                };

                Self {
                    last_good,
                    last_error: None,
                    cycle_count,
                    consecutive_failures: 0,
                }
            }
            Err(error) => Self {
                last_good: self.last_good.clone(),
                last_error: Some(error),
                cycle_count,
                consecutive_failures: self.consecutive_failures.saturating_add(1),
            },
        }
    }

    /// No snapshot has ever been fetched.
    pub const fn is_loading(&self) -> bool {
        self.last_good.is_none()
    }

    /// Data is available but the latest cycle failed.
    pub const fn is_stale(&self) -> bool {
        self.last_good.is_some() && self.last_error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::domain::snapshot::FeatureSet;

    fn snapshot_at(price: f64, offset_secs: i64) -> MarketSnapshot {
        let at = Utc::now() + Duration::seconds(offset_secs);
        MarketSnapshot::try_new(price, FeatureSet::from_fn(|_| 1.0), at).unwrap()
    }

    #[test]
    fn test_initial_state_is_loading() {
        let state = PollState::default();
        assert!(state.is_loading());
        assert!(!state.is_stale());
        assert_eq!(state.cycle_count, 0);
    }

    #[test]
    fn test_success_replaces_snapshot_and_clears_error() {
        let failed = PollState::default().advance(Err(FetchError::network("down")));
        let next = failed.advance(Ok(snapshot_at(65_000.0, 0)));

        assert_eq!(next.cycle_count, 2);
        assert!(next.last_error.is_none());
        assert_eq!(next.consecutive_failures, 0);
        assert!((next.last_good.unwrap().price() - 65_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_failure_keeps_last_good() {
        let good = PollState::default().advance(Ok(snapshot_at(64_000.0, 0)));
        let stale = good.advance(Err(FetchError::UnexpectedStatus { status: 500 }));

        assert_eq!(stale.last_good, good.last_good);
        assert_eq!(
            stale.last_error,
            Some(FetchError::UnexpectedStatus { status: 500 })
        );
        assert!(stale.is_stale());
        assert_eq!(stale.consecutive_failures, 1);
    }

    #[test]
    fn test_older_snapshot_does_not_regress() {
        let newer = PollState::default().advance(Ok(snapshot_at(66_000.0, 10)));
        let next = newer.advance(Ok(snapshot_at(60_000.0, -10)));

        assert_eq!(next.last_good, newer.last_good);
        assert!(next.last_error.is_none());
        assert_eq!(next.cycle_count, 2);
    }

    #[test]
    fn test_failure_before_first_success_stays_loading() {
        let state = PollState::default().advance(Err(FetchError::malformed("no usd")));
        assert!(state.is_loading());
        assert!(!state.is_stale());
        assert!(state.last_error.is_some());
    }
}
