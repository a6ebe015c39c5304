//! Error taxonomy for the viewer core.
//!
//! `FetchError` is cycle-local and always recovered by the scheduler.
//! `ConfigError` is fatal and surfaces before any cycle runs.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Failure of a single snapshot fetch.
///
/// Stored verbatim in `PollState::last_error`, so it is cheap to clone
/// and carries rendered reasons instead of transport error types.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchError {
    /// Connection refused, DNS failure, timeout, or truncated body.
    #[error("price source unreachable: {reason}")]
    NetworkUnavailable { reason: String },

    /// Body arrived but the price field is missing, non-numeric or out of range.
    #[error("malformed price response: {reason}")]
    MalformedResponse { reason: String },

    /// Upstream answered with a non-success HTTP status.
    #[error("unexpected HTTP status {status}")]
    UnexpectedStatus { status: u16 },
}

impl FetchError {
    pub fn network(reason: impl Into<String>) -> Self {
        Self::NetworkUnavailable {
            reason: reason.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }

    /// A fetch that did not complete within its budget.
    pub fn timed_out(after: Duration) -> Self {
        Self::network(format!("fetch timed out after {}ms", after.as_millis()))
    }

    /// Stable label used for metrics and log fields.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NetworkUnavailable { .. } => "network_unavailable",
            Self::MalformedResponse { .. } => "malformed_response",
            Self::UnexpectedStatus { .. } => "unexpected_status",
        }
    }
}

/// Invalid configuration detected at construction time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("poll period must be positive")]
    ZeroPeriod,

    #[error("fetch timeout {timeout:?} must be positive and not exceed the poll period {period:?}")]
    FetchTimeout { timeout: Duration, period: Duration },

    #[error("fetch timeout {timeout:?} is below the configured minimum {min:?}")]
    FetchTimeoutTooShort { timeout: Duration, min: Duration },

    #[error("invalid endpoint url {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("invalid feature bounds: {0}")]
    FeatureBounds(String),
}

/// Lifecycle misuse of the poll scheduler.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("scheduler is already running")]
    AlreadyRunning,

    /// `Stopped` is terminal; a new scheduler is required.
    #[error("scheduler has been stopped and cannot be restarted")]
    Stopped,

    #[error("no Tokio runtime available to drive the poll loop")]
    NoRuntime,
}
