//! Domain layer - Core value types of the viewer.
//!
//! Pure data and state transitions: snapshots, the poll state read
//! model, and the error taxonomy. No I/O happens here.

pub mod errors;
pub mod poll_state;
pub mod snapshot;

// Re-export core types for convenience
pub use errors::{ConfigError, FetchError, SchedulerError};
pub use poll_state::PollState;
pub use snapshot::{Feature, FeatureSet, MarketSnapshot};
