//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer
//! requires from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `PriceSource`: Upstream spot price request
//! - `FeatureGenerator`: Indicator values for a snapshot
//! - `SnapshotFetcher`: One complete fetch cycle, consumed by the scheduler

pub mod feature_generator;
pub mod price_source;
pub mod snapshot_fetcher;

pub use feature_generator::FeatureGenerator;
pub use price_source::PriceSource;
pub use snapshot_fetcher::SnapshotFetcher;
