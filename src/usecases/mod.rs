//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain types with port interfaces to implement
//! the viewer's refresh workflow.
//!
//! Use cases:
//! - `MarketSnapshotFetcher`: One price request + indicators into a snapshot
//! - `PollScheduler`: Fixed-period refresh loop owning `PollState`

pub mod poll_scheduler;
pub mod snapshot_fetcher;

pub use poll_scheduler::{PollScheduler, SchedulerPhase};
pub use snapshot_fetcher::MarketSnapshotFetcher;
