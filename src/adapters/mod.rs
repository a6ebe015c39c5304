//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP client, RNG, HTTP servers, stdout).
//! Each sub-module groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `feeds`: Upstream spot price sources (CoinGecko)
//! - `features`: Indicator strategies (simulated, fixed)
//! - `console`: Single-line terminal renderer
//! - `metrics`: Prometheus metrics export and status endpoints

pub mod console;
pub mod features;
pub mod feeds;
pub mod metrics;
