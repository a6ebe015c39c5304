//! Market Data Feed Adapters - Polled Price Sources
//!
//! Provides HTTP-based spot price sources:
//! - CoinGecko: `/simple/price` endpoint, one request per poll cycle

pub mod coingecko;

pub use coingecko::CoinGeckoPriceSource;
