//! Configuration Module - TOML-based Viewer Configuration
//!
//! Loads and validates configuration from `config.toml`. Every field
//! has a default, so a partial (or absent) file yields a runnable
//! viewer pointed at the public CoinGecko price endpoint.

pub mod loader;

use std::time::Duration;

use serde::Deserialize;

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
  /// Viewer identity and logging.
  #[serde(default)]
  pub viewer: ViewerConfig,
  /// Upstream price feed and poll cadence.
  #[serde(default)]
  pub feed: FeedConfig,
  /// Simulated indicator bounds and constants.
  #[serde(default)]
  pub features: FeatureConfig,
  /// Metrics and status endpoints.
  #[serde(default)]
  pub metrics: MetricsConfig,
}

/// Viewer identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewerConfig {
  /// Human-readable viewer name.
  #[serde(default = "default_name")]
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Asset name shown on the console line.
  #[serde(default = "default_asset_label")]
  pub asset_label: String,
}

/// Price feed configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
  /// Full price endpoint URL including query string.
  #[serde(default = "default_endpoint_url")]
  pub endpoint_url: String,
  /// Top-level JSON key of the response (coin id).
  #[serde(default = "default_coin_id")]
  pub coin_id: String,
  /// Nested JSON key holding the price (quote currency).
  #[serde(default = "default_vs_currency")]
  pub vs_currency: String,
  /// Poll period (milliseconds).
  #[serde(default = "default_period_ms")]
  pub period_ms: u64,
  /// Per-request timeout (milliseconds). Must not exceed `period_ms`.
  #[serde(default = "default_fetch_timeout_ms")]
  pub fetch_timeout_ms: u64,
}

impl FeedConfig {
  pub const fn period(&self) -> Duration {
    Duration::from_millis(self.period_ms)
  }

  pub const fn fetch_timeout(&self) -> Duration {
    Duration::from_millis(self.fetch_timeout_ms)
  }
}

/// Simulated indicator configuration.
///
/// Sentiment and trading volume are drawn at random within these
/// bounds; every other indicator is a configured constant.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureConfig {
  #[serde(default = "default_sentiment_min")]
  pub sentiment_min: f64,
  #[serde(default = "default_sentiment_max")]
  pub sentiment_max: f64,
  /// Inclusive lower bound of trading volume.
  #[serde(default = "default_volume_min")]
  pub volume_min: u64,
  /// Exclusive upper bound of trading volume.
  #[serde(default = "default_volume_max")]
  pub volume_max: u64,
  #[serde(default = "default_inflation_rate")]
  pub inflation_rate: f64,
  #[serde(default = "default_interest_rate")]
  pub interest_rate: f64,
  #[serde(default)]
  pub regulatory_events: f64,
  #[serde(default = "default_mining_difficulty")]
  pub mining_difficulty: f64,
  #[serde(default)]
  pub halving_impact: f64,
  #[serde(default = "default_institutional_activity")]
  pub institutional_activity: f64,
  #[serde(default = "default_usd_index")]
  pub usd_index: f64,
  #[serde(default = "default_gold_price")]
  pub gold_price: f64,
  #[serde(default)]
  pub whale_transactions: f64,
  #[serde(default = "default_geopolitical_events")]
  pub geopolitical_events: f64,
  /// Fixed RNG seed for reproducible runs.
  pub seed: Option<u64>,
}

impl FeatureConfig {
  /// The constant indicators keyed by their config field name.
  pub const fn constants(&self) -> [(&'static str, f64); 10] {
    [
      ("inflation_rate", self.inflation_rate),
      ("interest_rate", self.interest_rate),
      ("regulatory_events", self.regulatory_events),
      ("mining_difficulty", self.mining_difficulty),
      ("halving_impact", self.halving_impact),
      ("institutional_activity", self.institutional_activity),
      ("usd_index", self.usd_index),
      ("gold_price", self.gold_price),
      ("whale_transactions", self.whale_transactions),
      ("geopolitical_events", self.geopolitical_events),
    ]
  }
}

/// Metrics and status endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Enable Prometheus metrics export.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Metrics server bind address.
  #[serde(default = "default_metrics_addr")]
  pub bind_address: String,
  /// Status (/live, /ready, /snapshot) port.
  #[serde(default = "default_health_port")]
  pub health_port: u16,
}

impl Default for ViewerConfig {
  fn default() -> Self {
    Self {
      name: default_name(),
      log_level: default_log_level(),
      asset_label: default_asset_label(),
    }
  }
}

impl Default for FeedConfig {
  fn default() -> Self {
    Self {
      endpoint_url: default_endpoint_url(),
      coin_id: default_coin_id(),
      vs_currency: default_vs_currency(),
      period_ms: default_period_ms(),
      fetch_timeout_ms: default_fetch_timeout_ms(),
    }
  }
}

impl Default for FeatureConfig {
  fn default() -> Self {
    Self {
      sentiment_min: default_sentiment_min(),
      sentiment_max: default_sentiment_max(),
      volume_min: default_volume_min(),
      volume_max: default_volume_max(),
      inflation_rate: default_inflation_rate(),
      interest_rate: default_interest_rate(),
      regulatory_events: 0.0,
      mining_difficulty: default_mining_difficulty(),
      halving_impact: 0.0,
      institutional_activity: default_institutional_activity(),
      usd_index: default_usd_index(),
      gold_price: default_gold_price(),
      whale_transactions: 0.0,
      geopolitical_events: default_geopolitical_events(),
      seed: None,
    }
  }
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      bind_address: default_metrics_addr(),
      health_port: default_health_port(),
    }
  }
}

// Default value functions for serde

fn default_name() -> String {
  "btc-market-viewer".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_asset_label() -> String {
  "Bitcoin".to_string()
}

fn default_endpoint_url() -> String {
  "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies=usd".to_string()
}

fn default_coin_id() -> String {
  "bitcoin".to_string()
}

fn default_vs_currency() -> String {
  "usd".to_string()
}

const fn default_period_ms() -> u64 {
  10_000
}

const fn default_fetch_timeout_ms() -> u64 {
  5_000
}

const fn default_sentiment_min() -> f64 {
  -1.0
}

const fn default_sentiment_max() -> f64 {
  1.0
}

const fn default_volume_min() -> u64 {
  100
}

const fn default_volume_max() -> u64 {
  1_000
}

const fn default_inflation_rate() -> f64 {
  3.2
}

const fn default_interest_rate() -> f64 {
  2.5
}

const fn default_mining_difficulty() -> f64 {
  18.5
}

const fn default_institutional_activity() -> f64 {
  0.3
}

const fn default_usd_index() -> f64 {
  103.5
}

const fn default_gold_price() -> f64 {
  1925.4
}

const fn default_geopolitical_events() -> f64 {
  1.0
}

const fn default_true() -> bool {
  true
}

fn default_metrics_addr() -> String {
  "0.0.0.0:9090".to_string()
}

const fn default_health_port() -> u16 {
  8080
}
