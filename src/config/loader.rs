//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use super::{AppConfig, FeatureConfig, FeedConfig};
use crate::domain::errors::ConfigError;

/// Smallest fetch timeout accepted from a configuration file.
pub const MIN_FETCH_TIMEOUT: Duration = Duration::from_secs(1);

/// Load and validate configuration from a TOML file.
///
/// A missing file is not an error: the built-in defaults are used
/// and still validated.
///
/// # Errors
/// Returns detailed error if:
/// - File exists but can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let config = if path.exists() {
    let content = std::fs::read_to_string(path)
      .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)?
  } else {
    info!(path = %path.display(), "Config file not found, using defaults");
    AppConfig::default()
  };

  validate_config(&config).context("Invalid configuration")?;

  info!(
    endpoint = %config.feed.endpoint_url,
    period_ms = config.feed.period_ms,
    fetch_timeout_ms = config.feed.fetch_timeout_ms,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse configuration from TOML text without validating it.
///
/// # Errors
/// Returns an error if the TOML is syntactically invalid or has wrong types.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  toml::from_str(content).context("Failed to parse config.toml")
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Non-empty identifiers and JSON keys
/// - A parseable http(s) endpoint
/// - Positive period with a timeout of at least one second that fits inside it
/// - Ordered indicator bounds and finite indicator constants
///
/// # Errors
/// The first violated rule as a `ConfigError`.
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
  if config.viewer.name.trim().is_empty() {
    return Err(ConfigError::Empty { field: "viewer.name" });
  }

  validate_feed(&config.feed)?;
  validate_features(&config.features)?;

  if config.metrics.enabled && config.metrics.bind_address.trim().is_empty() {
    return Err(ConfigError::Empty {
      field: "metrics.bind_address",
    });
  }

  Ok(())
}

fn validate_feed(feed: &FeedConfig) -> Result<(), ConfigError> {
  if feed.coin_id.is_empty() {
    return Err(ConfigError::Empty { field: "feed.coin_id" });
  }
  if feed.vs_currency.is_empty() {
    return Err(ConfigError::Empty {
      field: "feed.vs_currency",
    });
  }

  validate_endpoint(&feed.endpoint_url)?;
  validate_timing(feed.period(), feed.fetch_timeout())?;

  // Stricter than the scheduler, which accepts sub-second timeouts.
  if feed.fetch_timeout() < MIN_FETCH_TIMEOUT {
    return Err(ConfigError::FetchTimeoutTooShort {
      timeout: feed.fetch_timeout(),
      min: MIN_FETCH_TIMEOUT,
    });
  }
  Ok(())
}

/// Check that an endpoint URL parses and uses http or https.
///
/// # Errors
/// `ConfigError::InvalidEndpoint` describing the problem.
pub fn validate_endpoint(url: &str) -> Result<reqwest::Url, ConfigError> {
  let parsed = reqwest::Url::parse(url).map_err(|e| ConfigError::InvalidEndpoint {
    url: url.to_string(),
    reason: e.to_string(),
  })?;

  match parsed.scheme() {
    "http" | "https" => Ok(parsed),
    other => Err(ConfigError::InvalidEndpoint {
      url: url.to_string(),
      reason: format!("unsupported scheme {other:?}"),
    }),
  }
}

/// Check the poll period and fetch timeout pair.
///
/// # Errors
/// `ZeroPeriod` for an empty period, `FetchTimeout` when the timeout is
/// zero or longer than the period.
pub fn validate_timing(period: Duration, fetch_timeout: Duration) -> Result<(), ConfigError> {
  if period.is_zero() {
    return Err(ConfigError::ZeroPeriod);
  }
  if fetch_timeout.is_zero() || fetch_timeout > period {
    return Err(ConfigError::FetchTimeout {
      timeout: fetch_timeout,
      period,
    });
  }
  Ok(())
}

/// Check indicator bounds and constants.
///
/// # Errors
/// `ConfigError::FeatureBounds` for an unordered or out-of-range
/// sentiment interval, an empty volume range, or a non-finite constant.
pub fn validate_features(features: &FeatureConfig) -> Result<(), ConfigError> {
  // NaN never falls inside the interval.
  let in_unit = |v: f64| (-1.0..=1.0).contains(&v);

  if !(in_unit(features.sentiment_min)
    && in_unit(features.sentiment_max)
    && features.sentiment_min <= features.sentiment_max)
  {
    return Err(ConfigError::FeatureBounds(format!(
      "sentiment range [{}, {}] must be ordered and inside [-1, 1]",
      features.sentiment_min, features.sentiment_max
    )));
  }

  if features.volume_min == 0 || features.volume_min >= features.volume_max {
    return Err(ConfigError::FeatureBounds(format!(
      "volume range [{}, {}) must be non-empty and start at 1 or above",
      features.volume_min, features.volume_max
    )));
  }

  if let Some((name, value)) = features
    .constants()
    .into_iter()
    .find(|(_, value)| !value.is_finite())
  {
    return Err(ConfigError::FeatureBounds(format!(
      "{name} must be a finite number, got {value}"
    )));
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_missing_file_uses_defaults() {
    let config = load_config("nonexistent.toml").unwrap();
    assert_eq!(config.feed.period_ms, 10_000);
    assert_eq!(config.feed.coin_id, "bitcoin");
  }

  #[test]
  fn test_partial_file_keeps_defaults() {
    let config = parse_config(
      r#"
      [feed]
      period_ms = 2000
      fetch_timeout_ms = 1500
      "#,
    )
    .unwrap();

    assert_eq!(config.feed.period_ms, 2_000);
    assert_eq!(config.feed.vs_currency, "usd");
    assert!((config.features.gold_price - 1925.4).abs() < f64::EPSILON);
    assert!(validate_config(&config).is_ok());
  }

  #[test]
  fn test_timeout_longer_than_period_rejected() {
    let err = validate_timing(Duration::from_secs(1), Duration::from_secs(2)).unwrap_err();
    assert!(matches!(err, ConfigError::FetchTimeout { .. }));
  }

  #[test]
  fn test_zero_period_rejected() {
    let err = validate_timing(Duration::ZERO, Duration::ZERO).unwrap_err();
    assert_eq!(err, ConfigError::ZeroPeriod);
  }

  #[test]
  fn test_endpoint_scheme_checked() {
    assert!(validate_endpoint("https://api.coingecko.com/api/v3/simple/price").is_ok());
    assert!(matches!(
      validate_endpoint("ftp://example.com/price"),
      Err(ConfigError::InvalidEndpoint { .. })
    ));
    assert!(validate_endpoint("not a url").is_err());
  }

  #[test]
  fn test_inverted_volume_range_rejected() {
    let mut config = AppConfig::default();
    config.features.volume_min = 1_000;
    config.features.volume_max = 100;
    assert!(matches!(
      validate_config(&config),
      Err(ConfigError::FeatureBounds(_))
    ));
  }

  #[test]
  fn test_sentiment_outside_unit_interval_rejected() {
    let mut config = AppConfig::default();
    config.features.sentiment_max = 2.0;
    assert!(validate_config(&config).is_err());
  }

  #[test]
  fn test_non_finite_constants_rejected() {
    let config = parse_config(
      r#"
      [features]
      inflation_rate = nan
      gold_price = inf
      "#,
    )
    .unwrap();

    let err = validate_config(&config).unwrap_err();
    assert!(
      matches!(&err, ConfigError::FeatureBounds(msg) if msg.contains("inflation_rate")),
      "unexpected error: {err}"
    );

    let mut config = AppConfig::default();
    config.features.usd_index = f64::NEG_INFINITY;
    assert!(matches!(
      validate_config(&config),
      Err(ConfigError::FeatureBounds(_))
    ));
  }

  #[test]
  fn test_nan_sentiment_bound_rejected() {
    let mut config = AppConfig::default();
    config.features.sentiment_min = f64::NAN;
    assert!(matches!(
      validate_features(&config.features),
      Err(ConfigError::FeatureBounds(_))
    ));
  }

  #[test]
  fn test_sub_second_timeout_rejected_in_file() {
    let config = parse_config(
      r#"
      [feed]
      period_ms = 2000
      fetch_timeout_ms = 500
      "#,
    )
    .unwrap();

    assert_eq!(
      validate_config(&config),
      Err(ConfigError::FetchTimeoutTooShort {
        timeout: Duration::from_millis(500),
        min: MIN_FETCH_TIMEOUT,
      })
    );
    // The scheduler-level rule still allows it.
    assert!(validate_timing(Duration::from_millis(2000), Duration::from_millis(500)).is_ok());
  }
}
