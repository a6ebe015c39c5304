//! CoinGecko Simple Price Feed - Polled BTC/USD Spot Price
//!
//! Issues one GET per call against the public `/simple/price`
//! endpoint and extracts the price nested as
//! `{"<coin_id>": {"<vs_currency>": <number>}}`. Unauthenticated,
//! no retries: a failed request is reported and the scheduler tries
//! again on its next tick.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::FeedConfig;
use crate::config::loader::validate_endpoint;
use crate::domain::errors::{ConfigError, FetchError};
use crate::ports::price_source::PriceSource;

/// HTTP price source for CoinGecko-style simple price responses.
pub struct CoinGeckoPriceSource {
    /// Underlying HTTP client (request timeout baked in).
    http: Client,
    /// Fully-qualified price URL.
    endpoint: Url,
    /// Top-level response key, e.g. "bitcoin".
    coin_id: String,
    /// Nested response key, e.g. "usd".
    vs_currency: String,
}

impl CoinGeckoPriceSource {
    /// Create a price source from feed configuration.
    ///
    /// # Errors
    /// `ConfigError::InvalidEndpoint` if the URL is unusable or the HTTP
    /// client cannot be built.
    pub fn new(config: &FeedConfig) -> Result<Self, ConfigError> {
        Self::with_endpoint(
            &config.endpoint_url,
            &config.coin_id,
            &config.vs_currency,
            config.fetch_timeout(),
        )
    }

    /// Create a price source for an explicit endpoint and response keys.
    ///
    /// # Errors
    /// `ConfigError::InvalidEndpoint` or `ConfigError::Empty`.
    pub fn with_endpoint(
        endpoint_url: &str,
        coin_id: &str,
        vs_currency: &str,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let endpoint = validate_endpoint(endpoint_url)?;

        if coin_id.is_empty() {
            return Err(ConfigError::Empty { field: "coin_id" });
        }
        if vs_currency.is_empty() {
            return Err(ConfigError::Empty {
                field: "vs_currency",
            });
        }

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .pool_max_idle_per_host(1)
            .build()
            .map_err(|e| ConfigError::InvalidEndpoint {
                url: endpoint_url.to_string(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            endpoint,
            coin_id: coin_id.to_string(),
            vs_currency: vs_currency.to_string(),
        })
    }

    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl PriceSource for CoinGeckoPriceSource {
    #[instrument(skip(self))]
    async fn fetch_price(&self) -> Result<f64, FetchError> {
        let response = self
            .http
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        // Status first: an error page is never reported as a malformed price.
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| transport_error(&e))?;
        let price = parse_price(&body, &self.coin_id, &self.vs_currency)?;

        debug!(endpoint = %self.endpoint, price, "Price received");
        Ok(price)
    }

    fn name(&self) -> &str {
        "coingecko"
    }
}

/// Map a reqwest failure onto the fetch taxonomy.
fn transport_error(err: &reqwest::Error) -> FetchError {
    if err.is_decode() {
        FetchError::malformed(err.to_string())
    } else if err.is_timeout() {
        FetchError::network(format!("request timed out: {err}"))
    } else {
        FetchError::network(err.to_string())
    }
}

/// Extract `body[coin_id][vs_currency]` as a positive finite number.
///
/// # Errors
/// `FetchError::MalformedResponse` for invalid JSON, a missing key,
/// a non-numeric value, or a non-positive price.
pub fn parse_price(body: &str, coin_id: &str, vs_currency: &str) -> Result<f64, FetchError> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| FetchError::malformed(format!("invalid JSON: {e}")))?;

    let quote = json
        .get(coin_id)
        .ok_or_else(|| FetchError::malformed(format!("missing \"{coin_id}\" object")))?;

    let price = quote
        .get(vs_currency)
        .ok_or_else(|| FetchError::malformed(format!("missing \"{coin_id}.{vs_currency}\" field")))?
        .as_f64()
        .ok_or_else(|| FetchError::malformed(format!("\"{coin_id}.{vs_currency}\" is not a number")))?;

    if !price.is_finite() || price <= 0.0 {
        return Err(FetchError::malformed(format!(
            "\"{coin_id}.{vs_currency}\" must be positive, got {price}"
        )));
    }

    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_nested_field() {
        let price = parse_price(r#"{"bitcoin":{"usd":65000}}"#, "bitcoin", "usd").unwrap();
        assert!((price - 65_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_price_fractional() {
        let price = parse_price(r#"{"bitcoin":{"usd":64123.45}}"#, "bitcoin", "usd").unwrap();
        assert!((price - 64_123.45).abs() < 1e-9);
    }

    #[test]
    fn test_missing_currency_is_malformed() {
        let err = parse_price(r#"{"bitcoin":{}}"#, "bitcoin", "usd").unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse { .. }));
    }

    #[test]
    fn test_missing_coin_is_malformed() {
        let err = parse_price(r#"{"ethereum":{"usd":3000}}"#, "bitcoin", "usd").unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse { .. }));
    }

    #[test]
    fn test_string_price_is_malformed() {
        let err = parse_price(r#"{"bitcoin":{"usd":"65000"}}"#, "bitcoin", "usd").unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse { .. }));
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = parse_price("<html>rate limited</html>", "bitcoin", "usd").unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse { .. }));
    }

    #[test]
    fn test_negative_price_is_malformed() {
        let err = parse_price(r#"{"bitcoin":{"usd":-5}}"#, "bitcoin", "usd").unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse { .. }));
    }

    #[test]
    fn test_rejects_non_http_endpoint() {
        let result = CoinGeckoPriceSource::with_endpoint(
            "file:///etc/passwd",
            "bitcoin",
            "usd",
            Duration::from_secs(1),
        );
        assert!(matches!(result, Err(ConfigError::InvalidEndpoint { .. })));
    }
}
