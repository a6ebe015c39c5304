//! Market snapshot value types.
//!
//! A `MarketSnapshot` is built once per successful fetch and never
//! mutated afterwards. Its feature mapping is keyed by the closed
//! `Feature` enum, so the key set is fixed at compile time.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::errors::FetchError;

// ────────────────────────────────────────────
// Indicator keys
// ────────────────────────────────────────────

/// Named market indicators carried by every snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    /// Sentiment score in [-1, 1].
    MarketSentiment,
    /// Trading volume, a positive integer.
    TradingVolume,
    /// Inflation rate (%).
    InflationRate,
    /// Interest rate (%).
    InterestRate,
    /// Regulatory event flag (0/1).
    RegulatoryEvents,
    MiningDifficulty,
    /// Halving impact flag (0/1).
    HalvingImpact,
    InstitutionalActivity,
    UsdIndex,
    GoldPrices,
    /// Whale transaction flag (0/1).
    WhaleTransactions,
    /// Geopolitical event flag (0/1).
    GeopoliticalEvents,
}

impl Feature {
    /// Number of indicators in a snapshot.
    pub const COUNT: usize = 12;

    /// Every indicator, in display order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::MarketSentiment,
        Self::TradingVolume,
        Self::InflationRate,
        Self::InterestRate,
        Self::RegulatoryEvents,
        Self::MiningDifficulty,
        Self::HalvingImpact,
        Self::InstitutionalActivity,
        Self::UsdIndex,
        Self::GoldPrices,
        Self::WhaleTransactions,
        Self::GeopoliticalEvents,
    ];

    /// Wire name used in JSON output and the console line.
    pub const fn key(self) -> &'static str {
        match self {
            Self::MarketSentiment => "Market_Sentiment",
            Self::TradingVolume => "Trading_Volume",
            Self::InflationRate => "Inflation_Rate",
            Self::InterestRate => "Interest_Rate",
            Self::RegulatoryEvents => "Regulatory_Events",
            Self::MiningDifficulty => "Mining_Difficulty",
            Self::HalvingImpact => "Halving_Impact",
            Self::InstitutionalActivity => "Institutional_Activity",
            Self::UsdIndex => "USD_Index",
            Self::GoldPrices => "Gold_Prices",
            Self::WhaleTransactions => "Whale_Transactions",
            Self::GeopoliticalEvents => "Geopolitical_Events",
        }
    }

    /// Human-readable label ("Market Sentiment").
    pub fn label(self) -> String {
        self.key().replace('_', " ")
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Complete indicator mapping: one value per `Feature`, no more, no less.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureSet {
    values: [f64; Feature::COUNT],
}

impl FeatureSet {
    /// Build a set by evaluating `value_of` for every indicator.
    pub fn from_fn(mut value_of: impl FnMut(Feature) -> f64) -> Self {
        let mut values = [0.0; Feature::COUNT];
        for feature in Feature::ALL {
            values[feature.index()] = value_of(feature);
        }
        Self { values }
    }

    pub const fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    /// Copy of this set with one indicator replaced.
    #[must_use]
    pub fn with(mut self, feature: Feature, value: f64) -> Self {
        self.values[feature.index()] = value;
        self
    }

    /// Iterate `(feature, value)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL.into_iter().map(|f| (f, self.get(f)))
    }
}

impl Serialize for FeatureSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Feature::COUNT))?;
        for (feature, value) in self.iter() {
            map.serialize_entry(feature.key(), &value)?;
        }
        map.end()
    }
}

// ────────────────────────────────────────────
// Snapshot
// ────────────────────────────────────────────

/// Immutable result of one successful fetch cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSnapshot {
    price: f64,
    features: FeatureSet,
    fetched_at: DateTime<Utc>,
}

impl MarketSnapshot {
    /// Validate the price and assemble a snapshot.
    ///
    /// # Errors
    /// `FetchError::MalformedResponse` if `price` is not a positive finite number.
    pub fn try_new(
        price: f64,
        features: FeatureSet,
        fetched_at: DateTime<Utc>,
    ) -> Result<Self, FetchError> {
        if !price.is_finite() || price <= 0.0 {
            return Err(FetchError::malformed(format!(
                "price must be positive and finite, got {price}"
            )));
        }

        Ok(Self {
            price,
            features,
            fetched_at,
        })
    }

    pub const fn price(&self) -> f64 {
        self.price
    }

    pub const fn features(&self) -> &FeatureSet {
        &self.features
    }

    pub const fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_features() -> FeatureSet {
        FeatureSet::from_fn(|f| f.index() as f64)
    }

    #[test]
    fn test_feature_keys_are_unique() {
        let mut keys: Vec<_> = Feature::ALL.iter().map(|f| f.key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), Feature::COUNT);
    }

    #[test]
    fn test_label_replaces_underscores() {
        assert_eq!(Feature::MarketSentiment.label(), "Market Sentiment");
        assert_eq!(Feature::UsdIndex.label(), "USD Index");
    }

    #[test]
    fn test_with_replaces_single_value() {
        let set = sample_features().with(Feature::GoldPrices, 1925.4);
        assert!((set.get(Feature::GoldPrices) - 1925.4).abs() < f64::EPSILON);
        assert!((set.get(Feature::UsdIndex) - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_non_positive_price() {
        let now = Utc::now();
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = MarketSnapshot::try_new(bad, sample_features(), now).unwrap_err();
            assert!(matches!(err, FetchError::MalformedResponse { .. }));
        }
    }

    #[test]
    fn test_snapshot_serializes_all_feature_keys() {
        let snapshot = MarketSnapshot::try_new(65_000.0, sample_features(), Utc::now()).unwrap();
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["price"], 65_000.0);
        let features = json["features"].as_object().unwrap();
        assert_eq!(features.len(), Feature::COUNT);
        for feature in Feature::ALL {
            assert!(features.contains_key(feature.key()), "missing {feature}");
        }
    }
}
