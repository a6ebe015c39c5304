//! Simulated Indicators - Mocked Live Feature Values
//!
//! Sentiment and trading volume are drawn at random within the
//! configured bounds; the macro indicators are configured constants.
//! These values are a stand-in, not market data.

use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::FeatureConfig;
use crate::config::loader::validate_features;
use crate::domain::errors::ConfigError;
use crate::domain::snapshot::{Feature, FeatureSet};
use crate::ports::feature_generator::FeatureGenerator;

/// Random-within-bounds indicator generator.
pub struct SimulatedFeatureGenerator {
    config: FeatureConfig,
    rng: Mutex<StdRng>,
}

impl SimulatedFeatureGenerator {
    /// Create a generator; seeded from `config.seed` when present.
    ///
    /// # Errors
    /// `ConfigError::FeatureBounds` if the bounds are unordered, out of
    /// range or non-finite.
    pub fn new(config: FeatureConfig) -> Result<Self, ConfigError> {
        validate_features(&config)?;

        let rng = config
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);

        Ok(Self {
            config,
            rng: Mutex::new(rng),
        })
    }
}

impl FeatureGenerator for SimulatedFeatureGenerator {
    fn generate(&self) -> FeatureSet {
        let c = &self.config;
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);

        // Bounds were validated in `new`: both ranges are non-empty.
        let sentiment = rng.random_range(c.sentiment_min..=c.sentiment_max);
        #[allow(clippy::cast_precision_loss)]
        let volume = rng.random_range(c.volume_min..c.volume_max) as f64;

        FeatureSet::from_fn(|feature| match feature {
            Feature::MarketSentiment => sentiment,
            Feature::TradingVolume => volume,
            Feature::InflationRate => c.inflation_rate,
            Feature::InterestRate => c.interest_rate,
            Feature::RegulatoryEvents => c.regulatory_events,
            Feature::MiningDifficulty => c.mining_difficulty,
            Feature::HalvingImpact => c.halving_impact,
            Feature::InstitutionalActivity => c.institutional_activity,
            Feature::UsdIndex => c.usd_index,
            Feature::GoldPrices => c.gold_price,
            Feature::WhaleTransactions => c.whale_transactions,
            Feature::GeopoliticalEvents => c.geopolitical_events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> SimulatedFeatureGenerator {
        SimulatedFeatureGenerator::new(FeatureConfig {
            seed: Some(seed),
            ..FeatureConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_random_values_within_bounds() {
        let generator = seeded(7);
        for _ in 0..500 {
            let set = generator.generate();
            let sentiment = set.get(Feature::MarketSentiment);
            let volume = set.get(Feature::TradingVolume);

            assert!((-1.0..=1.0).contains(&sentiment), "sentiment {sentiment}");
            assert!((100.0..1000.0).contains(&volume), "volume {volume}");
            assert!((volume.fract()).abs() < f64::EPSILON, "volume must be integral");
        }
    }

    #[test]
    fn test_constants_carried_through() {
        let set = seeded(1).generate();
        assert!((set.get(Feature::InflationRate) - 3.2).abs() < f64::EPSILON);
        assert!((set.get(Feature::InterestRate) - 2.5).abs() < f64::EPSILON);
        assert!((set.get(Feature::MiningDifficulty) - 18.5).abs() < f64::EPSILON);
        assert!((set.get(Feature::UsdIndex) - 103.5).abs() < f64::EPSILON);
        assert!((set.get(Feature::GoldPrices) - 1925.4).abs() < f64::EPSILON);
        assert!((set.get(Feature::GeopoliticalEvents) - 1.0).abs() < f64::EPSILON);
        assert!(set.get(Feature::WhaleTransactions).abs() < f64::EPSILON);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let a = seeded(42);
        let b = seeded(42);
        for _ in 0..10 {
            assert_eq!(a.generate(), b.generate());
        }
    }

    #[test]
    fn test_degenerate_sentiment_range() {
        let generator = SimulatedFeatureGenerator::new(FeatureConfig {
            sentiment_min: 0.25,
            sentiment_max: 0.25,
            seed: Some(3),
            ..FeatureConfig::default()
        })
        .unwrap();
        let set = generator.generate();
        assert!((set.get(Feature::MarketSentiment) - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unvalidated_bounds_rejected() {
        let inverted = SimulatedFeatureGenerator::new(FeatureConfig {
            sentiment_min: 0.5,
            sentiment_max: -0.5,
            ..FeatureConfig::default()
        });
        assert!(matches!(inverted, Err(ConfigError::FeatureBounds(_))));

        let non_finite = SimulatedFeatureGenerator::new(FeatureConfig {
            sentiment_max: f64::INFINITY,
            ..FeatureConfig::default()
        });
        assert!(matches!(non_finite, Err(ConfigError::FeatureBounds(_))));

        let empty_volume = SimulatedFeatureGenerator::new(FeatureConfig {
            volume_min: 500,
            volume_max: 500,
            ..FeatureConfig::default()
        });
        assert!(matches!(empty_volume, Err(ConfigError::FeatureBounds(_))));
    }
}
