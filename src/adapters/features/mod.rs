//! Indicator Strategy Adapters
//!
//! - `SimulatedFeatureGenerator`: random sentiment/volume, constant macro indicators
//! - `FixedFeatureGenerator`: the same values every call (tests, replays)

pub mod simulated;

pub use simulated::SimulatedFeatureGenerator;

use crate::domain::snapshot::FeatureSet;
use crate::ports::feature_generator::FeatureGenerator;

/// Generator returning one fixed indicator set.
#[derive(Debug, Clone, Copy)]
pub struct FixedFeatureGenerator(pub FeatureSet);

impl FeatureGenerator for FixedFeatureGenerator {
    fn generate(&self) -> FeatureSet {
        self.0
    }
}
