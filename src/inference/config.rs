//! Pipeline configuration

use crate::training::TrainingConfig;
use serde::{Deserialize, Serialize};

/// Default upper bound applied to the efficiency output, in percent
pub const DEFAULT_EFFICIENCY_CAP: f64 = 80.0;

/// A usable cap is finite and not negative
pub fn is_valid_efficiency_cap(cap: f64) -> bool {
    cap.is_finite() && cap >= 0.0
}

/// Configuration for fitting and serving the prediction pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Estimator hyper-parameters
    pub training: TrainingConfig,

    /// Efficiency is clamped to `[0, efficiency_cap]` after rounding
    pub efficiency_cap: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            training: TrainingConfig::default(),
            efficiency_cap: DEFAULT_EFFICIENCY_CAP,
        }
    }
}

impl PipelineConfig {
    pub fn with_training(mut self, training: TrainingConfig) -> Self {
        self.training = training;
        self
    }

    pub fn with_efficiency_cap(mut self, cap: f64) -> Self {
        self.efficiency_cap = cap;
        self
    }
}
