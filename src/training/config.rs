//! Training configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PredictorError;

/// Type of model to train
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelType {
    /// Random Forest
    RandomForest,
    /// K-Nearest Neighbors
    KNN,
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelType::RandomForest => f.write_str("random_forest"),
            ModelType::KNN => f.write_str("knn"),
        }
    }
}

impl FromStr for ModelType {
    type Err = PredictorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "random_forest" | "rf" => Ok(ModelType::RandomForest),
            "knn" | "k_nearest" => Ok(ModelType::KNN),
            other => Err(PredictorError::InvalidParameter {
                name: "model".to_string(),
                value: other.to_string(),
                reason: "expected random_forest or knn".to_string(),
            }),
        }
    }
}

/// Configuration for model training
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Model type to train
    pub model_type: ModelType,

    /// Random seed for reproducibility
    pub random_state: u64,

    // Tree-specific parameters
    /// Number of trees (for ensemble methods)
    pub n_estimators: usize,

    /// Maximum depth of trees
    pub max_depth: Option<usize>,

    /// Minimum samples to split a node
    pub min_samples_split: usize,

    /// Minimum samples per leaf
    pub min_samples_leaf: usize,

    // KNN parameters
    /// Number of neighbors
    pub n_neighbors: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            model_type: ModelType::RandomForest,
            random_state: 42,
            n_estimators: 200,
            max_depth: Some(10),
            min_samples_split: 3,
            min_samples_leaf: 1,
            n_neighbors: 5,
        }
    }
}

impl TrainingConfig {
    pub fn with_model_type(mut self, model_type: ModelType) -> Self {
        self.model_type = model_type;
        self
    }

    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }
}
