//! Model training module
//!
//! Regression estimators for the collector targets:
//! - Decision trees and Random Forests
//! - K-Nearest Neighbors
//! - A multi-output engine fitting one estimator per target

mod config;
mod engine;
mod models;
pub mod decision_tree;
pub mod random_forest;
pub mod knn;

pub use config::{TrainingConfig, ModelType};
pub use engine::{TrainEngine, TrainedModel};
pub use models::{Regressor, ModelMetrics};
pub use decision_tree::{DecisionTree, TreeNode};
pub use random_forest::RandomForest;
pub use knn::KNNRegressor;
