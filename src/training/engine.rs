//! Training engine: one estimator per target column

use crate::error::{PredictorError, Result};
use super::knn::KNNRegressor;
use super::models::{ModelMetrics, Regressor};
use super::random_forest::RandomForest;
use super::{ModelType, TrainingConfig};
use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

/// Enum to hold trained model variants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrainedModel {
    RandomForestRegressor(RandomForest),
    KNNRegressor(KNNRegressor),
}

impl TrainedModel {
    /// Unfitted estimator built from the configuration
    pub fn from_config(config: &TrainingConfig) -> Self {
        match config.model_type {
            ModelType::RandomForest => {
                let mut rf = RandomForest::new(config.n_estimators)
                    .with_min_samples_split(config.min_samples_split)
                    .with_min_samples_leaf(config.min_samples_leaf)
                    .with_random_state(config.random_state);
                if let Some(depth) = config.max_depth {
                    rf = rf.with_max_depth(depth);
                }
                TrainedModel::RandomForestRegressor(rf)
            }
            ModelType::KNN => TrainedModel::KNNRegressor(KNNRegressor::new(config.n_neighbors)),
        }
    }

    fn as_regressor(&self) -> &dyn Regressor {
        match self {
            TrainedModel::RandomForestRegressor(m) => m,
            TrainedModel::KNNRegressor(m) => m,
        }
    }

    fn as_regressor_mut(&mut self) -> &mut dyn Regressor {
        match self {
            TrainedModel::RandomForestRegressor(m) => m,
            TrainedModel::KNNRegressor(m) => m,
        }
    }
}

impl Regressor for TrainedModel {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.as_regressor_mut().fit(x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.as_regressor().predict(x)
    }

    fn name(&self) -> &'static str {
        self.as_regressor().name()
    }
}

/// Multi-output training engine
///
/// Fits an independent estimator for every column of the target matrix and
/// stacks their predictions back into one column per target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainEngine {
    config: TrainingConfig,
    models: Vec<TrainedModel>,
    metrics: Vec<ModelMetrics>,
    training_time_secs: f64,
}

impl TrainEngine {
    /// Create a new training engine
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            models: Vec::new(),
            metrics: Vec::new(),
            training_time_secs: 0.0,
        }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        !self.models.is_empty()
    }

    pub fn n_targets(&self) -> usize {
        self.models.len()
    }

    /// In-sample metrics per target, in target order
    pub fn metrics(&self) -> &[ModelMetrics] {
        &self.metrics
    }

    pub fn training_time_secs(&self) -> f64 {
        self.training_time_secs
    }

    /// Fit one estimator per target column
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array2<f64>) -> Result<&mut Self> {
        if x.nrows() != y.nrows() {
            return Err(PredictorError::ShapeError {
                expected: format!("{} target rows", x.nrows()),
                actual: format!("{} target rows", y.nrows()),
            });
        }
        if y.ncols() == 0 {
            return Err(PredictorError::TrainingError("no target columns".to_string()));
        }

        let start = Instant::now();
        let config = &self.config;

        let targets: Vec<Array1<f64>> = y.axis_iter(Axis(1)).map(|col| col.to_owned()).collect();

        let models: Vec<TrainedModel> = targets
            .par_iter()
            .map(|target| -> Result<TrainedModel> {
                let mut model = TrainedModel::from_config(config);
                model.fit(x, target)?;
                Ok(model)
            })
            .collect::<Result<Vec<_>>>()?;

        let metrics = models
            .iter()
            .zip(&targets)
            .map(|(model, target)| -> Result<ModelMetrics> {
                let pred = model.predict(x)?;
                Ok(ModelMetrics::compute_regression(target, &pred))
            })
            .collect::<Result<Vec<_>>>()?;

        self.models = models;
        self.metrics = metrics;
        self.training_time_secs = start.elapsed().as_secs_f64();

        info!(
            model = %self.config.model_type,
            n_samples = x.nrows(),
            n_features = x.ncols(),
            n_targets = y.ncols(),
            training_time_secs = self.training_time_secs,
            "Model fitted"
        );

        Ok(self)
    }

    /// Predict every target; output shape is (n_samples, n_targets)
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if self.models.is_empty() {
            return Err(PredictorError::ModelNotFitted);
        }

        let mut out = Array2::<f64>::zeros((x.nrows(), self.models.len()));
        for (j, model) in self.models.iter().enumerate() {
            let pred = model.predict(x)?;
            out.column_mut(j).assign(&pred);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn data() -> (Array2<f64>, Array2<f64>) {
        let x = array![[1.0, 0.0], [2.0, 1.0], [3.0, 0.0], [4.0, 1.0], [5.0, 0.0], [6.0, 1.0]];
        let y = array![
            [10.0, 1.0],
            [20.0, 1.0],
            [30.0, 2.0],
            [40.0, 2.0],
            [50.0, 3.0],
            [60.0, 3.0]
        ];
        (x, y)
    }

    #[test]
    fn test_multi_output_forest() {
        let (x, y) = data();
        let mut engine = TrainEngine::new(TrainingConfig::default().with_n_estimators(20));
        engine.fit(&x, &y).unwrap();

        assert_eq!(engine.n_targets(), 2);
        assert_eq!(engine.metrics().len(), 2);

        let pred = engine.predict(&x).unwrap();
        assert_eq!(pred.dim(), (6, 2));
        assert!(engine.metrics()[0].r2 > 0.5);
    }

    #[test]
    fn test_multi_output_knn() {
        let (x, y) = data();
        let config = TrainingConfig::default().with_model_type(ModelType::KNN);
        let mut engine = TrainEngine::new(TrainingConfig { n_neighbors: 1, ..config });
        engine.fit(&x, &y).unwrap();

        let pred = engine.predict(&x).unwrap();
        assert_eq!(pred, y);
    }

    #[test]
    fn test_predict_before_fit() {
        let engine = TrainEngine::new(TrainingConfig::default());
        assert!(matches!(
            engine.predict(&array![[1.0, 2.0]]),
            Err(PredictorError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_row_mismatch() {
        let (x, _) = data();
        let mut engine = TrainEngine::new(TrainingConfig::default());
        let err = engine.fit(&x, &array![[1.0]]).unwrap_err();
        assert!(matches!(err, PredictorError::ShapeError { .. }));
    }

    #[test]
    fn test_serde_round_trip_preserves_predictions() {
        let (x, y) = data();
        let mut engine = TrainEngine::new(TrainingConfig::default().with_n_estimators(5));
        engine.fit(&x, &y).unwrap();

        let json = serde_json::to_string(&engine).unwrap();
        let restored: TrainEngine = serde_json::from_str(&json).unwrap();

        let before = engine.predict(&x).unwrap();
        let after = restored.predict(&x).unwrap();
        for (a, b) in before.iter().zip(after.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }
}
