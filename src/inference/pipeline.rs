//! Fitted prediction pipeline
//!
//! Bundles everything needed to answer a request: the feature column layout,
//! the fitted scaler, the multi-output estimator and the validation ranges.
//! The whole bundle is written to and read from a single JSON artifact.

use super::PipelineConfig;
use crate::error::{PredictorError, Result};
use crate::features::{feature_columns, round2, InputField, RangeTable, ValidatedInput, TARGET_COLUMNS};
use crate::preprocessing::Scaler;
use crate::training::{ModelMetrics, ModelType, TrainEngine};
use crate::utils::SolarDataset;
use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Post-processed model outputs for one request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    #[serde(rename = "Qout")]
    pub qout: f64,
    #[serde(rename = "Qloss")]
    pub qloss: f64,
    #[serde(rename = "Efficiency(%)")]
    pub efficiency: f64,
}

impl PredictionResult {
    /// Round raw model outputs to two decimals, then clamp efficiency to `[0, cap]`
    pub fn from_raw(qout: f64, qloss: f64, efficiency: f64, cap: f64) -> Self {
        Self {
            qout: round2(qout),
            qloss: round2(qloss),
            efficiency: round2(efficiency).min(cap).max(0.0),
        }
    }
}

/// Training provenance stored alongside the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitMetadata {
    pub n_rows: usize,
    pub dropped_rows: usize,
    pub model: ModelType,
    pub fitted_at: DateTime<Utc>,
    pub training_time_secs: f64,
    pub version: String,
}

/// Scaler, estimator and range table fitted on the reference dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedPipeline {
    feature_columns: Vec<String>,
    target_columns: Vec<String>,
    scaler: Scaler,
    engine: TrainEngine,
    ranges: RangeTable,
    efficiency_cap: f64,
    metadata: FitMetadata,
}

impl FittedPipeline {
    /// Fit scaler, estimator and range table on a decoded dataset
    pub fn fit(dataset: &SolarDataset, config: &PipelineConfig) -> Result<Self> {
        if dataset.is_empty() {
            return Err(PredictorError::DataError("cannot fit on an empty dataset".to_string()));
        }

        let feature_columns = feature_columns();
        let x = dataset.feature_matrix(&feature_columns)?;

        let mut scaler = Scaler::new();
        let x_scaled = scaler.fit_transform(&x)?;

        let mut engine = TrainEngine::new(config.training.clone());
        engine.fit(&x_scaled, dataset.targets())?;

        let ranges = dataset.range_table()?;

        let metadata = FitMetadata {
            n_rows: dataset.len(),
            dropped_rows: dataset.dropped_rows(),
            model: config.training.model_type,
            fitted_at: Utc::now(),
            training_time_secs: engine.training_time_secs(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        };

        for (target, metrics) in TARGET_COLUMNS.iter().zip(engine.metrics()) {
            debug!(column = *target, r2 = metrics.r2, rmse = metrics.rmse, "In-sample fit");
        }

        info!(
            rows = metadata.n_rows,
            dropped_rows = metadata.dropped_rows,
            model = %metadata.model,
            "Pipeline fitted"
        );

        Ok(Self {
            feature_columns,
            target_columns: TARGET_COLUMNS.iter().map(|s| s.to_string()).collect(),
            scaler,
            engine,
            ranges,
            efficiency_cap: config.efficiency_cap,
            metadata,
        })
    }

    /// Save the pipeline to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a pipeline from a JSON file.
    ///
    /// The recorded column layout must match the one this build assembles.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let pipeline: Self = serde_json::from_str(&json)?;
        pipeline.check_layout()?;
        Ok(pipeline)
    }

    fn check_layout(&self) -> Result<()> {
        let expected = feature_columns();
        if self.feature_columns != expected {
            return Err(PredictorError::ConfigError(format!(
                "artifact feature columns {:?} do not match {:?}",
                self.feature_columns, expected
            )));
        }
        if self.target_columns != TARGET_COLUMNS {
            return Err(PredictorError::ConfigError(format!(
                "artifact targets {:?} do not match {:?}",
                self.target_columns, TARGET_COLUMNS
            )));
        }
        if self.ranges.len() != InputField::ALL.len() {
            return Err(PredictorError::ConfigError(format!(
                "artifact has {} ranges, expected {}",
                self.ranges.len(),
                InputField::ALL.len()
            )));
        }
        if let Some(field) = InputField::ALL.iter().find(|f| self.ranges.get(**f).is_none()) {
            return Err(PredictorError::ConfigError(format!(
                "artifact has no range for {}",
                field.key()
            )));
        }
        if !self.scaler.is_fitted() || self.engine.n_targets() != TARGET_COLUMNS.len() {
            return Err(PredictorError::ModelNotFitted);
        }
        Ok(())
    }

    pub fn with_efficiency_cap(mut self, cap: f64) -> Self {
        self.efficiency_cap = cap;
        self
    }

    pub fn efficiency_cap(&self) -> f64 {
        self.efficiency_cap
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    pub fn ranges(&self) -> &RangeTable {
        &self.ranges
    }

    pub fn metadata(&self) -> &FitMetadata {
        &self.metadata
    }

    pub fn metrics(&self) -> &[ModelMetrics] {
        self.engine.metrics()
    }

    /// Predict the three targets for one validated input
    pub fn predict(&self, input: &ValidatedInput) -> Result<PredictionResult> {
        let features = input.assemble(&self.feature_columns)?;
        debug!(features = ?features, "Assembled feature vector");

        let x = Array2::from_shape_vec((1, features.len()), features)?;
        let x_scaled = self.scaler.transform(&x)?;
        debug!(scaled = ?x_scaled.row(0).to_vec(), "Scaled feature vector");

        let raw = self.engine.predict(&x_scaled)?;
        let row = raw.row(0);
        if row.len() != TARGET_COLUMNS.len() {
            return Err(PredictorError::InferenceError(format!(
                "model returned {} outputs, expected {}",
                row.len(),
                TARGET_COLUMNS.len()
            )));
        }
        if let Some(bad) = row.iter().find(|v| !v.is_finite()) {
            return Err(PredictorError::InferenceError(format!("model returned non-finite value {}", bad)));
        }

        let result = PredictionResult::from_raw(row[0], row[1], row[2], self.efficiency_cap);
        debug!(?result, "Prediction");
        Ok(result)
    }
}
