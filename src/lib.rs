//! Solar Predictor - Solar air-collector performance prediction
//!
//! This crate serves predictions of collector output heat, heat loss and
//! efficiency from a regression pipeline fitted on measured data:
//! - Request validation against the training ranges
//! - Feature assembly in the fitted column order
//! - Standard scaling and multi-output regression
//! - HTTP server and CLI interfaces
//!
//! # Modules
//!
//! - [`features`] - Shape encoding, request schema, range validation
//! - [`preprocessing`] - Feature scaling
//! - [`training`] - Random forest and KNN regressors
//! - [`inference`] - The fitted prediction pipeline
//! - [`utils`] - Dataset loading
//! - [`server`] - HTTP server with JSON API
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Core ML modules
pub mod features;
pub mod preprocessing;
pub mod training;
pub mod inference;

// Utilities
pub mod utils;

// Services
pub mod server;
pub mod cli;

pub use error::{PredictorError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{PredictorError, Result};

    // Request features
    pub use crate::features::{
        validate_request, InputField, PredictRequest, RangeTable, Shape, ValidatedInput,
        ValidationError,
    };

    // Preprocessing
    pub use crate::preprocessing::Scaler;

    // Training
    pub use crate::training::{ModelType, Regressor, TrainEngine, TrainingConfig};

    // Inference
    pub use crate::inference::{FittedPipeline, PipelineConfig, PredictionResult};

    // Data
    pub use crate::utils::{DataLoader, SolarDataset};
}
