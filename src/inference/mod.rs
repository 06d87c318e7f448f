//! Inference module
//!
//! The fitted pipeline that turns a validated request into the three
//! collector outputs:
//! - Feature assembly in the recorded column order
//! - Scaling with the persisted scaler
//! - Multi-output prediction
//! - Rounding and efficiency clamping

mod config;
mod pipeline;

pub use config::{is_valid_efficiency_cap, PipelineConfig, DEFAULT_EFFICIENCY_CAP};
pub use pipeline::{FitMetadata, FittedPipeline, PredictionResult};
