//! Application state

use crate::inference::FittedPipeline;

use super::ServerConfig;

/// Application state shared across handlers.
///
/// Built once at startup and only read afterwards.
pub struct AppState {
    pub config: ServerConfig,
    pub pipeline: Option<FittedPipeline>,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(config: ServerConfig, pipeline: Option<FittedPipeline>) -> Self {
        Self {
            config,
            pipeline,
            started_at: chrono::Utc::now(),
        }
    }

    pub fn model_loaded(&self) -> bool {
        self.pipeline.is_some()
    }
}
