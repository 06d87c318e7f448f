//! Prediction server
//!
//! Serves the fitted collector pipeline over HTTP. The pipeline is loaded or
//! fitted once at startup; if that fails the server still starts and
//! `/predict` answers with a 500.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use handlers::PredictResponse;
pub use state::AppState;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::Result;
use crate::inference::{is_valid_efficiency_cap, FittedPipeline, PipelineConfig, DEFAULT_EFFICIENCY_CAP};
use crate::utils::DataLoader;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Reference dataset fitted at startup when no artifact is available
    pub dataset_path: PathBuf,
    /// Saved pipeline artifact, preferred when it exists
    pub model_path: Option<PathBuf>,
    pub efficiency_cap: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10000),
            dataset_path: std::env::var("DATASET_PATH")
                .unwrap_or_else(|_| "dataset.csv".to_string())
                .into(),
            model_path: std::env::var("MODEL_PATH").ok().map(PathBuf::from),
            efficiency_cap: efficiency_cap_from(std::env::var("EFFICIENCY_CAP").ok().as_deref()),
        }
    }
}

/// Parse `EFFICIENCY_CAP`; unset, unparseable, negative or non-finite values fall back to the default
fn efficiency_cap_from(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return DEFAULT_EFFICIENCY_CAP;
    };
    match raw.trim().parse::<f64>() {
        Ok(cap) if is_valid_efficiency_cap(cap) => cap,
        _ => {
            warn!(value = raw, default = DEFAULT_EFFICIENCY_CAP, "Ignoring invalid EFFICIENCY_CAP");
            DEFAULT_EFFICIENCY_CAP
        }
    }
}

/// Load the saved artifact or fit a fresh pipeline from the dataset
pub fn build_pipeline(config: &ServerConfig, pipeline_config: &PipelineConfig) -> Result<FittedPipeline> {
    if let Some(path) = config.model_path.as_ref().filter(|p| p.exists()) {
        info!(path = %path.display(), "Loading pipeline artifact");
        let pipeline = FittedPipeline::load(path)?.with_efficiency_cap(config.efficiency_cap);
        return Ok(pipeline);
    }

    info!(path = %config.dataset_path.display(), "Fitting pipeline from dataset");
    let dataset = DataLoader::new().load_dataset(&config.dataset_path)?;
    let pipeline = FittedPipeline::fit(
        &dataset,
        &pipeline_config.clone().with_efficiency_cap(config.efficiency_cap),
    )?;

    if let Some(first) = dataset.rows().first() {
        let sample = pipeline.predict(first)?;
        info!(
            shape = %first.shape,
            qout = sample.qout,
            qloss = sample.qloss,
            efficiency = sample.efficiency,
            "Sample prediction on first training row"
        );
    }

    Ok(pipeline)
}

/// Start the server with the given configuration
pub async fn run_server(config: ServerConfig, pipeline_config: PipelineConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();

    let build_config = config.clone();
    let pipeline = tokio::task::spawn_blocking(move || build_pipeline(&build_config, &pipeline_config))
        .await?;
    let pipeline = match pipeline {
        Ok(p) => Some(p),
        Err(e) => {
            warn!(error = %e, "Model unavailable, /predict will return 500");
            None
        }
    };

    let state = Arc::new(AppState::new(config.clone(), pipeline));
    let app = create_router(Arc::clone(&state));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        host = %config.host,
        port = config.port,
        address = %addr,
        model_loaded = state.model_loaded(),
        efficiency_cap = config.efficiency_cap,
        started_at = %start_time.to_rfc3339(),
        "Solar predictor server starting"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, pid = std::process::id(), "Server listening and ready to accept connections");

    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for ctrl+c");
            return;
        }
        let stop_time = chrono::Utc::now();
        let uptime = stop_time.signed_duration_since(start_time);
        info!(
            stopped_at = %stop_time.to_rfc3339(),
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}
