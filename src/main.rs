//! Solar Predictor - Main Entry Point
//!
//! Serves collector performance predictions over HTTP, or fits and queries
//! the pipeline from the command line.

use clap::Parser;
use solar_predictor::cli::{cmd_predict, cmd_ranges, cmd_serve, cmd_train, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "solar_predictor=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Train { data, output, model, n_estimators }) => {
            cmd_train(&data, &output, &model, n_estimators)?;
        }
        Some(Commands::Predict { model, data, input }) => {
            cmd_predict(model.as_deref(), data.as_deref(), &input)?;
        }
        Some(Commands::Ranges { data }) => {
            cmd_ranges(&data)?;
        }
        Some(Commands::Serve { port, host, data, model, estimator, efficiency_cap }) => {
            cmd_serve(host, port, data, model, &estimator, efficiency_cap).await?;
        }
        None => {
            // Default: serve with environment configuration
            cmd_serve(None, None, None, None, "random_forest", None).await?;
        }
    }

    Ok(())
}
