//! Solar predictor CLI module
//!
//! Command-line interface for serving, fitting and one-shot prediction.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::features::{validate_request, PredictRequest, Shape, TARGET_COLUMNS};
use crate::inference::{is_valid_efficiency_cap, FittedPipeline, PipelineConfig, DEFAULT_EFFICIENCY_CAP};
use crate::server::{run_server, PredictResponse, ServerConfig};
use crate::training::{ModelType, TrainingConfig};
use crate::utils::DataLoader;

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = W.saturating_sub(visible_len);
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

fn line_box_empty() { line_box(""); }

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "solar-predictor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Solar air-collector performance prediction service")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the prediction server (default)
    Serve {
        /// Server port [env: PORT, default 10000]
        #[arg(short, long)]
        port: Option<u16>,

        /// Server host [env: API_HOST, default 0.0.0.0]
        #[arg(long)]
        host: Option<String>,

        /// Reference dataset CSV [env: DATASET_PATH]
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Saved pipeline artifact, preferred when present [env: MODEL_PATH]
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Estimator fitted when no artifact is used (random_forest, knn)
        #[arg(long, default_value = "random_forest")]
        estimator: String,

        /// Upper bound for the efficiency output [env: EFFICIENCY_CAP]
        #[arg(long, value_parser = parse_efficiency_cap)]
        efficiency_cap: Option<f64>,
    },

    /// Fit the pipeline on a dataset and save it
    Train {
        /// Reference dataset CSV
        #[arg(short, long)]
        data: PathBuf,

        /// Output artifact file
        #[arg(short, long)]
        output: PathBuf,

        /// Estimator (random_forest, knn)
        #[arg(short, long, default_value = "random_forest")]
        model: String,

        /// Number of trees for the forest
        #[arg(long, default_value = "200")]
        n_estimators: usize,
    },

    /// Predict a single request read from a JSON file
    Predict {
        /// Saved pipeline artifact
        #[arg(short, long, conflicts_with = "data", required_unless_present = "data")]
        model: Option<PathBuf>,

        /// Reference dataset CSV to fit on the fly
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Request body file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print the validation ranges of a dataset
    Ranges {
        /// Reference dataset CSV
        #[arg(short, long)]
        data: PathBuf,
    },
}

fn parse_efficiency_cap(s: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(cap) if is_valid_efficiency_cap(cap) => Ok(cap),
        Ok(_) => Err("must be a finite value of at least 0".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

fn pipeline_config(model: &str, n_estimators: usize) -> anyhow::Result<PipelineConfig> {
    let model_type: ModelType = model.parse()?;
    let training = TrainingConfig::default()
        .with_model_type(model_type)
        .with_n_estimators(n_estimators);
    Ok(PipelineConfig::default().with_training(training))
}

fn fit_from(data_path: &Path, config: &PipelineConfig) -> anyhow::Result<FittedPipeline> {
    step_run("Loading data");
    let start = Instant::now();
    let dataset = DataLoader::new().load_dataset(data_path)?;
    step_done(&format!(
        "{} rows, {} skipped in {:?}",
        dataset.len(),
        dataset.dropped_rows(),
        start.elapsed()
    ));

    step_run(&format!("Fitting {}", config.training.model_type.to_string().cyan()));
    let start = Instant::now();
    let pipeline = FittedPipeline::fit(&dataset, config)?;
    step_done(&format!("{:?}", start.elapsed()));
    Ok(pipeline)
}

pub fn cmd_train(
    data_path: &Path,
    output: &Path,
    model: &str,
    n_estimators: usize,
) -> anyhow::Result<()> {
    section("Train");

    let config = pipeline_config(model, n_estimators)?;
    let pipeline = fit_from(data_path, &config)?;

    println!();
    println!("  {:<16} {:>10} {:>10}", muted("Target"), muted("R²"), muted("RMSE"));
    println!("  {}", dim(&"─".repeat(38)));
    for (target, metrics) in TARGET_COLUMNS.iter().zip(pipeline.metrics()) {
        println!("  {:<16} {:>10.4} {:>10.4}", target, metrics.r2, metrics.rmse);
    }
    println!();

    step_run(&format!("Saving → {}", output.display()));
    pipeline.save(output)?;
    step_done(&format!("{} features", pipeline.feature_columns().len()));
    println!();
    Ok(())
}

pub fn cmd_predict(
    model_path: Option<&Path>,
    data_path: Option<&Path>,
    input: &Path,
) -> anyhow::Result<()> {
    section("Predict");

    let pipeline = match (model_path, data_path) {
        (Some(path), _) => {
            step_run(&format!("Loading {}", path.display()));
            let pipeline = FittedPipeline::load(path)?;
            step_done(&pipeline.metadata().fitted_at.to_rfc3339());
            pipeline
        }
        (None, Some(path)) => fit_from(path, &PipelineConfig::default())?,
        (None, None) => anyhow::bail!("either --model or --data is required"),
    };

    let body = std::fs::read_to_string(input)?;
    let request: PredictRequest = serde_json::from_str(&body)?;

    let validated = match validate_request(&request, pipeline.ranges()) {
        Ok(v) => v,
        Err(e) => {
            println!("  {} {}", "✗".red(), e.to_string().red());
            println!();
            anyhow::bail!(e);
        }
    };
    step_ok(&format!("Input valid ({})", validated.shape));

    let predicted_values = pipeline.predict(&validated)?;
    let response = PredictResponse { predicted_values };

    println!();
    println!("{}", serde_json::to_string_pretty(&response)?);
    println!();
    Ok(())
}

pub fn cmd_ranges(data_path: &Path) -> anyhow::Result<()> {
    section("Ranges");

    let dataset = DataLoader::new().load_dataset(data_path)?;
    println!("  {:<12} {}", muted("File"), data_path.display());
    println!("  {:<12} {}", muted("Rows"), dataset.len());
    println!("  {:<12} {}", muted("Skipped"), dataset.dropped_rows());
    println!("  {:<12} {}", muted("Shapes"), Shape::names().join(", "));
    println!();

    println!("  {:<16} {:>12} {:>12}", muted("Field"), muted("Min"), muted("Max"));
    println!("  {}", dim(&"─".repeat(42)));
    for range in dataset.range_table()?.iter() {
        println!("  {:<16} {:>12.2} {:>12.2}", range.field.key(), range.min, range.max);
    }
    println!();
    Ok(())
}

// ─── Serve ─────────────────────────────────────────────────────────────────────

pub async fn cmd_serve(
    host: Option<String>,
    port: Option<u16>,
    data: Option<PathBuf>,
    model: Option<PathBuf>,
    estimator: &str,
    efficiency_cap: Option<f64>,
) -> anyhow::Result<()> {
    let defaults = ServerConfig::default();
    let config = ServerConfig {
        host: host.unwrap_or(defaults.host),
        port: port.unwrap_or(defaults.port),
        dataset_path: data.unwrap_or(defaults.dataset_path),
        model_path: model.or(defaults.model_path),
        efficiency_cap: efficiency_cap.unwrap_or(defaults.efficiency_cap),
    };
    let pipeline_config = pipeline_config(estimator, TrainingConfig::default().n_estimators)?;

    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "Solar Predictor".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Predict", &format!("http://{}:{}/predict", config.host, config.port)));
    line_box(&kv("Health ", &format!("http://{}:{}/health", config.host, config.port)));
    line_box(&kv("Ranges ", &format!("http://{}:{}/ranges", config.host, config.port)));
    line_box(&kv("Dataset", &config.dataset_path.display().to_string()));
    if (config.efficiency_cap - DEFAULT_EFFICIENCY_CAP).abs() > f64::EPSILON {
        line_box(&kv("Cap    ", &format!("{}%", config.efficiency_cap)));
    }
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box_center(&format!("{}", dim("ctrl+c to stop")));
    line_box_empty();
    line_box_bottom();
    println!();

    run_server(config, pipeline_config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_predict_requires_a_source() {
        assert!(Cli::try_parse_from(["solar-predictor", "predict", "-i", "req.json"]).is_err());
        assert!(Cli::try_parse_from(["solar-predictor", "predict", "-i", "req.json", "-m", "p.json"]).is_ok());
    }

    #[test]
    fn test_pipeline_config_parses_estimator() {
        let config = pipeline_config("knn", 10).unwrap();
        assert_eq!(config.training.model_type, ModelType::KNN);
        assert!(pipeline_config("svm", 10).is_err());
    }

    #[test]
    fn test_efficiency_cap_flag_rejects_unusable_values() {
        let parsed = Cli::try_parse_from(["solar-predictor", "serve", "--efficiency-cap", "65"]).unwrap();
        assert!(matches!(
            parsed.command,
            Some(Commands::Serve { efficiency_cap: Some(cap), .. }) if cap == 65.0
        ));
        for bad in ["NaN", "inf", "-1", "lots"] {
            let args = ["solar-predictor", "serve", "--efficiency-cap", bad];
            assert!(Cli::try_parse_from(args).is_err(), "{}", bad);
        }
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[1mbold\x1b[0m"), "bold");
    }
}
