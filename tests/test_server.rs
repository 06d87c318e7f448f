//! Integration test: Server API endpoints

use solar_predictor::inference::{FittedPipeline, PipelineConfig};
use solar_predictor::server::{create_router, AppState, ServerConfig};
use solar_predictor::training::TrainingConfig;
use solar_predictor::utils::DataLoader;
use std::sync::{Arc, OnceLock};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/solar_dataset.csv");

fn fitted() -> FittedPipeline {
    static PIPELINE: OnceLock<FittedPipeline> = OnceLock::new();
    PIPELINE
        .get_or_init(|| {
            let dataset = DataLoader::new().load_dataset(FIXTURE).unwrap();
            let config = PipelineConfig::default()
                .with_training(TrainingConfig::default().with_n_estimators(20));
            FittedPipeline::fit(&dataset, &config).unwrap()
        })
        .clone()
}

fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        dataset_path: FIXTURE.into(),
        model_path: None,
        efficiency_cap: 80.0,
    }
}

fn test_app() -> axum::Router {
    let state = Arc::new(AppState::new(test_config(), Some(fitted())));
    create_router(state)
}

fn app_without_model() -> axum::Router {
    let state = Arc::new(AppState::new(test_config(), None));
    create_router(state)
}

fn example_request() -> Value {
    json!({
        "shape": "Flat",
        "solarRadiation": 500,
        "collectorArea": 1.2,
        "massFlowRate": 0.8,
        "velocity": 1.5,
        "inletTemp": 30,
        "outletTemp": 45,
        "ambientTemp": 28,
        "nusselt": 120,
        "distance": 0.05
    })
}

async fn post_predict(app: axum::Router, body: String) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

fn is_rounded(v: f64) -> bool {
    ((v * 100.0).round() - v * 100.0).abs() < 1e-6
}

#[tokio::test]
async fn test_home_endpoint() {
    let (status, json) = get_json(test_app(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].as_str().unwrap().contains("live"));
    assert!(json["usage"].as_str().unwrap().contains("/predict"));
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, json) = get_json(test_app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["model_loaded"], true);

    let (_, json) = get_json(app_without_model(), "/health").await;
    assert_eq!(json["model_loaded"], false);
}

#[tokio::test]
async fn test_ranges_endpoint() {
    let (status, json) = get_json(test_app(), "/ranges").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ranges"]["solarRadiation"]["min"], 300.0);
    assert_eq!(json["ranges"]["solarRadiation"]["max"], 1000.0);
    assert_eq!(
        json["ranges"]["distance"]["column"],
        "Distance Between Plate and Glass (x) m"
    );
    assert_eq!(json["shapes"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_ranges_without_model() {
    let (status, json) = get_json(app_without_model(), "/ranges").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_predict_example_request() {
    let (status, json) = post_predict(test_app(), example_request().to_string()).await;
    assert_eq!(status, StatusCode::OK, "body: {}", json);

    let values = &json["predicted_values"];
    for key in ["Qout", "Qloss", "Efficiency(%)"] {
        let v = values[key].as_f64().unwrap_or_else(|| panic!("missing {}", key));
        assert!(is_rounded(v), "{} = {} is not rounded", key, v);
    }
    let efficiency = values["Efficiency(%)"].as_f64().unwrap();
    assert!((0.0..=80.0).contains(&efficiency));
}

#[tokio::test]
async fn test_predict_is_repeatable() {
    let (_, first) = post_predict(test_app(), example_request().to_string()).await;
    let (_, second) = post_predict(test_app(), example_request().to_string()).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_predict_accepts_numeric_strings() {
    let mut body = example_request();
    body["velocity"] = json!("1.5");
    body["nusselt"] = json!(" 120 ");

    let (status, json) = post_predict(test_app(), body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    let (_, expected) = post_predict(test_app(), example_request().to_string()).await;
    assert_eq!(json, expected);
}

#[tokio::test]
async fn test_predict_unknown_shape() {
    let mut body = example_request();
    body["shape"] = json!("Square");

    let (status, json) = post_predict(test_app(), body.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let msg = json["error"].as_str().unwrap();
    assert!(msg.contains("Square"));
    for shape in ["Hexagonal", "Circular", "Triangular", "Flat", "Concentric"] {
        assert!(msg.contains(shape), "{} not listed in {}", shape, msg);
    }
}

#[tokio::test]
async fn test_predict_missing_field() {
    let mut body = example_request();
    body.as_object_mut().unwrap().remove("ambientTemp");

    let (status, json) = post_predict(test_app(), body.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing value for ambientTemp");
}

#[tokio::test]
async fn test_predict_null_field_counts_as_missing() {
    let mut body = example_request();
    body["distance"] = Value::Null;

    let (status, json) = post_predict(test_app(), body.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing value for distance");
}

#[tokio::test]
async fn test_predict_out_of_range() {
    let mut body = example_request();
    body["solarRadiation"] = json!(1500);

    let (status, json) = post_predict(test_app(), body.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "solarRadiation should be between 300 and 1000");
}

#[tokio::test]
async fn test_predict_range_bounds_inclusive() {
    let mut body = example_request();
    body["solarRadiation"] = json!(300);
    body["nusselt"] = json!(250);

    let (status, _) = post_predict(test_app(), body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_predict_not_a_number() {
    let mut body = example_request();
    body["inletTemp"] = json!("warm");

    let (status, json) = post_predict(test_app(), body.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().starts_with("inletTemp must be a number"));
}

#[tokio::test]
async fn test_predict_empty_body() {
    let (status, json) = post_predict(test_app(), String::new()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No input data provided.");

    let (status, _) = post_predict(test_app(), "{}".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_predict_invalid_json() {
    let (status, json) = post_predict(test_app(), "{\"shape\": \"Flat\",".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().starts_with("Invalid JSON"));
}

#[tokio::test]
async fn test_predict_without_model() {
    let (status, json) = post_predict(app_without_model(), example_request().to_string()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().unwrap().contains("Model not loaded"));
}

#[tokio::test]
async fn test_efficiency_cap_applied() {
    let pipeline = fitted().with_efficiency_cap(0.5);
    let app = create_router(Arc::new(AppState::new(test_config(), Some(pipeline))));

    let (status, json) = post_predict(app, example_request().to_string()).await;
    assert_eq!(status, StatusCode::OK);
    let efficiency = json["predicted_values"]["Efficiency(%)"].as_f64().unwrap();
    assert!(efficiency <= 0.5);
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, json) = get_json(test_app(), "/nonexistent").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_wrong_method() {
    let (status, json) = get_json(test_app(), "/predict").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert!(json["error"].is_string());
}
