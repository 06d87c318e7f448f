//! HTTP request handlers

use std::sync::Arc;
use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::features::{validate_request, PredictRequest, Shape};
use crate::inference::PredictionResult;

use super::error::{Result, ServerError};
use super::state::AppState;

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub predicted_values: PredictionResult,
}

/// Liveness message
pub async fn home() -> Json<Value> {
    Json(json!({
        "message": "Solar Backend API is live!",
        "usage": "Send a POST request to /predict with JSON data.",
    }))
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let uptime = chrono::Utc::now().signed_duration_since(state.started_at);
    Json(json!({
        "status": "ok",
        "model_loaded": state.model_loaded(),
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": uptime.num_seconds(),
    }))
}

/// Validation ranges by request key, plus the accepted shapes
pub async fn get_ranges(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let pipeline = state.pipeline.as_ref().ok_or(ServerError::ModelUnavailable)?;

    let mut ranges = Map::new();
    for range in pipeline.ranges().iter() {
        ranges.insert(
            range.field.key().to_string(),
            json!({
                "column": range.column,
                "min": range.min,
                "max": range.max,
            }),
        );
    }

    Ok(Json(json!({
        "ranges": ranges,
        "shapes": Shape::names(),
    })))
}

/// Decode the raw body; an empty body, `null` or `{}` counts as no input
fn parse_body(body: &[u8]) -> Result<PredictRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ServerError::BadRequest("No input data provided.".to_string()));
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ServerError::BadRequest(format!("Invalid JSON: {}", e)))?;

    match &value {
        Value::Null => Err(ServerError::BadRequest("No input data provided.".to_string())),
        Value::Object(map) if map.is_empty() => {
            Err(ServerError::BadRequest("No input data provided.".to_string()))
        }
        _ => serde_json::from_value(value)
            .map_err(|e| ServerError::BadRequest(format!("Invalid JSON: {}", e))),
    }
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<PredictResponse>> {
    if !state.model_loaded() {
        return Err(ServerError::ModelUnavailable);
    }

    let request = parse_body(&body)?;
    debug!(?request, "Prediction request");

    let input = {
        let pipeline = state.pipeline.as_ref().ok_or(ServerError::ModelUnavailable)?;
        validate_request(&request, pipeline.ranges())?
    };

    let task_state = Arc::clone(&state);
    let predicted_values = tokio::task::spawn_blocking(move || {
        let pipeline = task_state.pipeline.as_ref().ok_or(ServerError::ModelUnavailable)?;
        pipeline
            .predict(&input)
            .map_err(|e| ServerError::Internal(e.to_string()))
    })
    .await
    .map_err(|e| ServerError::Internal(e.to_string()))??;

    Ok(Json(PredictResponse { predicted_values }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_body_empty() {
        let bodies: [&[u8]; 4] = [b"", b"  ", b"null", b"{}"];
        for body in bodies {
            let err = parse_body(body).unwrap_err();
            assert_eq!(err.to_string(), "No input data provided.");
        }
    }

    #[test]
    fn test_parse_body_malformed() {
        let err = parse_body(b"{\"shape\": ").unwrap_err();
        assert!(err.to_string().starts_with("Invalid JSON:"));

        let err = parse_body(b"[1, 2]").unwrap_err();
        assert!(err.to_string().starts_with("Invalid JSON:"));
    }

    #[test]
    fn test_parse_body_mixed_value_types() {
        let req = parse_body(br#"{"shape": "Flat", "velocity": "1.5", "nusselt": 120}"#).unwrap();
        assert!(req.shape.is_some());
        assert!(req.velocity.is_some());
        assert!(req.nusselt.is_some());
        assert!(req.distance.is_none());
    }
}
