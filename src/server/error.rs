//! Error types for the server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::features::ValidationError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Model not loaded. Ensure the reference dataset is present.")]
    ModelUnavailable,

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) | ServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ServerError::ModelUnavailable | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ServerError::BadRequest(msg) => tracing::warn!(detail = %msg, "Rejected request"),
            ServerError::Validation(e) => tracing::warn!(detail = %e, "Validation failed"),
            ServerError::ModelUnavailable => tracing::error!("Prediction requested without a model"),
            ServerError::Internal(msg) => tracing::error!(detail = %msg, "Internal server error"),
        }

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err: ServerError = ValidationError::MissingField("velocity".to_string()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Missing value for velocity");

        assert_eq!(ServerError::ModelUnavailable.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let err = ServerError::Internal("boom".to_string());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Internal Server Error: boom");
    }
}
