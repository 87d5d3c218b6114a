//! Error types for the network API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use qnet_sim::SimError;

/// API error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Node exists: {0}")]
    NodeExists(String),

    #[error("Key agreement aborted: {0}")]
    QberTooHigh(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::NodeExists(_) => (StatusCode::CONFLICT, "node_exists"),
            ApiError::QberTooHigh(_) => (StatusCode::CONFLICT, "qber_too_high"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<SimError> for ApiError {
    fn from(e: SimError) -> Self {
        match &e {
            SimError::NodeNotFound(_) => ApiError::NotFound(e.to_string()),
            SimError::NodeExists(_) => ApiError::NodeExists(e.to_string()),
            SimError::QberTooHigh { .. } => ApiError::QberTooHigh(e.to_string()),
            SimError::NotEntangled(_, _)
            | SimError::NoSharedKey(_, _)
            | SimError::TunnelFailed(_, _)
            | SimError::InsufficientKeyMaterial { .. }
            | SimError::InvalidParameter(_)
            | SimError::BadPayload(_) => ApiError::BadRequest(e.to_string()),
            _ => ApiError::Internal(e.to_string()),
        }
    }
}
