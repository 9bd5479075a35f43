use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::envelope::EnvelopeError;

/// Request-handling failures that map to an HTTP response rather than a panic.
/// None of these change store state: a rejected event leaves state unchanged.
#[derive(Debug)]
pub enum ApiError {
    InvalidEnvelope(EnvelopeError),
    IngressClosed,
}

impl From<EnvelopeError> for ApiError {
    fn from(e: EnvelopeError) -> Self {
        Self::InvalidEnvelope(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InvalidEnvelope(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::IngressClosed => (
                StatusCode::SERVICE_UNAVAILABLE,
                "scheduler is not accepting events".to_string(),
            ),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
