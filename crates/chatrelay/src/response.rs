//! JSON error responses shared by the HTTP handlers.

use axum::Json;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Body of every error response: `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub type ErrorResponse = (StatusCode, Json<ErrorBody>);

fn error(status: StatusCode, message: impl Into<String>) -> ErrorResponse {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

pub fn bad_request(message: impl Into<String>) -> ErrorResponse {
    error(StatusCode::BAD_REQUEST, message)
}

pub fn unauthorized(message: impl Into<String>) -> ErrorResponse {
    error(StatusCode::UNAUTHORIZED, message)
}

pub fn internal_error(message: impl Into<String>) -> ErrorResponse {
    error(StatusCode::INTERNAL_SERVER_ERROR, message)
}
