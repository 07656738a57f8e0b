use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::AppError;

/// Renders every failure as `{message, errors}`.
///
/// Persistence and storage details are logged but never echoed back; the
/// client only sees the fixed message for those.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation { errors, inputs } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "message": "Validation errors",
                    "inputs": inputs,
                    "errors": errors,
                }),
            ),
            AppError::InvalidQuery(errors) => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Bad request", "errors": errors }),
            ),
            AppError::MissingInput(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "No query", "errors": { "error": msg } }),
            ),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Request failed.", "errors": { "error": msg } }),
            ),
            AppError::Auth(msg) => (
                StatusCode::UNAUTHORIZED,
                json!({ "message": "Unauthorized", "errors": { "error": msg } }),
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                json!({ "message": "Not found", "errors": { "error": msg } }),
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                json!({ "message": "Conflict", "errors": { "error": msg } }),
            ),
            AppError::Database(msg) => {
                tracing::error!("Database error: {msg}");
                server_error("Database request failed")
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                server_error("File storage failed")
            }
            AppError::Internal(msg) => server_error(&msg),
        };

        (status, axum::Json(body)).into_response()
    }
}

fn server_error(msg: &str) -> (StatusCode, serde_json::Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "message": "Server error", "errors": { "error": msg } }),
    )
}
