//! JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;

use atelier_core::upload::UploadError;
use atelier_shared::AppError;

/// Message shown for server-side faults.
const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Renders an error as `{ "error": code, "message": detail }`.
///
/// Server faults never expose their detail and carry a `timestamp` instead.
pub fn error_response(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let body = if err.is_client_error() {
        json!({
            "error": err.error_code(),
            "message": err.message()
        })
    } else {
        json!({
            "error": err.error_code(),
            "message": INTERNAL_MESSAGE,
            "timestamp": Utc::now().to_rfc3339()
        })
    };

    (status, Json(body)).into_response()
}

/// Maps an upload flow fault onto the application error taxonomy.
#[must_use]
pub fn from_upload_error(err: UploadError) -> AppError {
    match err {
        UploadError::Validation(msg) => AppError::Validation(msg),
        UploadError::MissingInput(path) => {
            AppError::Internal(format!("staged upload missing: {}", path.display()))
        }
        UploadError::Storage(e) => AppError::Storage(e.to_string()),
        UploadError::Repository(msg) => AppError::Database(msg),
    }
}
