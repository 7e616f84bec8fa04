//! Mapping from crate errors to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use crate::errors::Error;

/// Handler result; errors render as `{"error", "message"}` bodies.
pub type ApiResult<T> = std::result::Result<T, Error>;

/// JSON error body with a machine-readable `code`.
pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::Validation { .. } => (StatusCode::BAD_REQUEST, "validation_error"),
            Self::InvalidCoordinates { .. } => (StatusCode::BAD_REQUEST, "invalid_coordinates"),
            Self::NotFound { .. } | Self::OrderNotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            Self::InvalidTransition { .. } => (StatusCode::CONFLICT, "invalid_transition"),
            Self::InsufficientStock { .. } => (StatusCode::CONFLICT, "insufficient_stock"),
            Self::DuplicateReview { .. } => (StatusCode::CONFLICT, "duplicate_review"),
            Self::DuplicateOrderNumber { .. } => (StatusCode::CONFLICT, "duplicate_order_number"),
            Self::Database(_) => {
                error!(error = %self, "Storage failure while serving request");
                return json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", "storage error");
            }
            Self::Config { .. } | Self::Io(_) | Self::EnvVar(_) | Self::Ai { .. } => {
                error!(error = %self, "Internal failure while serving request");
                return json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error");
            }
        };
        json_error(status, code, self.to_string())
    }
}
