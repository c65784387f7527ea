//! Error types and handling for the HTTP boundary.
//!
//! Upstream provider failures never reach this type: they are returned as data
//! inside a completion result. [`AppError`] covers what the HTTP layer itself
//! rejects (malformed input) and genuine internal faults.

use crate::core::error_types::{ERROR_TYPE_API, ERROR_TYPE_INVALID_REQUEST, ERROR_TYPE_TIMEOUT};
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum AppError {
    /// Inbound request failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Request exceeded the server-wide deadline
    #[error("Request did not complete within {0} seconds")]
    RequestTimeout(u64),

    /// Generic internal server errors with custom message
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::RequestTimeout(_) => StatusCode::REQUEST_TIMEOUT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_type = match &self {
            AppError::Validation(_) => ERROR_TYPE_INVALID_REQUEST,
            AppError::RequestTimeout(_) => {
                tracing::warn!(error = %self, "Request timed out");
                ERROR_TYPE_TIMEOUT
            }
            AppError::Internal(_) => {
                tracing::error!(error = %self, "Request failed with internal error");
                ERROR_TYPE_API
            }
        };

        let body = Json(json!({
            "error": {
                "message": self.to_string(),
                "type": error_type,
                "code": status.as_u16()
            }
        }));

        (status, body).into_response()
    }
}

/// Convenience type alias for Results using [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;
