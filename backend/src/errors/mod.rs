//! Error handling module for the artist backend.
//!
//! Provides centralized error types with mapping to HTTP status codes and JSON error bodies.

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const PAYLOAD_TOO_LARGE: &str = "PAYLOAD_TOO_LARGE";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Resource or route not found
    NotFound(String),
    /// Required field missing or empty
    Validation(String),
    /// Malformed request body
    BadRequest(String),
    /// Request body over the configured limit
    PayloadTooLarge(String),
    /// Object storage failure
    Storage(String),
    /// Internal server error
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => codes::PAYLOAD_TOO_LARGE,
            AppError::Storage(_) => codes::STORAGE_ERROR,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::NotFound(msg) => msg.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::PayloadTooLarge(msg) => msg.clone(),
            AppError::Storage(msg) => msg.clone(),
            AppError::Internal(msg) => msg.clone(),
        }
    }

    /// Client error for a rejected body, keeping the rejection's own status when
    /// it is the body limit.
    fn rejected_body(status: StatusCode, message: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(message)
        } else {
            AppError::BadRequest(message)
        }
    }

    /// Whether the error is a server-side failure.
    pub fn is_internal(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("Storage I/O error: {:?}", err);
        AppError::Storage(format!("Storage I/O error: {}", err))
    }
}

impl From<opendal::Error> for AppError {
    fn from(err: opendal::Error) -> Self {
        tracing::error!("Object storage error: {:?}", err);
        AppError::Storage(format!("Object storage error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::Internal(format!("JSON error: {}", err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::rejected_body(
            rejection.status(),
            format!("Invalid JSON body: {}", rejection.body_text()),
        )
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::rejected_body(
            rejection.status(),
            format!("Invalid multipart body: {}", rejection.body_text()),
        )
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::rejected_body(
            err.status(),
            format!("Failed to read upload: {}", err.body_text()),
        )
    }
}

/// JSON error body: `{ "error": ..., "message": ... }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        if error.is_internal() {
            // Storage details stay in the message; the headline is generic.
            return Self {
                error: "Internal server error".to_string(),
                message: Some(error.message()),
                code: error.error_code().to_string(),
            };
        }

        Self {
            error: error.message(),
            message: None,
            code: error.error_code().to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.is_internal() {
            tracing::error!(status = %status, "Request failed: {}", self);
        } else {
            tracing::debug!(status = %status, "Request rejected: {}", self);
        }
        let body = ErrorResponse::new(&self);
        (status, Json(body)).into_response()
    }
}
