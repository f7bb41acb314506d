pub mod codes;
pub mod handlers;

pub use codes::ErrorCode;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extractors::BindError;
use crate::render::TemplateError;

/// Standard error response structure.
///
/// Every failure that escapes a handler ends up as this body:
/// - `code`: integer error code for logging/monitoring (e.g., 2003)
/// - `error`: machine-readable identifier (e.g., "STORAGE_ERROR")
/// - `message`: human-readable message
/// - `details`: optional structured details (e.g., field errors)
///
/// # JSON Example
///
/// ```json
/// {
///   "code": 1003,
///   "error": "INVALID_BODY",
///   "message": "Failed to parse request body",
///   "details": null
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: i32,
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            error: code.as_str().to_string(),
            message: message.into(),
            details: None,
        }
    }
}

/// Application error type that can be converted to HTTP responses.
///
/// Domain crates convert their own error enums into this type so every
/// unexpected failure reaches clients in the same shape.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Request binding error: {0}")]
    Binding(#[from] BindError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Validation failed")]
    Validation(serde_json::Value),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl AppError {
    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Binding(BindError::UnsupportedContentType(_)) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            AppError::Binding(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Template(_)
            | AppError::Storage(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Error code this error is reported with.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::Binding(BindError::UnsupportedContentType(_)) => {
                ErrorCode::UnsupportedMediaType
            }
            AppError::Binding(_) => ErrorCode::InvalidBody,
            AppError::Template(_) => ErrorCode::TemplateError,
            AppError::Validation(_) => ErrorCode::ValidationError,
            AppError::BadRequest(_) => ErrorCode::BadRequest,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Storage(_) => ErrorCode::StorageError,
            AppError::InternalServerError(_) => ErrorCode::InternalError,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.error_code();

        let (message, details) = match self {
            AppError::Binding(e) => {
                tracing::warn!(error_code = code.code(), "Request binding failed: {}", e);
                (e.to_string(), None)
            }
            AppError::Template(e) => {
                tracing::error!(error_code = code.code(), "Template rendering failed: {}", e);
                (code.default_message().to_string(), None)
            }
            AppError::Validation(details) => {
                tracing::info!(error_code = code.code(), "Validation failed");
                (code.default_message().to_string(), Some(details))
            }
            AppError::BadRequest(msg) => {
                tracing::info!(error_code = code.code(), "Rejected request: {}", msg);
                (msg, None)
            }
            AppError::NotFound(msg) => {
                tracing::info!(error_code = code.code(), "Not found: {}", msg);
                (msg, None)
            }
            AppError::Storage(msg) => {
                tracing::error!(error_code = code.code(), "Storage error: {}", msg);
                (code.default_message().to_string(), None)
            }
            AppError::InternalServerError(msg) => {
                tracing::error!(error_code = code.code(), "Internal server error: {}", msg);
                (code.default_message().to_string(), None)
            }
        };

        let body = Json(ErrorResponse {
            code: code.code(),
            error: code.as_str().to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}
