//! Type-safe error codes for error responses.
//!
//! Each code carries:
//! - String representation for clients (e.g., "INVALID_BODY")
//! - Integer code for logging and monitoring (e.g., 1003)
//! - Default human-readable message
//!
//! # Example
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::InvalidBody;
//! assert_eq!(code.as_str(), "INVALID_BODY");
//! assert_eq!(code.code(), 1003);
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Submitted data failed domain validation
    ValidationError,

    /// Request body could not be parsed into the target type
    InvalidBody,

    /// Request body has a content type no binder understands
    UnsupportedMediaType,

    /// Requested resource was not found
    NotFound,

    /// HTTP method is not allowed on the matched route
    MethodNotAllowed,

    /// Generic malformed request
    BadRequest,

    // Server errors
    /// An unexpected internal server error occurred
    InternalError,

    // Storage errors (2000-2999)
    /// The persistence layer failed unexpectedly
    StorageError,

    // Rendering errors (6000s)
    /// A view template failed to render
    TemplateError,
}

impl ErrorCode {
    /// Machine-readable identifier sent to clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidBody => "INVALID_BODY",
            Self::UnsupportedMediaType => "UNSUPPORTED_MEDIA_TYPE",
            Self::NotFound => "NOT_FOUND",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::BadRequest => "BAD_REQUEST",
            Self::InternalError => "INTERNAL_ERROR",
            Self::StorageError => "STORAGE_ERROR",
            Self::TemplateError => "TEMPLATE_ERROR",
        }
    }

    /// Integer code used in structured logs.
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::BadRequest => 1002,
            Self::InvalidBody => 1003,
            Self::NotFound => 1004,
            Self::InternalError => 1005,
            Self::UnsupportedMediaType => 1006,
            Self::MethodNotAllowed => 1007,
            Self::StorageError => 2003,
            Self::TemplateError => 6001,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Submitted data failed validation",
            Self::InvalidBody => "Failed to parse request body",
            Self::UnsupportedMediaType => "Unsupported request content type",
            Self::NotFound => "Resource not found",
            Self::MethodNotAllowed => "The HTTP method is not allowed for this resource",
            Self::BadRequest => "Bad request",
            Self::InternalError => "An internal server error occurred",
            Self::StorageError => "A storage error occurred",
            Self::TemplateError => "Failed to render the page",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
