use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, BindError, TemplateError};
use thiserror::Error;
use tracing_error::SpanTrace;

use crate::models::ValidationErrorSet;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Validation failed")]
    Validation(ValidationErrorSet),

    #[error("Request binding failed: {0}")]
    Binding(#[from] BindError),

    #[error("{context}: {source}")]
    Storage {
        context: &'static str,
        #[source]
        source: StoreError,
        span_trace: SpanTrace,
    },

    #[error("Rendering failed: {0}")]
    Render(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    /// Wrap a store failure with what was being attempted and the active
    /// span trace.
    pub fn storage(context: &'static str, source: StoreError) -> Self {
        UserError::Storage {
            context,
            source,
            span_trace: SpanTrace::capture(),
        }
    }
}

impl From<TemplateError> for UserError {
    fn from(err: TemplateError) -> Self {
        UserError::Render(err.to_string())
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => AppError::NotFound(format!("User {} not found", id)),
            UserError::Validation(errors) => {
                AppError::Validation(serde_json::to_value(&errors).unwrap_or_default())
            }
            UserError::Binding(e) => AppError::Binding(e),
            UserError::Storage {
                context,
                source,
                span_trace,
            } => AppError::Storage(format!("{}: {}\n{}", context, source, span_trace)),
            UserError::Render(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
