//! Re-dispatch HTML form posts with the method they ask for.
//!
//! Browsers can only submit forms with GET and POST. A POST that carries
//! `_method=PUT|PATCH|DELETE` in a URL-encoded body, or an
//! `X-HTTP-Method-Override` header, is routed as that method instead.

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::Request,
    http::{HeaderName, Method, header::CONTENT_TYPE},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};

use crate::errors::AppError;

pub const METHOD_FIELD: &str = "_method";
pub static METHOD_OVERRIDE_HEADER: HeaderName = HeaderName::from_static("x-http-method-override");

const FORM: &str = "application/x-www-form-urlencoded";
const MAX_FORM_BYTES: usize = 2 * 1024 * 1024;

fn allowed(candidate: &str) -> Option<Method> {
    match candidate.trim().to_ascii_uppercase().as_str() {
        "PUT" => Some(Method::PUT),
        "PATCH" => Some(Method::PATCH),
        "DELETE" => Some(Method::DELETE),
        _ => None,
    }
}

fn is_form(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|media| media.trim().eq_ignore_ascii_case(FORM))
}

fn method_from_form(body: &[u8]) -> Option<Method> {
    serde_urlencoded::from_bytes::<Vec<(String, String)>>(body)
        .ok()?
        .into_iter()
        .find(|(key, _)| key == METHOD_FIELD)
        .and_then(|(_, value)| allowed(&value))
}

/// Middleware performing the override. Only POST requests are considered.
pub async fn method_override(request: Request, next: Next) -> Response {
    if request.method() != Method::POST {
        return next.run(request).await;
    }

    if let Some(method) = request
        .headers()
        .get(&METHOD_OVERRIDE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(allowed)
    {
        let mut request = request;
        tracing::debug!(%method, "Overriding POST from header");
        *request.method_mut() = method;
        return next.run(request).await;
    }

    if !is_form(&request) {
        return next.run(request).await;
    }

    let (mut parts, body) = request.into_parts();
    let bytes = match to_bytes(body, MAX_FORM_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return AppError::BadRequest(format!("Failed to read form body: {}", e))
                .into_response();
        }
    };

    if let Some(method) = method_from_form(&bytes) {
        tracing::debug!(%method, "Overriding POST from form field");
        parts.method = method;
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

/// Wrap `router` so the override happens before route matching.
///
/// `Router::layer` middleware runs after a route has been selected, which
/// is too late to change the method. Nesting the router as the fallback of
/// an outer router moves the middleware in front of dispatch.
pub fn with_method_override(router: Router) -> Router {
    Router::new()
        .fallback_service(router)
        .layer(middleware::from_fn(method_override))
}
