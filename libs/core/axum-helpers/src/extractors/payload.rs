//! Deferred request-body binding.
//!
//! Axum extractors run before the handler body, which would force a handler
//! to reject a malformed body before it had a chance to look anything up.
//! [`Payload`] only buffers the body; the handler decides when to bind it.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use thiserror::Error;

const JSON: &str = "application/json";
const FORM: &str = "application/x-www-form-urlencoded";

/// Failure to turn a request body into the requested type.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("unsupported content type '{0}'")]
    UnsupportedContentType(String),

    #[error("malformed JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed form body: {0}")]
    Form(#[from] serde_urlencoded::de::Error),
}

/// Buffered request body together with its declared content type.
///
/// # Example
/// ```ignore
/// async fn update(Path(id): Path<String>, payload: Payload) -> Result<Response, AppError> {
///     let record = store.find(&id).await?;
///     let params: Params = payload.bind()?;
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Payload {
    content_type: Option<String>,
    bytes: Bytes,
}

impl Payload {
    pub fn new(content_type: Option<&str>, bytes: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.map(str::to_owned),
            bytes: bytes.into(),
        }
    }

    /// JSON payload, mostly useful in tests.
    pub fn json(value: &serde_json::Value) -> Self {
        Self::new(Some(JSON), value.to_string())
    }

    /// URL-encoded form payload, mostly useful in tests.
    pub fn form(body: &str) -> Self {
        Self::new(Some(FORM), body.to_string())
    }

    /// The media type without parameters, lowercased.
    pub fn media_type(&self) -> Option<String> {
        self.content_type.as_deref().map(|value| {
            value
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Deserialize the body according to its content type.
    ///
    /// JSON (`application/json`, `*/*+json`) and URL-encoded forms are
    /// understood. A body-less request without a content type binds as an
    /// empty form.
    pub fn bind<T: DeserializeOwned>(&self) -> Result<T, BindError> {
        match self.media_type().as_deref() {
            Some(JSON) => Ok(serde_json::from_slice(&self.bytes)?),
            Some(media) if media.ends_with("+json") => Ok(serde_json::from_slice(&self.bytes)?),
            Some(FORM) => Ok(serde_urlencoded::from_bytes(&self.bytes)?),
            None if self.bytes.is_empty() => Ok(serde_urlencoded::from_bytes(&self.bytes)?),
            Some(other) => Err(BindError::UnsupportedContentType(other.to_string())),
            None => Err(BindError::UnsupportedContentType("(none)".to_string())),
        }
    }
}

impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| e.into_response())?;

        Ok(Self {
            content_type,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Params {
        name: Option<String>,
        email: Option<String>,
    }

    #[test]
    fn test_bind_json() {
        let payload = Payload::json(&serde_json::json!({ "name": "Ada" }));
        let params: Params = payload.bind().unwrap();
        assert_eq!(params.name.as_deref(), Some("Ada"));
        assert_eq!(params.email, None);
    }

    #[test]
    fn test_bind_form_with_charset_and_extra_fields() {
        let payload = Payload::new(
            Some("application/x-www-form-urlencoded; charset=UTF-8"),
            "name=Ada+Lovelace&email=ada%40example.com&_method=PUT",
        );
        let params: Params = payload.bind().unwrap();
        assert_eq!(params.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(params.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn test_bind_vendor_json() {
        let payload = Payload::new(Some("application/vnd.api+json"), r#"{"email":"a@b.co"}"#);
        let params: Params = payload.bind().unwrap();
        assert_eq!(params.email.as_deref(), Some("a@b.co"));
    }

    #[test]
    fn test_bind_empty_body_without_content_type() {
        let params: Params = Payload::default().bind().unwrap();
        assert_eq!(params, Params::default());
    }

    #[test]
    fn test_bind_rejects_malformed_json() {
        let payload = Payload::new(Some("application/json"), "{\"name\": ");
        assert!(matches!(payload.bind::<Params>(), Err(BindError::Json(_))));
    }

    #[test]
    fn test_bind_rejects_unknown_content_type() {
        let payload = Payload::new(Some("text/csv"), "name\nAda");
        match payload.bind::<Params>() {
            Err(BindError::UnsupportedContentType(media)) => assert_eq!(media, "text/csv"),
            other => panic!("expected unsupported content type, got {other:?}"),
        }
    }
}
