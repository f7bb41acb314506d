use axum::{
    http::{HeaderValue, StatusCode, header::{CACHE_CONTROL, LOCATION}},
    response::{IntoResponse, Response},
};

/// Redirect with an exact status code.
///
/// `axum::response::Redirect` only offers 303, 307 and 308; HTML flows here
/// also need 301 and 302. Responses carry `Cache-Control: no-store` so a
/// browser does not replay a 301 once the condition behind it is gone.
pub fn redirect(status: StatusCode, location: &str) -> Response {
    match HeaderValue::try_from(location) {
        Ok(value) => (
            status,
            [
                (LOCATION, value),
                (CACHE_CONTROL, HeaderValue::from_static("no-store")),
            ],
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Invalid redirect location {:?}: {}", location, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moved_permanently() {
        let response = redirect(StatusCode::MOVED_PERMANENTLY, "/users");
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[LOCATION], "/users");
        assert_eq!(response.headers()[CACHE_CONTROL], "no-store");
    }

    #[test]
    fn test_found() {
        let response = redirect(StatusCode::FOUND, "/users/");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "/users/");
        assert_eq!(response.headers()[CACHE_CONTROL], "no-store");
    }

    #[test]
    fn test_invalid_location() {
        let response = redirect(StatusCode::FOUND, "/users\n");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
