//! Handler tests for the users domain
//!
//! These drive the user routes through the shared middleware stack
//! (method override, 404 fallback) and check:
//! - Status codes and redirect targets
//! - Rendered pages and negotiated JSON
//! - Flash notices carried in the `_flash` cookie
//! - Error responses for unreadable bodies and store faults

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, Response, StatusCode, header};
use axum_helpers::create_router;
use domain_users::models::{EMAIL_TAKEN, NAME_BLANK};
use domain_users::*;
use http_body_util::BodyExt;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt; // For oneshot()

const FORM: &str = "application/x-www-form-urlencoded";

fn app(store: Arc<InMemoryUserStore>) -> Router {
    let engine = Arc::new(templates::engine().unwrap());
    create_router(handlers::router(UserController::from_arc(store), engine))
}

fn request(method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder().method(method).uri(uri)
}

fn form(method: &str, uri: &str, body: &str) -> Request<Body> {
    request(method, uri)
        .header(header::CONTENT_TYPE, FORM)
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn text_body(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response<Body>) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

/// The `_flash=...` pair set by a response, ready to send back.
fn flash_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("_flash="))
        .and_then(|value| value.split(';').next())
        .map(str::to_owned)
}

async fn seed(store: &InMemoryUserStore, name: &str, email: &str) -> User {
    let mut user = User {
        name: name.to_string(),
        email: email.to_string(),
        ..User::default()
    };
    let errors = store.validate_and_create(&mut user).await.unwrap();
    assert!(errors.is_empty());
    user
}

#[tokio::test]
async fn test_create_then_show() {
    let store = Arc::new(InMemoryUserStore::new());

    let response = app(store.clone())
        .oneshot(form("POST", "/users", "name=Ada+Lovelace&email=ada%40example.com"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/users/");
    let cookie = flash_cookie(response.headers()).unwrap();
    assert!(cookie.contains("success"));

    let users = store.all().await.unwrap();
    assert_eq!(users.len(), 1);
    let id = users[0].id.unwrap();

    let response = app(store)
        .oneshot(
            request("GET", &format!("/users/{id}"))
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        flash_cookie(response.headers()).is_some_and(|c| c == "_flash="),
        "rendering must clear the notice"
    );
    let html = text_body(response).await;
    assert!(html.contains("Ada Lovelace"));
    assert!(html.contains("ada@example.com"));
    assert!(html.contains("User was created successfully"));
}

#[tokio::test]
async fn test_create_accepts_json() {
    let store = Arc::new(InMemoryUserStore::new());

    let response = app(store.clone())
        .oneshot(
            request("POST", "/users/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "name": "Grace", "email": "grace@example.com" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(store.all().await.unwrap()[0].name, "Grace");
}

#[tokio::test]
async fn test_create_blank_name_rerenders_form() {
    let store = Arc::new(InMemoryUserStore::new());

    let response = app(store.clone())
        .oneshot(
            request("POST", "/users")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "name": "" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = text_body(response).await;
    assert!(html.contains(NAME_BLANK));
    assert!(html.contains(r#"action="/users""#));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_create_duplicate_email_rerenders_form() {
    let store = Arc::new(InMemoryUserStore::new());
    seed(&store, "Ada", "ada@example.com").await;

    let response = app(store.clone())
        .oneshot(form("POST", "/users", "name=Other&email=ADA%40example.com"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = text_body(response).await;
    assert!(html.contains(EMAIL_TAKEN));
    assert!(html.contains(r#"value="Other""#));
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_unknown_id_redirects_with_warning() {
    let store = Arc::new(InMemoryUserStore::new());
    seed(&store, "Ada", "ada@example.com").await;

    let requests = [
        request("GET", "/users/999").body(Body::empty()).unwrap(),
        request("GET", "/users/999/edit").body(Body::empty()).unwrap(),
        form("PUT", "/users/999", "name=Nobody"),
        form("POST", "/users/999", "_method=PATCH&name=Nobody"),
        request("DELETE", "/users/999").body(Body::empty()).unwrap(),
        request("DELETE", "/users/0190b5a4-8f3e-7c1a-9d2b-3e4f5a6b7c8d")
            .body(Body::empty())
            .unwrap(),
    ];

    for req in requests {
        let uri = req.uri().clone();
        let response = app(store.clone()).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY, "{uri}");
        assert_eq!(location(&response), "/users", "{uri}");
        let cookie = flash_cookie(response.headers()).unwrap();
        assert!(cookie.contains("warning"), "{uri}");
    }

    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_update_changes_bound_fields_only() {
    let store = Arc::new(InMemoryUserStore::new());
    let user = seed(&store, "Ada", "ada@example.com").await;
    let id = user.id.unwrap();

    let response = app(store.clone())
        .oneshot(form("POST", &format!("/users/{id}"), "_method=PUT&name=Ada+Lovelace"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/users/");

    let updated = store.find(&id.to_string()).await.unwrap();
    assert_eq!(updated.id, Some(id));
    assert_eq!(updated.name, "Ada Lovelace");
    assert_eq!(updated.email, "ada@example.com");
    assert_eq!(updated.created_at, user.created_at);
}

#[tokio::test]
async fn test_update_invalid_keeps_stored_user() {
    let store = Arc::new(InMemoryUserStore::new());
    let user = seed(&store, "Ada", "ada@example.com").await;
    let id = user.id.unwrap();

    let response = app(store.clone())
        .oneshot(form("PATCH", &format!("/users/{id}"), "email=not-an-email"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = text_body(response).await;
    assert!(html.contains("not-an-email"));
    assert!(html.contains(r#"value="PUT""#));

    assert_eq!(store.find(&id.to_string()).await.unwrap().email, "ada@example.com");
}

#[tokio::test]
async fn test_destroy_json_then_gone() {
    let store = Arc::new(InMemoryUserStore::new());
    let user = seed(&store, "Ada", "ada@example.com").await;
    let uri = format!("/users/{}", user.id.unwrap());

    let response = app(store.clone())
        .oneshot(
            request("DELETE", &uri)
                .header(header::ACCEPT, "application/json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(flash_cookie(response.headers()).unwrap().contains("success"));
    let destroyed: User = serde_json::from_str(&text_body(response).await).unwrap();
    assert_eq!(destroyed, user);
    assert!(store.is_empty().await);

    let response = app(store.clone())
        .oneshot(request("GET", &uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);

    let response = app(store)
        .oneshot(request("DELETE", &uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&response), "/users");
}

#[tokio::test]
async fn test_destroy_from_html_form() {
    let store = Arc::new(InMemoryUserStore::new());
    let user = seed(&store, "Ada", "ada@example.com").await;

    let response = app(store.clone())
        .oneshot(
            request("POST", &format!("/users/{}", user.id.unwrap()))
                .header(header::CONTENT_TYPE, FORM)
                .header(header::ACCEPT, "text/html,application/xhtml+xml,*/*;q=0.8")
                .body(Body::from("_method=DELETE"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = text_body(response).await;
    assert!(html.contains("Ada was deleted"));
    assert!(html.contains("User was destroyed successfully"));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_destroy_json_only_controller() {
    let store = Arc::new(InMemoryUserStore::new());
    let user = seed(&store, "Ada", "ada@example.com").await;

    let controller =
        UserController::from_arc(store).with_destroy_formats([axum_helpers::Format::Json]);
    let router = create_router(handlers::router(
        controller,
        Arc::new(templates::engine().unwrap()),
    ));

    let response = router
        .oneshot(
            request("DELETE", &format!("/users/{}", user.id.unwrap()))
                .header(header::ACCEPT, "text/html")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
}

#[tokio::test]
async fn test_index_lists_users_with_and_without_slash() {
    let store = Arc::new(InMemoryUserStore::new());
    seed(&store, "Ada", "ada@example.com").await;
    seed(&store, "Grace", "grace@example.com").await;

    for uri in ["/users", "/users/"] {
        let response = app(store.clone())
            .oneshot(request("GET", uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let html = text_body(response).await;
        let ada = html.find("Ada").unwrap();
        let grace = html.find("Grace").unwrap();
        assert!(ada < grace, "oldest first");
    }
}

#[tokio::test]
async fn test_new_form() {
    let response = app(Arc::new(InMemoryUserStore::new()))
        .oneshot(request("GET", "/users/new").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = text_body(response).await;
    assert!(html.contains(r#"name="email""#));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let store = Arc::new(InMemoryUserStore::new());

    let response = app(store.clone())
        .oneshot(
            request("POST", "/users")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"name\":"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_str(&text_body(response).await).unwrap();
    assert_eq!(body["error"], "INVALID_BODY");
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_unsupported_content_type() {
    let response = app(Arc::new(InMemoryUserStore::new()))
        .oneshot(
            request("POST", "/users")
                .header(header::CONTENT_TYPE, "text/csv")
                .body(Body::from("name,email"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_pending_notices_survive_redirect_chain() {
    let store = Arc::new(InMemoryUserStore::new());

    // Missing user: warning, then the index consumes it.
    let response = app(store.clone())
        .oneshot(request("GET", "/users/missing").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let cookie = flash_cookie(response.headers()).unwrap();

    let response = app(store)
        .oneshot(
            request("GET", "/users")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = text_body(response).await;
    assert!(html.contains("flash-warning"));
    assert!(html.contains("User not found !"));
}

#[tokio::test]
async fn test_flash_cookie_stays_bounded_without_rendering() {
    let store = Arc::new(InMemoryUserStore::new());
    let mut cookie: Option<String> = None;

    for i in 0..120 {
        let mut builder =
            request("POST", "/users").header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = &cookie {
            builder = builder.header(header::COOKIE, cookie.as_str());
        }
        let body = json!({ "name": format!("User {i}"), "email": format!("user{i}@example.com") });

        let response = app(store.clone())
            .oneshot(builder.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        cookie = flash_cookie(response.headers());
    }

    let cookie = cookie.unwrap();
    assert!(cookie.len() < 512, "flash cookie grew to {} bytes", cookie.len());
    assert!(cookie.contains("success"));
    assert_eq!(store.len().await, 120);
}

/// A store whose backend is always down.
struct UnavailableStore;

#[async_trait]
impl UserStore for UnavailableStore {
    async fn all(&self) -> StoreResult<Vec<User>> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn find(&self, _id: &str) -> StoreResult<User> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn validate_and_create(&self, _user: &mut User) -> StoreResult<ValidationErrorSet> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn validate_and_save(&self, _user: &mut User) -> StoreResult<ValidationErrorSet> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn destroy(&self, _user: &User) -> StoreResult<()> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

fn unavailable_app() -> Router {
    create_router(handlers::router(
        UserController::new(UnavailableStore),
        Arc::new(templates::engine().unwrap()),
    ))
}

#[tokio::test]
async fn test_index_failure_redirects_home() {
    let response = unavailable_app()
        .oneshot(request("GET", "/users").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&response), "/");
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    assert!(flash_cookie(response.headers()).unwrap().contains("error"));
}

#[tokio::test]
async fn test_store_fault_is_internal_error() {
    let response = unavailable_app()
        .oneshot(form("POST", "/users", "name=Ada&email=ada%40example.com"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = text_body(response).await;
    assert!(body.contains("STORAGE_ERROR"));
    assert!(!body.contains("connection refused"));

    let response = unavailable_app()
        .oneshot(request("GET", "/users/999").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_unknown_route_is_structured_404() {
    let response = app(Arc::new(InMemoryUserStore::new()))
        .oneshot(request("GET", "/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(text_body(response).await.contains("NOT_FOUND"));
}
