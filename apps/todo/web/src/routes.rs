//! Router composition: landing page, user resource, health endpoints.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;
use axum_helpers::{
    AppError, Flash, HealthCheckFuture, TemplateEngine, TemplateError, health_router,
    run_health_checks,
};
use domain_users::{UserController, handlers, templates};
use std::sync::Arc;

use crate::state::{AppState, Backend};

pub const HOME_TEMPLATE: &str = "home";

/// Shared layout, the landing page and the user pages.
pub fn template_engine() -> Result<TemplateEngine, TemplateError> {
    let mut engine = templates::engine()?;
    engine.register(HOME_TEMPLATE, include_str!("../templates/home.hbs"))?;
    Ok(engine)
}

/// All application routes, without the shared middleware stack.
pub fn routes(state: &AppState) -> Router {
    let users = match &state.backend {
        Backend::Memory(store) => {
            handlers::router(UserController::new(store.clone()), state.templates.clone())
        }
        Backend::Postgres { store, .. } => {
            handlers::router(UserController::new(store.clone()), state.templates.clone())
        }
    };

    Router::new()
        .route("/", get(home))
        .with_state(state.templates.clone())
        .merge(users)
        .merge(health_router(state.config.app))
        .merge(ready_router(state.clone()))
}

/// Landing page; also where pending notices end up when the user list
/// cannot be loaded.
async fn home(
    State(templates): State<Arc<TemplateEngine>>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let flash = Flash::from_jar(&jar);
    let html = templates.render_page(HOME_TEMPLATE, &(), &flash)?;
    Ok((StatusCode::OK, Flash::clear(jar), Html(html)).into_response())
}

/// Creates a router with the /ready endpoint that checks the database when
/// one backs the store.
fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(ready_handler))
        .with_state(state)
}

async fn ready_handler(State(state): State<AppState>) -> Response {
    let mut checks: Vec<(&str, HealthCheckFuture<'_>)> = Vec::new();

    if let Some(db) = state.backend.connection() {
        checks.push((
            "database",
            Box::pin(async move {
                database::postgres::check_health(db)
                    .await
                    .map_err(|e| format!("Database ping failed: {}", e))
            }),
        ));
    }

    run_health_checks(checks).await
}
