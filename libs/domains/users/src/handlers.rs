use axum::{
    Json, Router,
    extract::{Path, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;
use axum_helpers::{Flash, Format, Payload, TemplateEngine, negotiate, redirect};
use std::sync::Arc;

use crate::controller::{Directive, Reply, UserController};
use crate::error::UserResult;
use crate::store::UserStore;
use crate::views::{Page, ShowView};

/// Shared state of the user routes.
pub struct UsersState<S> {
    pub controller: UserController<S>,
    pub templates: Arc<TemplateEngine>,
}

impl<S> Clone for UsersState<S> {
    fn clone(&self) -> Self {
        Self {
            controller: self.controller.clone(),
            templates: Arc::clone(&self.templates),
        }
    }
}

/// Create the users router.
///
/// Paths are absolute so that both `/users` and `/users/` reach the index.
/// `templates` must already hold the user pages (see
/// [`crate::templates::register`]). Forms send PUT and DELETE through a
/// `_method` field, so serve this router behind
/// [`axum_helpers::with_method_override`].
pub fn router<S: UserStore + 'static>(
    controller: UserController<S>,
    templates: Arc<TemplateEngine>,
) -> Router {
    let state = UsersState {
        controller,
        templates,
    };

    Router::new()
        .route("/users", get(index::<S>).post(create::<S>))
        .route("/users/", get(index::<S>).post(create::<S>))
        .route("/users/new", get(new_form::<S>))
        .route(
            "/users/{id}",
            get(show::<S>)
                .put(update::<S>)
                .patch(update::<S>)
                .delete(destroy::<S>),
        )
        .route("/users/{id}/edit", get(edit::<S>))
        .with_state(state)
}

/// List users
///
/// GET /users
async fn index<S: UserStore>(
    State(state): State<UsersState<S>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> UserResult<Response> {
    let reply = state.controller.index().await?;
    respond(&state, reply, jar, &headers)
}

/// Blank user form
///
/// GET /users/new
async fn new_form<S: UserStore>(
    State(state): State<UsersState<S>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> UserResult<Response> {
    let reply = state.controller.new_form().await?;
    respond(&state, reply, jar, &headers)
}

/// Create a user from a form or JSON body
///
/// POST /users
async fn create<S: UserStore>(
    State(state): State<UsersState<S>>,
    jar: CookieJar,
    headers: HeaderMap,
    payload: Payload,
) -> UserResult<Response> {
    let reply = state.controller.create(&payload).await?;
    respond(&state, reply, jar, &headers)
}

/// Show one user
///
/// GET /users/{id}
async fn show<S: UserStore>(
    State(state): State<UsersState<S>>,
    Path(id): Path<String>,
    jar: CookieJar,
    headers: HeaderMap,
) -> UserResult<Response> {
    let reply = state.controller.show(&id).await?;
    respond(&state, reply, jar, &headers)
}

/// Edit form for one user
///
/// GET /users/{id}/edit
async fn edit<S: UserStore>(
    State(state): State<UsersState<S>>,
    Path(id): Path<String>,
    jar: CookieJar,
    headers: HeaderMap,
) -> UserResult<Response> {
    let reply = state.controller.edit(&id).await?;
    respond(&state, reply, jar, &headers)
}

/// Update a user
///
/// PUT /users/{id}
async fn update<S: UserStore>(
    State(state): State<UsersState<S>>,
    Path(id): Path<String>,
    jar: CookieJar,
    headers: HeaderMap,
    payload: Payload,
) -> UserResult<Response> {
    let reply = state.controller.update(&id, &payload).await?;
    respond(&state, reply, jar, &headers)
}

/// Delete a user
///
/// DELETE /users/{id}
async fn destroy<S: UserStore>(
    State(state): State<UsersState<S>>,
    Path(id): Path<String>,
    jar: CookieJar,
    headers: HeaderMap,
) -> UserResult<Response> {
    let reply = state.controller.destroy(&id).await?;
    respond(&state, reply, jar, &headers)
}

/// Turn a controller reply into a response.
///
/// Notices still waiting in the cookie are shown together with the new
/// ones on the next HTML page, whether that is this response or the target
/// of a redirect.
fn respond<S: UserStore>(
    state: &UsersState<S>,
    reply: Reply,
    jar: CookieJar,
    headers: &HeaderMap,
) -> UserResult<Response> {
    let mut flash = Flash::from_jar(&jar);
    flash.merge(reply.flash);

    match reply.directive {
        Directive::Redirect { status, location } => {
            let jar = flash.store(jar);
            Ok((jar, redirect(status, location)).into_response())
        }
        Directive::Render { status, page } => render(state, status, &page, &flash, jar),
        Directive::Negotiate { status, user } => {
            let format = negotiate(headers, state.controller.destroy_formats());
            if format == Format::Json {
                let jar = flash.store(jar);
                return Ok((status, jar, Json(user)).into_response());
            }
            let page = Page::Destroyed(ShowView { user });
            render(state, status, &page, &flash, jar)
        }
    }
}

fn render<S: UserStore>(
    state: &UsersState<S>,
    status: axum::http::StatusCode,
    page: &Page,
    flash: &Flash,
    jar: CookieJar,
) -> UserResult<Response> {
    let html = page.render(&state.templates, flash)?;
    Ok((status, Flash::clear(jar), Html(html)).into_response())
}
