//! The user resource controller.
//!
//! Each operation maps a request onto the store and decides the outcome:
//! a page to render, a redirect, or a negotiated representation, plus any
//! notices to show. Expected failures (unknown id, invalid input) become
//! outcomes here; store faults and unreadable bodies are returned as
//! [`UserError`] for the HTTP boundary to report.

use axum::http::StatusCode;
use axum_helpers::{Flash, Format, Level, Payload};
use std::sync::Arc;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserParams};
use crate::store::{StoreError, UserStore};
use crate::views::{FormView, IndexView, Page, ShowView};

pub const USERS_PATH: &str = "/users";
pub const USERS_INDEX_PATH: &str = "/users/";
pub const HOME_PATH: &str = "/";

pub const LOAD_FAILED: &str = "Users could not be loaded.";
pub const NOT_FOUND: &str = "User not found !";
pub const CREATED: &str = "User was created successfully";
pub const UPDATED: &str = "User was updated successfully";
pub const DESTROYED: &str = "User was destroyed successfully";

#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Render { status: StatusCode, page: Page },
    Redirect { status: StatusCode, location: &'static str },
    /// Respond with `user` in whichever format the client prefers.
    Negotiate { status: StatusCode, user: User },
}

/// Outcome of one operation: what to send and the notices raised on the
/// way.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub directive: Directive,
    pub flash: Flash,
}

impl Reply {
    fn new(directive: Directive) -> Self {
        Self {
            directive,
            flash: Flash::new(),
        }
    }

    fn render(status: StatusCode, page: Page) -> Self {
        Self::new(Directive::Render { status, page })
    }

    fn redirect(status: StatusCode, location: &'static str) -> Self {
        Self::new(Directive::Redirect { status, location })
    }

    fn with_notice(mut self, level: Level, message: &str) -> Self {
        self.flash.add(level, message);
        self
    }

    pub fn status(&self) -> StatusCode {
        match &self.directive {
            Directive::Render { status, .. }
            | Directive::Redirect { status, .. }
            | Directive::Negotiate { status, .. } => *status,
        }
    }
}

pub struct UserController<S> {
    store: Arc<S>,
    destroy_formats: Vec<Format>,
}

impl<S> Clone for UserController<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            destroy_formats: self.destroy_formats.clone(),
        }
    }
}

impl<S: UserStore> UserController<S> {
    pub fn new(store: S) -> Self {
        Self::from_arc(Arc::new(store))
    }

    pub fn from_arc(store: Arc<S>) -> Self {
        Self {
            store,
            destroy_formats: vec![Format::Html, Format::Json],
        }
    }

    /// Formats Destroy may answer with, most preferred first. An empty list
    /// keeps the current setting.
    pub fn with_destroy_formats(mut self, formats: impl Into<Vec<Format>>) -> Self {
        let formats = formats.into();
        if !formats.is_empty() {
            self.destroy_formats = formats;
        }
        self
    }

    pub fn destroy_formats(&self) -> &[Format] {
        &self.destroy_formats
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn not_found() -> Reply {
        tracing::debug!("User not found, redirecting to the index");
        Reply::redirect(StatusCode::MOVED_PERMANENTLY, USERS_PATH)
            .with_notice(Level::Warning, NOT_FOUND)
    }

    async fn find(&self, id: &str) -> UserResult<User> {
        match self.store.find(id).await {
            Ok(user) => Ok(user),
            Err(StoreError::NotFound(_)) => Err(UserError::NotFound(id.to_string())),
            Err(e) => Err(UserError::storage("finding user", e)),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn index(&self) -> UserResult<Reply> {
        match self.store.all().await {
            Ok(users) => Ok(Reply::render(
                StatusCode::OK,
                Page::Index(IndexView { users }),
            )),
            Err(e) => {
                tracing::error!(error = %e, "Failed to load users");
                Ok(Reply::redirect(StatusCode::MOVED_PERMANENTLY, HOME_PATH)
                    .with_notice(Level::Error, LOAD_FAILED))
            }
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn new_form(&self) -> UserResult<Reply> {
        Ok(Reply::render(
            StatusCode::OK,
            Page::New(FormView::blank(User::default())),
        ))
    }

    #[tracing::instrument(skip(self, payload))]
    pub async fn create(&self, payload: &Payload) -> UserResult<Reply> {
        let params: UserParams = payload.bind()?;
        let mut user = User::from(params);

        let errors = self
            .store
            .validate_and_create(&mut user)
            .await
            .map_err(|e| UserError::storage("creating user", e))?;

        if errors.has_any() {
            tracing::info!(errors = errors.len(), "Rejected invalid user");
            return Ok(Reply::render(
                StatusCode::UNPROCESSABLE_ENTITY,
                Page::New(FormView { user, errors }),
            ));
        }

        Ok(Reply::redirect(StatusCode::FOUND, USERS_INDEX_PATH)
            .with_notice(Level::Success, CREATED))
    }

    #[tracing::instrument(skip(self))]
    pub async fn show(&self, id: &str) -> UserResult<Reply> {
        let user = match self.find(id).await {
            Ok(user) => user,
            Err(UserError::NotFound(_)) => return Ok(Self::not_found()),
            Err(e) => return Err(e),
        };

        Ok(Reply::render(StatusCode::OK, Page::Show(ShowView { user })))
    }

    #[tracing::instrument(skip(self))]
    pub async fn edit(&self, id: &str) -> UserResult<Reply> {
        let user = match self.find(id).await {
            Ok(user) => user,
            Err(UserError::NotFound(_)) => return Ok(Self::not_found()),
            Err(e) => return Err(e),
        };

        Ok(Reply::render(
            StatusCode::OK,
            Page::Edit(FormView::blank(user)),
        ))
    }

    /// The lookup comes first: an unknown id redirects even when the body
    /// is unreadable.
    #[tracing::instrument(skip(self, payload))]
    pub async fn update(&self, id: &str, payload: &Payload) -> UserResult<Reply> {
        let mut user = match self.find(id).await {
            Ok(user) => user,
            Err(UserError::NotFound(_)) => return Ok(Self::not_found()),
            Err(e) => return Err(e),
        };

        let params: UserParams = payload.bind()?;
        user.apply(params);

        let errors = match self.store.validate_and_save(&mut user).await {
            Ok(errors) => errors,
            // Deleted between the lookup and the save.
            Err(StoreError::NotFound(_)) => return Ok(Self::not_found()),
            Err(e) => return Err(UserError::storage("updating user", e)),
        };

        if errors.has_any() {
            tracing::info!(errors = errors.len(), "Rejected invalid update");
            return Ok(Reply::render(
                StatusCode::UNPROCESSABLE_ENTITY,
                Page::Edit(FormView { user, errors }),
            ));
        }

        Ok(Reply::redirect(StatusCode::FOUND, USERS_INDEX_PATH)
            .with_notice(Level::Success, UPDATED))
    }

    #[tracing::instrument(skip(self))]
    pub async fn destroy(&self, id: &str) -> UserResult<Reply> {
        let user = match self.find(id).await {
            Ok(user) => user,
            Err(UserError::NotFound(_)) => return Ok(Self::not_found()),
            Err(e) => return Err(e),
        };

        match self.store.destroy(&user).await {
            Ok(()) => {}
            Err(StoreError::NotFound(_)) => return Ok(Self::not_found()),
            Err(e) => return Err(UserError::storage("destroying user", e)),
        }

        Ok(Reply::new(Directive::Negotiate {
            status: StatusCode::OK,
            user,
        })
        .with_notice(Level::Success, DESTROYED))
    }
}
