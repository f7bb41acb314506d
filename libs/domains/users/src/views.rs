//! Typed view models, one per page.

use axum_helpers::{Flash, TemplateEngine, TemplateError};
use serde::Serialize;

use crate::models::{User, ValidationErrorSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexView {
    pub users: Vec<User>,
}

/// New and edit forms: the user as entered so far and what is wrong with
/// it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormView {
    pub user: User,
    pub errors: ValidationErrorSet,
}

impl FormView {
    pub fn blank(user: User) -> Self {
        Self {
            user,
            errors: ValidationErrorSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShowView {
    pub user: User,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    Index(IndexView),
    New(FormView),
    Show(ShowView),
    Edit(FormView),
    Destroyed(ShowView),
}

impl Page {
    pub fn template(&self) -> &'static str {
        match self {
            Page::Index(_) => "users/index",
            Page::New(_) => "users/new",
            Page::Show(_) => "users/show",
            Page::Edit(_) => "users/edit",
            Page::Destroyed(_) => "users/destroyed",
        }
    }

    pub fn render(&self, engine: &TemplateEngine, flash: &Flash) -> Result<String, TemplateError> {
        let name = self.template();
        match self {
            Page::Index(view) => engine.render_page(name, view, flash),
            Page::New(view) | Page::Edit(view) => engine.render_page(name, view, flash),
            Page::Show(view) | Page::Destroyed(view) => engine.render_page(name, view, flash),
        }
    }
}
