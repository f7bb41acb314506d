//! Users Domain
//!
//! A server-rendered user resource: list, show, create, edit and delete
//! users over HTML forms, with JSON accepted on input and offered on
//! delete.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, flash cookie, rendering
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Controller  │  ← Per-operation decisions: render, redirect, negotiate
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │    Store    │  ← Persistence (trait + in-memory and Postgres)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← User, input params, validation
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_users::{InMemoryUserStore, UserController, handlers, templates};
//!
//! let controller = UserController::new(InMemoryUserStore::new());
//! let engine = templates::engine().expect("templates");
//! let router = handlers::router(controller, Arc::new(engine));
//! ```

pub mod controller;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod store;
pub mod templates;
pub mod views;

pub use controller::{Directive, Reply, UserController};
pub use error::{UserError, UserResult};
pub use models::{User, UserParams, ValidationErrorSet};
pub use postgres::PgUserStore;
pub use store::{InMemoryUserStore, StoreError, StoreResult, UserStore};
pub use views::Page;
