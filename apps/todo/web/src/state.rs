//! Application state management.
//!
//! Users live either in PostgreSQL or, when no database is configured, in
//! process memory.

use axum_helpers::TemplateEngine;
use database::postgres::DatabaseConnection;
use domain_users::{InMemoryUserStore, PgUserStore};
use std::sync::Arc;

/// Where users are stored.
#[derive(Clone)]
pub enum Backend {
    Memory(InMemoryUserStore),
    Postgres {
        store: PgUserStore,
        db: DatabaseConnection,
    },
}

impl Backend {
    pub fn connection(&self) -> Option<&DatabaseConnection> {
        match self {
            Backend::Memory(_) => None,
            Backend::Postgres { db, .. } => Some(db),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    pub backend: Backend,
    /// Shared layout, the landing page and the user pages
    pub templates: Arc<TemplateEngine>,
}
