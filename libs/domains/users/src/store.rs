use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{EMAIL_TAKEN, User, ValidationErrorSet};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("user '{0}' not found")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for users.
///
/// The `validate_and_*` operations run every check before writing. A
/// non-empty [`ValidationErrorSet`] means nothing was written; an `Err`
/// means the store itself failed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Every user, oldest first.
    async fn all(&self) -> StoreResult<Vec<User>>;

    /// Look a user up by its id as it appears in the URL. An id that does
    /// not parse is simply not found.
    async fn find(&self, id: &str) -> StoreResult<User>;

    /// Validate and insert, assigning `id` and timestamps on success.
    async fn validate_and_create(&self, user: &mut User) -> StoreResult<ValidationErrorSet>;

    /// Validate and update an existing user, refreshing `updated_at`.
    async fn validate_and_save(&self, user: &mut User) -> StoreResult<ValidationErrorSet>;

    async fn destroy(&self, user: &User) -> StoreResult<()>;
}

/// Parse a URL id, mapping garbage to `NotFound`.
pub fn parse_id(id: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(id.trim()).map_err(|_| StoreError::NotFound(id.to_string()))
}

/// In-memory implementation of UserStore (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

fn email_taken(users: &HashMap<Uuid, User>, user: &User) -> bool {
    let email = user.normalized_email();
    users
        .values()
        .any(|other| other.id != user.id && other.normalized_email() == email)
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn all(&self) -> StoreResult<Vec<User>> {
        let users = self.users.read().await;
        let mut result: Vec<User> = users.values().cloned().collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(result)
    }

    async fn find(&self, id: &str) -> StoreResult<User> {
        let uuid = parse_id(id)?;
        let users = self.users.read().await;
        users
            .get(&uuid)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn validate_and_create(&self, user: &mut User) -> StoreResult<ValidationErrorSet> {
        let mut errors = user.validate_fields();

        // Uniqueness check and insert share one guard.
        let mut users = self.users.write().await;
        if errors.get("email").is_empty() && email_taken(&users, user) {
            errors.add("email", EMAIL_TAKEN);
        }
        if errors.has_any() {
            return Ok(errors);
        }

        let id = Uuid::now_v7();
        let now = Utc::now();
        user.id = Some(id);
        user.created_at = Some(now);
        user.updated_at = Some(now);
        users.insert(id, user.clone());

        tracing::info!(user_id = %id, "Created user");
        Ok(errors)
    }

    async fn validate_and_save(&self, user: &mut User) -> StoreResult<ValidationErrorSet> {
        let Some(id) = user.id else {
            return Err(StoreError::NotFound("(unsaved)".to_string()));
        };
        let mut errors = user.validate_fields();

        let mut users = self.users.write().await;
        if !users.contains_key(&id) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        if errors.get("email").is_empty() && email_taken(&users, user) {
            errors.add("email", EMAIL_TAKEN);
        }
        if errors.has_any() {
            return Ok(errors);
        }

        user.updated_at = Some(Utc::now());
        users.insert(id, user.clone());

        tracing::info!(user_id = %id, "Updated user");
        Ok(errors)
    }

    async fn destroy(&self, user: &User) -> StoreResult<()> {
        let Some(id) = user.id else {
            return Err(StoreError::NotFound("(unsaved)".to_string()));
        };

        let mut users = self.users.write().await;
        if users.remove(&id).is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }

        tracing::info!(user_id = %id, "Deleted user");
        Ok(())
    }
}
