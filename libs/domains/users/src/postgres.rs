use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, SqlErr,
};
use uuid::Uuid;

use crate::{
    entity,
    models::{EMAIL_TAKEN, User, ValidationErrorSet},
    store::{StoreError, StoreResult, UserStore, parse_id},
};

/// PostgreSQL-backed [`UserStore`].
#[derive(Clone)]
pub struct PgUserStore {
    db: DatabaseConnection,
}

impl PgUserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn email_taken(&self, user: &User) -> StoreResult<bool> {
        let mut query = entity::Entity::find().filter(Expr::cust_with_values(
            "LOWER(email) = $1",
            [user.normalized_email()],
        ));
        if let Some(id) = user.id {
            query = query.filter(entity::Column::Id.ne(id));
        }

        Ok(query.one(&self.db).await.map_err(map_db_err)?.is_some())
    }

    /// Field checks plus uniqueness, the latter only for an otherwise
    /// valid email.
    async fn validate(&self, user: &User) -> StoreResult<ValidationErrorSet> {
        let mut errors = user.validate_fields();
        if errors.get("email").is_empty() && self.email_taken(user).await? {
            errors.add("email", EMAIL_TAKEN);
        }
        Ok(errors)
    }
}

fn map_db_err(err: DbErr) -> StoreError {
    match err {
        DbErr::Conn(e) => StoreError::Unavailable(e.to_string()),
        DbErr::ConnectionAcquire(e) => StoreError::Unavailable(e.to_string()),
        other => StoreError::Database(other.to_string()),
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn all(&self) -> StoreResult<Vec<User>> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::CreatedAt)
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn find(&self, id: &str) -> StoreResult<User> {
        let uuid = parse_id(id)?;

        entity::Entity::find_by_id(uuid)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .map(User::from)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn validate_and_create(&self, user: &mut User) -> StoreResult<ValidationErrorSet> {
        let mut errors = self.validate(user).await?;
        if errors.has_any() {
            return Ok(errors);
        }

        let now = Utc::now();
        let active_model = entity::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(user.name.clone()),
            email: Set(user.email.clone()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        match active_model.insert(&self.db).await {
            Ok(model) => {
                tracing::info!(user_id = %model.id, "Created user");
                *user = model.into();
                Ok(errors)
            }
            // Lost a race with a concurrent insert of the same email.
            Err(e) if is_unique_violation(&e) => {
                errors.add("email", EMAIL_TAKEN);
                Ok(errors)
            }
            Err(e) => Err(map_db_err(e)),
        }
    }

    async fn validate_and_save(&self, user: &mut User) -> StoreResult<ValidationErrorSet> {
        let Some(id) = user.id else {
            return Err(StoreError::NotFound("(unsaved)".to_string()));
        };

        let mut errors = self.validate(user).await?;
        if errors.has_any() {
            return Ok(errors);
        }

        let active_model = entity::ActiveModel {
            id: Set(id),
            name: Set(user.name.clone()),
            email: Set(user.email.clone()),
            created_at: NotSet,
            updated_at: Set(Utc::now().into()),
        };

        match active_model.update(&self.db).await {
            Ok(model) => {
                tracing::info!(user_id = %id, "Updated user");
                *user = model.into();
                Ok(errors)
            }
            Err(DbErr::RecordNotUpdated) => Err(StoreError::NotFound(id.to_string())),
            Err(e) if is_unique_violation(&e) => {
                errors.add("email", EMAIL_TAKEN);
                Ok(errors)
            }
            Err(e) => Err(map_db_err(e)),
        }
    }

    async fn destroy(&self, user: &User) -> StoreResult<()> {
        let Some(id) = user.id else {
            return Err(StoreError::NotFound("(unsaved)".to_string()));
        };

        let result = entity::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }

        tracing::info!(user_id = %id, "Deleted user");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EMAIL_INVALID, NAME_BLANK};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, RuntimeErr};

    fn model(name: &str, email: &str) -> entity::Model {
        let now = Utc::now();
        entity::Model {
            id: Uuid::now_v7(),
            name: name.to_string(),
            email: email.to_string(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn user(name: &str, email: &str) -> User {
        User {
            name: name.to_string(),
            email: email.to_string(),
            ..User::default()
        }
    }

    #[tokio::test]
    async fn test_find_maps_model() {
        let row = model("Ada", "ada@example.com");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row.clone()]])
            .into_connection();

        let found = PgUserStore::new(db).find(&row.id.to_string()).await.unwrap();

        assert_eq!(found.id, Some(row.id));
        assert_eq!(found.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_find_missing_row_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new()])
            .into_connection();

        let err = PgUserStore::new(db)
            .find(&Uuid::now_v7().to_string())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_find_garbage_id_skips_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let err = PgUserStore::new(db).find("999").await.unwrap_err();
        assert_eq!(err, StoreError::NotFound("999".to_string()));
    }

    #[tokio::test]
    async fn test_create_inserts_and_assigns_id() {
        let inserted = model("Ada", "ada@example.com");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new()])
            .append_query_results([vec![inserted.clone()]])
            .into_connection();

        let mut u = user("Ada", "ada@example.com");
        let errors = PgUserStore::new(db).validate_and_create(&mut u).await.unwrap();

        assert!(errors.is_empty());
        assert_eq!(u.id, Some(inserted.id));
        assert!(u.created_at.is_some());
    }

    #[tokio::test]
    async fn test_create_with_taken_email_does_not_insert() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model("Ada", "ada@example.com")]])
            .into_connection();

        let mut u = user("Impostor", "ADA@example.com");
        let errors = PgUserStore::new(db).validate_and_create(&mut u).await.unwrap();

        assert_eq!(errors.get("email"), [EMAIL_TAKEN]);
        assert!(u.id.is_none());
    }

    #[tokio::test]
    async fn test_invalid_fields_skip_uniqueness_query() {
        // No results queued: any query would fail the call.
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let mut u = user("", "not-an-email");
        let errors = PgUserStore::new(db).validate_and_create(&mut u).await.unwrap();

        assert_eq!(errors.get("name"), [NAME_BLANK]);
        assert_eq!(errors.get("email"), [EMAIL_INVALID]);
    }

    #[tokio::test]
    async fn test_connection_loss_is_unavailable() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Conn(RuntimeErr::Internal(
                "connection refused".to_string(),
            ))])
            .into_connection();

        let err = PgUserStore::new(db).all().await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_destroy_missing_row_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let u = User {
            id: Some(Uuid::now_v7()),
            ..user("Ada", "ada@example.com")
        };
        assert!(PgUserStore::new(db).destroy(&u).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_destroy_existing_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let u = User {
            id: Some(Uuid::now_v7()),
            ..user("Ada", "ada@example.com")
        };
        assert!(PgUserStore::new(db).destroy(&u).await.is_ok());
    }
}
