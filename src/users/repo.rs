use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::users::repo_types::{NewUser, User, UserChanges};

const USER_COLUMNS: &str = "id, username, email, password, created_at, updated_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("unique constraint violated on {0:?}")]
    UniqueViolation(UniqueField),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage for the `users` table.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    async fn list(&self, offset: i64, limit: i64) -> RepoResult<Vec<User>>;
    async fn create(&self, user: NewUser) -> RepoResult<User>;
    /// Returns `None` when no row has this id.
    async fn update(&self, id: i64, changes: UserChanges) -> RepoResult<Option<User>>;
    /// Returns whether a row was removed.
    async fn delete(&self, id: i64) -> RepoResult<bool>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// The field guarded by a unique constraint on `users`, by constraint name
/// (`users_email_key`, `users_username_key`).
pub(crate) fn unique_field(constraint: &str) -> Option<UniqueField> {
    if constraint.contains("email") {
        Some(UniqueField::Email)
    } else if constraint.contains("username") {
        Some(UniqueField::Username)
    } else {
        None
    }
}

fn map_unique(e: sqlx::Error) -> RepoError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            if let Some(field) = db_err.constraint().and_then(unique_field) {
                return RepoError::UniqueViolation(field);
            }
        }
    }
    RepoError::Database(e)
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn list(&self, offset: i64, limit: i64) -> RepoResult<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn create(&self, user: NewUser) -> RepoResult<User> {
        let row = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .fetch_one(&self.db)
        .await
        .map_err(map_unique)?;
        Ok(row)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> RepoResult<Option<User>> {
        let row = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET username = $1, email = $2, password = $3, updated_at = now()
            WHERE id = $4
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&changes.username)
        .bind(&changes.email)
        .bind(&changes.password)
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(map_unique)?;
        Ok(row)
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
