use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use super::repo::{RepoError, RepoResult, UniqueField, UserRepo};
use super::repo_types::{NewUser, User, UserChanges};

/// Vec-backed `UserRepo` that enforces the same unique constraints as the
/// `users` table.
#[derive(Default)]
pub struct InMemoryUserRepo {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    rows: Vec<User>,
}

impl Inner {
    fn check_unique(&self, skip_id: Option<i64>, username: &str, email: &str) -> RepoResult<()> {
        let other = |u: &User| Some(u.id) != skip_id;
        if self.rows.iter().any(|u| other(u) && u.email == email) {
            return Err(RepoError::UniqueViolation(UniqueField::Email));
        }
        if self.rows.iter().any(|u| other(u) && u.username == username) {
            return Err(RepoError::UniqueViolation(UniqueField::Username));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepo for InMemoryUserRepo {
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.rows.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.rows.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.rows.iter().find(|u| u.username == username).cloned())
    }

    async fn list(&self, offset: i64, limit: i64) -> RepoResult<Vec<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .rows
            .iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn create(&self, user: NewUser) -> RepoResult<User> {
        let mut inner = self.inner.lock().unwrap();
        inner.check_unique(None, &user.username, &user.email)?;
        inner.next_id += 1;
        let now = OffsetDateTime::now_utc();
        let row = User {
            id: inner.next_id,
            username: user.username,
            email: user.email,
            password: user.password,
            created_at: now,
            updated_at: now,
        };
        inner.rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> RepoResult<Option<User>> {
        let mut inner = self.inner.lock().unwrap();
        inner.check_unique(Some(id), &changes.username, &changes.email)?;
        let Some(row) = inner.rows.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        row.username = changes.username;
        row.email = changes.email;
        row.password = changes.password;
        row.updated_at = OffsetDateTime::now_utc();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.rows.len();
        inner.rows.retain(|u| u.id != id);
        Ok(inner.rows.len() < before)
    }
}
