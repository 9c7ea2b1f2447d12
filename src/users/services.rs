use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::password::hash_password,
    errors::{AppError, AppResult},
    users::{
        dto::UserSchema,
        repo::{RepoError, UserRepo},
        repo_types::{NewUser, User, UserChanges},
    },
};

pub const NOT_FOUND: &str = "User not found";
pub const NOT_ENOUGH_PERMISSIONS: &str = "Not enough permissions";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Shape checks that run before anything touches storage.
pub fn validate(input: &UserSchema) -> AppResult<()> {
    if input.username.trim().is_empty() {
        return Err(AppError::validation("Username must not be empty"));
    }
    if !is_valid_email(&input.email) {
        return Err(AppError::validation("Invalid email"));
    }
    if input.password.is_empty() {
        return Err(AppError::validation("Password must not be empty"));
    }
    Ok(())
}

pub async fn create_user(repo: &dyn UserRepo, input: UserSchema) -> AppResult<User> {
    if repo.find_by_email(&input.email).await?.is_some() {
        warn!(email = %input.email, "email already registered");
        return Err(AppError::conflict("Email already exists"));
    }
    if repo.find_by_username(&input.username).await?.is_some() {
        warn!(username = %input.username, "username already taken");
        return Err(AppError::conflict("Username already exists"));
    }

    let password = hash_password(&input.password)?;
    // a concurrent insert can still trip the constraint; RepoError maps it per field
    let user = repo
        .create(NewUser {
            username: input.username,
            email: input.email,
            password,
        })
        .await?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(user)
}

pub async fn get_user(repo: &dyn UserRepo, id: i64) -> AppResult<User> {
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))
}

pub async fn list_users(repo: &dyn UserRepo, offset: i64, limit: i64) -> AppResult<Vec<User>> {
    Ok(repo.list(offset.max(0), limit.max(0)).await?)
}

pub async fn update_user(
    repo: &dyn UserRepo,
    current: &User,
    id: i64,
    input: UserSchema,
) -> AppResult<User> {
    if current.id != id {
        warn!(user_id = current.id, target = id, "update of another user refused");
        return Err(AppError::forbidden(NOT_ENOUGH_PERMISSIONS));
    }

    let password = hash_password(&input.password)?;
    let updated = repo
        .update(
            id,
            UserChanges {
                username: input.username,
                email: input.email,
                password,
            },
        )
        .await
        .map_err(|e| match e {
            RepoError::UniqueViolation(field) => {
                warn!(user_id = id, ?field, "update collides with another user");
                AppError::conflict("Username or Email already exists")
            }
            other => other.into(),
        })?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    info!(user_id = id, "user updated");
    Ok(updated)
}

pub async fn delete_user(repo: &dyn UserRepo, current: &User, id: i64) -> AppResult<()> {
    if current.id != id {
        warn!(user_id = current.id, target = id, "delete of another user refused");
        return Err(AppError::forbidden(NOT_ENOUGH_PERMISSIONS));
    }
    if !repo.delete(id).await? {
        return Err(AppError::not_found(NOT_FOUND));
    }
    info!(user_id = id, "user deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::memory::InMemoryUserRepo;

    fn schema(username: &str, email: &str, password: &str) -> UserSchema {
        UserSchema {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("alice@example.com"));
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("alice@example"));
        assert!(!is_valid_email("al ice@example.com"));
    }

    #[test]
    fn validate_rejects_blank_username() {
        let err = validate(&schema("  ", "a@b.com", "x")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn create_stores_hash_not_plaintext() {
        let repo = InMemoryUserRepo::default();
        let user = create_user(&repo, schema("alice", "alice@example.com", "secret"))
            .await
            .unwrap();
        assert_ne!(user.password, "secret");
        assert!(crate::auth::password::verify_password("secret", &user.password).unwrap());
    }

    #[tokio::test]
    async fn create_reports_email_before_username() {
        let repo = InMemoryUserRepo::default();
        create_user(&repo, schema("alice", "alice@example.com", "secret"))
            .await
            .unwrap();

        let err = create_user(&repo, schema("alice", "alice@example.com", "other"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Email already exists");
    }

    #[tokio::test]
    async fn update_refreshes_updated_at() {
        let repo = InMemoryUserRepo::default();
        let user = create_user(&repo, schema("alice", "alice@example.com", "secret"))
            .await
            .unwrap();

        let updated = update_user(&repo, &user, user.id, schema("bob", "bob@example.com", "pw"))
            .await
            .unwrap();
        assert_eq!(updated.created_at, user.created_at);
        assert!(updated.updated_at >= user.updated_at);
        assert_eq!(updated.username, "bob");
    }

    #[tokio::test]
    async fn update_keeping_own_fields_is_not_a_conflict() {
        let repo = InMemoryUserRepo::default();
        let user = create_user(&repo, schema("alice", "alice@example.com", "secret"))
            .await
            .unwrap();

        let updated = update_user(
            &repo,
            &user,
            user.id,
            schema("alice", "alice@example.com", "changed"),
        )
        .await
        .unwrap();
        assert_eq!(updated.id, user.id);
    }

    #[tokio::test]
    async fn delete_of_vanished_user_is_not_found() {
        let repo = InMemoryUserRepo::default();
        let user = create_user(&repo, schema("alice", "alice@example.com", "secret"))
            .await
            .unwrap();
        delete_user(&repo, &user, user.id).await.unwrap();

        let err = delete_user(&repo, &user, user.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
