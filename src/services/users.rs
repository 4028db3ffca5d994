//! User service
//!
//! Registration and authentication on top of the user repository.
//! Authentication deliberately collapses "unknown user" and "wrong
//! password" into one opaque `None` so callers cannot enumerate
//! accounts.

use crate::crypto;
use crate::database::{User, UserRepository};
use crate::error::{AppError, Result};

#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
}

impl UserService {
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    /// Check credentials. Returns the user on success, `None` on any
    /// failure — missing user and bad password are indistinguishable.
    pub async fn authenticate_user(&self, username: &str, password: &str) -> Result<Option<User>> {
        let user = self.repo.get_user_by_username(username).await?;

        match user {
            Some(user) if crypto::verify_password(password, &user.password) => {
                tracing::info!("User '{}' authenticated", username);
                Ok(Some(user))
            }
            _ => {
                tracing::debug!("Authentication failed for '{}'", username);
                Ok(None)
            }
        }
    }

    /// Register a new account. The username is checked before the
    /// insert; the repository still translates a storage-level race
    /// into the same duplicate error.
    pub async fn register_user(&self, username: &str, password: &str) -> Result<User> {
        if self.repo.get_user_by_username(username).await?.is_some() {
            return Err(AppError::DuplicateUsername(username.to_string()));
        }

        let hashed = crypto::hash_password(password)?;
        let user = self.repo.add_user(username, &hashed).await?;

        tracing::info!("Registered user '{}' (id {})", username, user.id);
        Ok(user)
    }

    pub async fn get_all_users(&self) -> Result<Vec<User>> {
        self.repo.get_all_users().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{initialize_database, UserRepository};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_service() -> UserService {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        UserService::new(UserRepository::new(pool))
    }

    #[tokio::test]
    async fn test_register_and_authenticate() {
        let service = create_test_service().await;

        let user = service.register_user("alice", "pw123456").await.unwrap();
        assert_eq!(user.username, "alice");
        // Stored password is a hash, never the plaintext
        assert_ne!(user.password, "pw123456");

        let authenticated = service
            .authenticate_user("alice", "pw123456")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(authenticated.id, user.id);
    }

    #[tokio::test]
    async fn test_failures_are_indistinguishable() {
        let service = create_test_service().await;

        service.register_user("alice", "pw123456").await.unwrap();

        let wrong_password = service.authenticate_user("alice", "nope").await.unwrap();
        let unknown_user = service.authenticate_user("mallory", "nope").await.unwrap();

        assert!(wrong_password.is_none());
        assert!(unknown_user.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let service = create_test_service().await;

        let first = service.register_user("alice", "pw123456").await.unwrap();
        let err = service.register_user("alice", "other").await.unwrap_err();

        assert!(matches!(err, AppError::DuplicateUsername(_)));

        // First account still authenticates with its original password
        let auth = service
            .authenticate_user("alice", "pw123456")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(auth.id, first.id);
    }

    #[tokio::test]
    async fn test_get_all_users() {
        let service = create_test_service().await;

        service.register_user("alice", "pw1").await.unwrap();
        service.register_user("bob", "pw2").await.unwrap();

        let users = service.get_all_users().await.unwrap();
        assert_eq!(users.len(), 2);
    }
}
