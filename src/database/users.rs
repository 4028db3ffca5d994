//! User repository
//!
//! CRUD over account records. Username uniqueness is enforced by the
//! schema; violations are translated into the domain error here so the
//! raw storage error never reaches the service layer.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::database::models::User;
use crate::error::{AppError, Result};

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All registered users, in registration order.
    pub async fn get_all_users(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password FROM users ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Look up a user by exact username. No match is an empty result,
    /// not an error.
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password FROM users WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Insert a new user. `hashed_password` must already be hashed;
    /// this layer never sees plaintext.
    pub async fn add_user(&self, username: &str, hashed_password: &str) -> Result<User> {
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (username, password, created_at)
            VALUES (?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(username)
        .bind(hashed_password)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await;

        let id = match result {
            Ok(id) => id,
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(AppError::DuplicateUsername(username.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::debug!("Created user {} (id {})", username, id);

        Ok(User {
            id,
            username: username.to_string(),
            password: hashed_password.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::initialize_database;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_repo() -> UserRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        UserRepository::new(pool)
    }

    #[tokio::test]
    async fn test_add_and_get_user() {
        let repo = create_test_repo().await;

        let user = repo.add_user("alice", "hash-a").await.unwrap();
        assert_eq!(user.username, "alice");
        assert!(user.id > 0);

        let fetched = repo.get_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(fetched.id, user.id);
        assert_eq!(fetched.password, "hash-a");
    }

    #[tokio::test]
    async fn test_unknown_user_is_none() {
        let repo = create_test_repo().await;

        let fetched = repo.get_user_by_username("nobody").await.unwrap();
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_domain_error() {
        let repo = create_test_repo().await;

        repo.add_user("alice", "hash-a").await.unwrap();
        let err = repo.add_user("alice", "hash-b").await.unwrap_err();

        assert!(matches!(err, AppError::DuplicateUsername(name) if name == "alice"));

        // First account unaffected
        let first = repo.get_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(first.password, "hash-a");
    }

    #[tokio::test]
    async fn test_get_all_users_ordered() {
        let repo = create_test_repo().await;

        repo.add_user("alice", "h1").await.unwrap();
        repo.add_user("bob", "h2").await.unwrap();
        repo.add_user("carol", "h3").await.unwrap();

        let users = repo.get_all_users().await.unwrap();
        let names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, ["alice", "bob", "carol"]);
    }
}
