//! Application composition root
//!
//! All services are built here, once, around an explicitly owned
//! connection pool — there is no process-wide singleton. Callers hold
//! the `App` for the lifetime of the session and close it on shutdown.

use std::path::{Path, PathBuf};

use sqlx::SqlitePool;

use crate::config::{DB_FILE_NAME, USERS_DIR_NAME};
use crate::database::{create_pool, NoteRepository, UserRepository};
use crate::error::Result;
use crate::services::{NoteService, UserService};
use crate::storage::UserFolderStore;

pub struct App {
    pool: SqlitePool,
    data_dir: PathBuf,
    pub user_service: UserService,
    pub note_service: NoteService,
}

impl App {
    /// Open (creating if needed) the data directory and database, run
    /// schema initialization, and wire up the services.
    pub async fn init(data_dir: PathBuf) -> Result<Self> {
        tracing::info!("Initializing application at {:?}", data_dir);

        std::fs::create_dir_all(&data_dir)?;
        std::fs::create_dir_all(data_dir.join(USERS_DIR_NAME))?;

        let pool = create_pool(&data_dir.join(DB_FILE_NAME)).await?;

        let user_service = UserService::new(UserRepository::new(pool.clone()));
        let note_service = NoteService::new(NoteRepository::new(pool.clone()));

        tracing::info!("Application initialized successfully");

        Ok(Self {
            pool,
            data_dir,
            user_service,
            note_service,
        })
    }

    /// Attachment folder tree for one user, rooted under this app's
    /// data directory.
    pub fn user_folders(&self, username: &str) -> UserFolderStore {
        UserFolderStore::new(&self.data_dir, username)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Release the database pool. Safe to call more than once.
    pub async fn close(&self) {
        if !self.pool.is_closed() {
            tracing::info!("Closing database pool");
        }
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_layout_and_services_work() {
        let dir = TempDir::new().unwrap();
        let app = App::init(dir.path().to_path_buf()).await.unwrap();

        assert!(dir.path().join(DB_FILE_NAME).exists());
        assert!(dir.path().join(USERS_DIR_NAME).is_dir());

        let user = app.user_service.register_user("alice", "pw123456").await.unwrap();
        let note = app.note_service.create_note(user.id, "first", "hi").await.unwrap();
        assert_eq!(note.note_name, "first");

        app.close().await;
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let app = App::init(dir.path().to_path_buf()).await.unwrap();

        app.close().await;
        app.close().await;
    }

    #[tokio::test]
    async fn test_operations_after_close_fail() {
        let dir = TempDir::new().unwrap();
        let app = App::init(dir.path().to_path_buf()).await.unwrap();

        app.close().await;

        let result = app.user_service.get_all_users().await;
        assert!(result.is_err());
    }
}
