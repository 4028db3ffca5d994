//! Per-user attachment folders
//!
//! Maps a username to an isolated directory tree for that user's binary
//! attachments: `{data_dir}/users/{username}/{images,audio}`. This is a
//! pure namespace allocator — it knows nothing about notes; callers
//! place files here and then register the paths with the note service.

use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use crate::config::{AUDIO_DIR_NAME, IMAGES_DIR_NAME, USERS_DIR_NAME};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct UserFolderStore {
    base: PathBuf,
}

impl UserFolderStore {
    /// Create a store rooted at `{data_dir}/users/{username}`. No
    /// directories are touched until [`initialize`](Self::initialize).
    pub fn new(data_dir: &Path, username: &str) -> Self {
        Self {
            base: data_dir.join(USERS_DIR_NAME).join(username),
        }
    }

    /// Idempotently create the user's folder tree.
    pub async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(self.images_path()).await?;
        fs::create_dir_all(self.audio_path()).await?;
        tracing::debug!("User folder tree ready at {:?}", self.base);
        Ok(())
    }

    /// Directory for image attachments.
    pub fn images_path(&self) -> PathBuf {
        self.base.join(IMAGES_DIR_NAME)
    }

    /// Directory for audio attachments.
    pub fn audio_path(&self) -> PathBuf {
        self.base.join(AUDIO_DIR_NAME)
    }

    /// Copy a user-chosen file into the images directory, renaming on
    /// collision by appending a numeric suffix before the extension
    /// (`photo.png`, `photo_1.png`, `photo_2.png`, ...). Returns the
    /// destination path to register with the note service.
    pub async fn import_image(&self, source: &Path) -> Result<PathBuf> {
        let images_dir = self.images_path();
        fs::create_dir_all(&images_dir).await?;

        let file_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image");
        let (stem, ext) = match file_name.rsplit_once('.') {
            Some((stem, ext)) => (stem.to_string(), Some(ext.to_string())),
            None => (file_name.to_string(), None),
        };

        let mut dest = images_dir.join(file_name);
        let mut count = 1;
        while fs::try_exists(&dest).await? {
            let candidate = match &ext {
                Some(ext) => format!("{}_{}.{}", stem, count, ext),
                None => format!("{}_{}", stem, count),
            };
            dest = images_dir.join(candidate);
            count += 1;
        }

        fs::copy(source, &dest).await?;

        tracing::debug!("Imported image {:?} -> {:?}", source, dest);
        Ok(dest)
    }

    /// A fresh target path for a new recording, handed to the capture
    /// task before any bytes exist.
    pub fn next_recording_path(&self) -> PathBuf {
        self.audio_path()
            .join(format!("recording_{}.wav", Uuid::new_v4()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_store() -> (UserFolderStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = UserFolderStore::new(dir.path(), "alice");
        store.initialize().await.unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn test_folder_tree_layout() {
        let (store, dir) = create_test_store().await;

        let expected = dir.path().join("users").join("alice");
        assert_eq!(store.images_path(), expected.join("images"));
        assert_eq!(store.audio_path(), expected.join("audio"));
        assert!(store.images_path().is_dir());
        assert!(store.audio_path().is_dir());
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let (store, _dir) = create_test_store().await;

        store.initialize().await.unwrap();
        store.initialize().await.unwrap();
        assert!(store.images_path().is_dir());
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let dir = TempDir::new().unwrap();
        let alice = UserFolderStore::new(dir.path(), "alice");
        let bob = UserFolderStore::new(dir.path(), "bob");

        assert_ne!(alice.images_path(), bob.images_path());
        assert_ne!(alice.audio_path(), bob.audio_path());
    }

    #[tokio::test]
    async fn test_import_image_renames_on_collision() {
        let (store, dir) = create_test_store().await;

        let src = dir.path().join("photo.png");
        tokio::fs::write(&src, b"first").await.unwrap();

        let first = store.import_image(&src).await.unwrap();
        assert_eq!(first.file_name().unwrap(), "photo.png");

        tokio::fs::write(&src, b"second").await.unwrap();
        let second = store.import_image(&src).await.unwrap();
        assert_eq!(second.file_name().unwrap(), "photo_1.png");

        let third = store.import_image(&src).await.unwrap();
        assert_eq!(third.file_name().unwrap(), "photo_2.png");

        // Originals untouched, copies hold their bytes
        assert_eq!(tokio::fs::read(&first).await.unwrap(), b"first");
        assert_eq!(tokio::fs::read(&second).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_recording_paths_are_unique() {
        let (store, _dir) = create_test_store().await;

        let a = store.next_recording_path();
        let b = store.next_recording_path();

        assert_ne!(a, b);
        assert_eq!(a.extension().unwrap(), "wav");
        assert!(a.starts_with(store.audio_path()));
    }
}
