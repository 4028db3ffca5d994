//! Note service
//!
//! Note lifecycle orchestration: name-uniqueness checks, secure-note
//! password hashing, and the two-phase delete — best-effort file
//! cleanup followed by an unconditional, transactional row delete.

use std::path::PathBuf;

use serde::Serialize;

use crate::crypto;
use crate::database::{Note, NoteRepository, NoteSecurity, SketchPoint, User};
use crate::error::{AppError, Result};

/// Outcome of the file-cleanup phase of a note deletion.
///
/// File deletion never aborts the enclosing operation: a missing file is
/// skipped, an OS-level failure is recorded here and logged. The
/// database rows are gone either way.
#[derive(Debug, Default, Serialize)]
pub struct FileCleanupReport {
    pub deleted: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

#[derive(Clone)]
pub struct NoteService {
    repo: NoteRepository,
}

impl NoteService {
    pub fn new(repo: NoteRepository) -> Self {
        Self { repo }
    }

    /// All of a user's notes, fully hydrated.
    pub async fn get_notes_for_user(&self, user_id: i64) -> Result<Vec<Note>> {
        self.repo.get_notes_by_user(user_id).await
    }

    /// Fetch one note, scoped to its owner. A note id belonging to a
    /// different user yields `None`.
    pub async fn get_note_by_id(&self, note_id: i64, user_id: i64) -> Result<Option<Note>> {
        let notes = self.repo.get_notes_by_user(user_id).await?;
        Ok(notes.into_iter().find(|n| n.id == note_id))
    }

    /// Create a plain note. The name must be unused within this user's
    /// notes.
    pub async fn create_note(
        &self,
        user_id: i64,
        note_name: &str,
        text_content: &str,
    ) -> Result<Note> {
        if self.repo.note_name_exists(user_id, note_name).await? {
            return Err(AppError::DuplicateNoteName(note_name.to_string()));
        }

        self.repo
            .create_note(user_id, note_name, text_content, NoteSecurity::Plain)
            .await
    }

    /// Create a password-protected note. Only the hash of the supplied
    /// password is ever persisted.
    pub async fn create_secure_note(
        &self,
        user_id: i64,
        note_name: &str,
        password: &str,
        text_content: &str,
    ) -> Result<Note> {
        if self.repo.note_name_exists(user_id, note_name).await? {
            return Err(AppError::DuplicateNoteName(note_name.to_string()));
        }

        let password_hash = crypto::hash_password(password)?;

        self.repo
            .create_note(
                user_id,
                note_name,
                text_content,
                NoteSecurity::Secure { password_hash },
            )
            .await
    }

    pub async fn update_note_content(&self, note_id: i64, text_content: &str) -> Result<()> {
        self.repo.update_note_content(note_id, text_content).await
    }

    /// Check a password against a secure note's stored hash. A plain
    /// note yields false regardless of the password; this is not an
    /// error.
    pub fn verify_secure_note_password(&self, note: &Note, password: &str) -> bool {
        match &note.security {
            NoteSecurity::Secure { password_hash } => {
                crypto::verify_password(password, password_hash)
            }
            NoteSecurity::Plain => false,
        }
    }

    /// Delete a note and everything it owns.
    ///
    /// Two phases with distinct failure semantics: first the referenced
    /// image and audio files are removed best-effort (failures are
    /// accumulated in the returned report), then the rows are deleted in
    /// one transaction. The row delete runs even when the owner-scoped
    /// lookup found nothing — only the file-cleanup phase depends on it.
    pub async fn delete_note(&self, note_id: i64, user: &User) -> Result<FileCleanupReport> {
        let mut report = FileCleanupReport::default();

        match self.get_note_by_id(note_id, user.id).await? {
            Some(note) => {
                let paths = note
                    .image_paths
                    .iter()
                    .map(|i| PathBuf::from(&i.image_path))
                    .chain(note.audio_paths.iter().map(|a| PathBuf::from(&a.audio_path)));

                for path in paths {
                    match tokio::fs::remove_file(&path).await {
                        Ok(()) => {
                            tracing::debug!("Deleted attachment file {:?}", path);
                            report.deleted.push(path);
                        }
                        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                            tracing::debug!("Attachment file {:?} already gone", path);
                        }
                        Err(e) => {
                            tracing::warn!("Failed to delete attachment file {:?}: {}", path, e);
                            report.failed.push((path, e.to_string()));
                        }
                    }
                }
            }
            None => {
                tracing::warn!(
                    "Note {} not found for user '{}'; skipping file cleanup",
                    note_id,
                    user.username
                );
            }
        }

        self.repo.delete_note(note_id).await?;

        Ok(report)
    }

    pub async fn add_image_to_note(&self, note_id: i64, image_path: &str) -> Result<()> {
        self.repo.add_image_to_note(note_id, image_path).await
    }

    pub async fn remove_image_from_note(&self, note_id: i64, image_path: &str) -> Result<()> {
        self.repo.remove_image_from_note(note_id, image_path).await
    }

    pub async fn add_audio_to_note(&self, note_id: i64, audio_path: &str) -> Result<()> {
        self.repo.add_audio_to_note(note_id, audio_path).await
    }

    pub async fn remove_audio_from_note(&self, note_id: i64, audio_path: &str) -> Result<()> {
        self.repo.remove_audio_from_note(note_id, audio_path).await
    }

    pub async fn add_sketch_point_to_note(&self, note_id: i64, point: &SketchPoint) -> Result<()> {
        self.repo.add_sketch_point_to_note(note_id, point).await
    }

    pub async fn clear_sketch_points_for_note(&self, note_id: i64) -> Result<()> {
        self.repo.clear_sketch_points_for_note(note_id).await
    }
}
