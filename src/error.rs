//! Error types for the NoteMaster core
//!
//! All errors use thiserror for structured error handling. Storage-level
//! violations (uniqueness, foreign keys) are translated into the domain
//! variants at the repository boundary; raw sqlx errors never carry
//! domain meaning past it.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Storage-layer failure, including operations on a closed pool.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Username '{0}' already exists")]
    DuplicateUsername(String),

    #[error("Note name '{0}' already exists for this user")]
    DuplicateNoteName(String),

    /// Storage rejected a note insert (e.g. a duplicate slipped past the
    /// service-level pre-check between check and insert).
    #[error("Failed to create note: {0}")]
    NoteCreation(String),

    #[error("Note not found: {0}")]
    NoteNotFound(i64),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("{0}")]
    Generic(String),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
