//! Note repository
//!
//! CRUD over the note aggregate and its three child tables (images,
//! audio, sketch points). Reads assemble fully-hydrated aggregates;
//! deletes remove the note row and every child row in one transaction so
//! partial deletion is never observable.

use chrono::Utc;
use sqlx::{FromRow, SqlitePool};

use crate::database::models::{Note, NoteAudio, NoteImage, NoteSecurity, SketchPoint};
use crate::error::{AppError, Result};

/// Raw note row before security decoding and child hydration.
#[derive(FromRow)]
struct NoteRow {
    id: i64,
    user_id: i64,
    note_name: String,
    text_content: Option<String>,
    is_secure: bool,
    secure_password: Option<String>,
}

#[derive(Clone)]
pub struct NoteRepository {
    pool: SqlitePool,
}

impl NoteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All notes owned by a user, fully hydrated.
    ///
    /// Each note costs three extra queries (images, audio, sketch
    /// points). Fine at per-user note counts; batch if that ever stops
    /// being true.
    pub async fn get_notes_by_user(&self, user_id: i64) -> Result<Vec<Note>> {
        let rows = sqlx::query_as::<_, NoteRow>(
            r#"
            SELECT id, user_id, note_name, text_content, is_secure, secure_password
            FROM notes
            WHERE user_id = ?
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut notes = Vec::with_capacity(rows.len());
        for row in rows {
            let image_paths = self.get_note_images(row.id).await?;
            let audio_paths = self.get_note_audio(row.id).await?;
            let sketch_points = self.get_note_sketch_points(row.id).await?;

            notes.push(Note {
                id: row.id,
                user_id: row.user_id,
                note_name: row.note_name,
                text_content: row.text_content.unwrap_or_default(),
                security: NoteSecurity::from_columns(row.is_secure, row.secure_password),
                image_paths,
                audio_paths,
                sketch_points,
            });
        }

        Ok(notes)
    }

    /// Insert a new note with empty child collections.
    ///
    /// The service pre-checks name uniqueness, but a duplicate can still
    /// race in between check and insert; the constraint violation is
    /// surfaced as a creation error rather than swallowed.
    pub async fn create_note(
        &self,
        user_id: i64,
        note_name: &str,
        text_content: &str,
        security: NoteSecurity,
    ) -> Result<Note> {
        let (is_secure, secure_password) = security.to_columns();
        let now = Utc::now();

        let result = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO notes (user_id, note_name, text_content, is_secure, secure_password, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(note_name)
        .bind(text_content)
        .bind(is_secure)
        .bind(secure_password)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await;

        let id = match result {
            Ok(id) => id,
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(AppError::NoteCreation(format!(
                    "duplicate note name '{}' for user {}",
                    note_name, user_id
                )));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::debug!("Created note '{}' (id {}) for user {}", note_name, id, user_id);

        Ok(Note {
            id,
            user_id,
            note_name: note_name.to_string(),
            text_content: text_content.to_string(),
            security,
            image_paths: Vec::new(),
            audio_paths: Vec::new(),
            sketch_points: Vec::new(),
        })
    }

    /// Replace a note's text and bump its updated timestamp. An unknown
    /// note id is a silent no-op.
    pub async fn update_note_content(&self, note_id: i64, text_content: &str) -> Result<()> {
        let rows = sqlx::query(
            r#"
            UPDATE notes SET text_content = ?, updated_at = ? WHERE id = ?
            "#,
        )
        .bind(text_content)
        .bind(Utc::now())
        .bind(note_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows == 0 {
            tracing::debug!("update_note_content: note {} does not exist", note_id);
        }

        Ok(())
    }

    /// Delete a note and all of its child rows atomically. Child tables
    /// go first to respect the foreign keys.
    pub async fn delete_note(&self, note_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM sketch_points WHERE note_id = ?")
            .bind(note_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM images WHERE note_id = ?")
            .bind(note_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM audio WHERE note_id = ?")
            .bind(note_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM notes WHERE id = ?")
            .bind(note_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!("Deleted note {} and its children", note_id);
        Ok(())
    }

    /// Whether the user already has a note with this name. Used by the
    /// service layer before attempting a create.
    pub async fn note_name_exists(&self, user_id: i64, note_name: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM notes WHERE user_id = ? AND note_name = ?
            "#,
        )
        .bind(user_id)
        .bind(note_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    pub async fn add_image_to_note(&self, note_id: i64, image_path: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO images (note_id, image_path, created_at) VALUES (?, ?, ?)
            "#,
        )
        .bind(note_id)
        .bind(image_path)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn remove_image_from_note(&self, note_id: i64, image_path: &str) -> Result<()> {
        sqlx::query("DELETE FROM images WHERE note_id = ? AND image_path = ?")
            .bind(note_id)
            .bind(image_path)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Image rows for a note, in insertion order.
    pub async fn get_note_images(&self, note_id: i64) -> Result<Vec<NoteImage>> {
        let images = sqlx::query_as::<_, NoteImage>(
            r#"
            SELECT image_path FROM images WHERE note_id = ? ORDER BY id
            "#,
        )
        .bind(note_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }

    pub async fn add_audio_to_note(&self, note_id: i64, audio_path: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO audio (note_id, audio_path, created_at) VALUES (?, ?, ?)
            "#,
        )
        .bind(note_id)
        .bind(audio_path)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn remove_audio_from_note(&self, note_id: i64, audio_path: &str) -> Result<()> {
        sqlx::query("DELETE FROM audio WHERE note_id = ? AND audio_path = ?")
            .bind(note_id)
            .bind(audio_path)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Audio rows for a note, in insertion order.
    pub async fn get_note_audio(&self, note_id: i64) -> Result<Vec<NoteAudio>> {
        let audio = sqlx::query_as::<_, NoteAudio>(
            r#"
            SELECT audio_path FROM audio WHERE note_id = ? ORDER BY id
            "#,
        )
        .bind(note_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(audio)
    }

    /// Append one sketch point. Insertion order carries the stroke
    /// structure, so append is the only write shape besides clear.
    pub async fn add_sketch_point_to_note(&self, note_id: i64, point: &SketchPoint) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sketch_points
            (note_id, x, y, size, red, green, blue, opacity, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(note_id)
        .bind(point.x)
        .bind(point.y)
        .bind(point.size)
        .bind(point.red)
        .bind(point.green)
        .bind(point.blue)
        .bind(point.opacity)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn clear_sketch_points_for_note(&self, note_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM sketch_points WHERE note_id = ?")
            .bind(note_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Sketch points for a note, in insertion order.
    pub async fn get_note_sketch_points(&self, note_id: i64) -> Result<Vec<SketchPoint>> {
        let points = sqlx::query_as::<_, SketchPoint>(
            r#"
            SELECT x, y, size, red, green, blue, opacity
            FROM sketch_points
            WHERE note_id = ?
            ORDER BY id
            "#,
        )
        .bind(note_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(points)
    }
}
