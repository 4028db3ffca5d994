//! Database models
//!
//! Rust structs representing database entities. All models use serde
//! for serialization to an embedding caller.
//!
//! A `Note` is an aggregate: the note row plus its three owned child
//! collections (images, audio, sketch points), treated as one
//! consistency unit for read and delete.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered account. `password` is the Argon2 PHC hash, never
/// plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
}

/// Whether a note's content is gated behind its own password.
///
/// The password hash exists iff the note is secure; representing this as
/// a tagged variant makes the pairing impossible to get wrong in memory.
/// Persisted as the `(is_secure, secure_password)` column pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoteSecurity {
    Plain,
    Secure { password_hash: String },
}

impl NoteSecurity {
    pub fn is_secure(&self) -> bool {
        matches!(self, NoteSecurity::Secure { .. })
    }

    /// Column-pair encoding used by the notes table.
    pub(crate) fn to_columns(&self) -> (bool, Option<&str>) {
        match self {
            NoteSecurity::Plain => (false, None),
            NoteSecurity::Secure { password_hash } => (true, Some(password_hash)),
        }
    }

    /// Decode the column pair. A row flagged secure but missing its hash
    /// is treated as plain; the stored invariant was already broken and
    /// an unverifiable lock would make the note unreachable.
    pub(crate) fn from_columns(is_secure: bool, secure_password: Option<String>) -> Self {
        match (is_secure, secure_password) {
            (true, Some(password_hash)) => NoteSecurity::Secure { password_hash },
            (true, None) => {
                tracing::warn!("Secure note row has no stored hash; treating as plain");
                NoteSecurity::Plain
            }
            (false, _) => NoteSecurity::Plain,
        }
    }
}

/// A note together with its owned child collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub user_id: i64,
    pub note_name: String,
    pub text_content: String,
    pub security: NoteSecurity,
    pub image_paths: Vec<NoteImage>,
    pub audio_paths: Vec<NoteAudio>,
    pub sketch_points: Vec<SketchPoint>,
}

impl Note {
    pub fn is_secure(&self) -> bool {
        self.security.is_secure()
    }
}

/// Pointer to an image file inside the owning user's folder tree. The
/// filesystem owns the bytes; this row only references them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct NoteImage {
    pub image_path: String,
}

/// Pointer to an audio file inside the owning user's folder tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct NoteAudio {
    pub audio_path: String,
}

/// One drawn vertex with the brush state at the moment it was placed.
///
/// Insertion order is semantically meaningful: consecutive points that
/// share identical brush fields form one continuous stroke. No explicit
/// stroke marker is persisted, so two separate strokes drawn with the
/// same brush settings are indistinguishable from one on reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SketchPoint {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub opacity: f64,
}

impl SketchPoint {
    /// Whether two points belong to the same inferred stroke. Size is
    /// compared after integer truncation, matching how the renderer
    /// quantizes pen width.
    pub fn same_brush(&self, other: &SketchPoint) -> bool {
        (self.size as i64) == (other.size as i64)
            && self.red == other.red
            && self.green == other.green
            && self.blue == other.blue
            && self.opacity == other.opacity
    }
}

/// Split an ordered point sequence into strokes: maximal runs of
/// consecutive points sharing identical brush attributes. A run of one
/// renders as an isolated point.
pub fn strokes(points: &[SketchPoint]) -> Vec<&[SketchPoint]> {
    let mut out = Vec::new();
    let mut start = 0;

    for i in 1..points.len() {
        if !points[i].same_brush(&points[i - 1]) {
            out.push(&points[start..i]);
            start = i;
        }
    }

    if !points.is_empty() {
        out.push(&points[start..]);
    }

    out
}
