//! Application configuration constants
//!
//! Central location for filesystem layout names, audio capture
//! parameters, and timeouts used throughout the crate.

use std::time::Duration;

// ===== Filesystem Layout =====

/// Database file name inside the data directory
pub const DB_FILE_NAME: &str = "notes_app.db";

/// Per-user attachment tree root inside the data directory
pub const USERS_DIR_NAME: &str = "users";

/// Image attachment subdirectory inside a user's folder
pub const IMAGES_DIR_NAME: &str = "images";

/// Audio attachment subdirectory inside a user's folder
pub const AUDIO_DIR_NAME: &str = "audio";

// ===== Audio Capture =====

/// Recording sample rate in Hz. The capture collaborator writes
/// single-channel uncompressed PCM at this rate.
pub const CAPTURE_SAMPLE_RATE_HZ: u32 = 44_100;

/// Channel count for recordings (mono)
pub const CAPTURE_CHANNELS: u16 = 1;

/// Sample width in bits (16-bit PCM)
pub const CAPTURE_BITS_PER_SAMPLE: u16 = 16;

/// Frames per buffer iteration; the capture worker checks its stop flag
/// once per buffer, so this bounds cancellation latency.
pub const CAPTURE_CHUNK_FRAMES: usize = 1024;

/// How long to wait for a capture/playback worker to acknowledge its stop
/// flag before abandoning it. A worker that misses this deadline is
/// detached, never forcibly killed.
pub const CAPTURE_JOIN_TIMEOUT: Duration = Duration::from_secs(1);
