//! Services module
//!
//! Business logic services that sit between callers and the repository
//! layer, plus the background capture task lifecycle.

pub mod capture;
pub mod notes;
pub mod users;

pub use capture::{CaptureOutcome, CaptureTask};
pub use notes::{FileCleanupReport, NoteService};
pub use users::UserService;
