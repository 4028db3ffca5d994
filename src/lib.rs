//! NoteMaster core
//!
//! Persistence and domain layer for a single-session desktop
//! note-taking application: user accounts, plain and password-protected
//! notes, image and audio attachments, and freehand sketch storage. The
//! UI shell talks only to the service types exposed here.

pub mod app;
pub mod config;
pub mod crypto;
pub mod database;
pub mod error;
pub mod services;
pub mod storage;

pub use app::App;
pub use error::{AppError, Result};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the default tracing subscriber. Intended for binaries and
/// examples embedding this crate; panics if a subscriber is already set.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notemaster=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
