//! Storage module
//!
//! Filesystem namespaces for binary attachment data (images, audio).

pub mod user_folders;

pub use user_folders::UserFolderStore;
