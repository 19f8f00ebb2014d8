//! Core domain library for CodeHub (config, models, access rules, store, backends).

/// Access-control rules for submissions and folders.
pub mod access;
/// Persistence interface and the in-memory implementation.
pub mod backend;
/// Configuration loading and defaults.
pub mod config;
/// Shared constants used across CodeHub crates.
pub mod constants;
/// Process-global environment helpers.
pub mod env;
/// Application error types.
pub mod error;
/// Data models for submissions, folders, projects and local records.
pub mod models;
/// Session identity and role resolution.
pub mod session;
/// Persisted per-user local state.
pub mod state;
/// In-memory submission cache and view filters.
pub mod store;
/// Shared text normalization helpers.
pub mod text;
/// Session-scoped orchestration of user operations.
pub mod workspace;

#[cfg(test)]
pub(crate) mod test_support;

pub use backend::{Backend, MemoryBackend};
pub use config::Config;
pub use constants::{
    ACTIVITY_LOG_CAPACITY, DEFAULT_PORT, DEFAULT_SERVER_URL, GENERAL_FOLDER_ID,
    RECENT_SUBMISSIONS_LIMIT,
};
pub use error::AppError;
pub use session::{Role, Session};
pub use state::LocalState;
pub use store::{FilterQuery, SubmissionStore};
pub use workspace::Workspace;
