//! Persistence interface for submissions and folders.
//!
//! The store and workspace only talk to a [`Backend`]. The spreadsheet-backed
//! HTTP endpoint, the stand-in server, and tests plug in different
//! implementations.

/// In-memory backend used by the endpoint server and tests.
pub mod memory;
/// Wire contract shared by HTTP client and server.
pub mod protocol;

pub use memory::MemoryBackend;
pub use protocol::Action;

use crate::{
    models::{CreateFolderRequest, Folder, NewSubmission, Submission, SubmissionUpdate},
    AppError,
};
use chrono::{DateTime, Utc};
use std::future::Future;

/// Remote datastore operations, one per endpoint action.
///
/// Implementations report endpoint-side failures as [`AppError::Remote`] and
/// connectivity failures as [`AppError::Transport`].
pub trait Backend: Send + Sync {
    /// Record that `user_name` started using the client.
    fn register_user(
        &self,
        user_name: &str,
        timestamp: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Fetch every submission.
    fn list_submissions(&self) -> impl Future<Output = Result<Vec<Submission>, AppError>> + Send;

    /// Store a new submission.
    ///
    /// # Returns
    /// The new submission id when the backend reports one.
    fn create_submission(
        &self,
        submission: &NewSubmission,
    ) -> impl Future<Output = Result<Option<String>, AppError>> + Send;

    /// Overwrite the editable fields of an existing submission.
    fn update_submission(
        &self,
        update: &SubmissionUpdate,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Remove a submission by id.
    fn delete_submission(
        &self,
        submission_id: &str,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Fetch every folder known to the backend.
    fn list_folders(&self) -> impl Future<Output = Result<Vec<Folder>, AppError>> + Send;

    /// Create a folder.
    ///
    /// # Returns
    /// The new folder id when the backend reports one.
    fn create_folder(
        &self,
        request: &CreateFolderRequest,
    ) -> impl Future<Output = Result<Option<String>, AppError>> + Send;

    /// Delete a folder; its submissions move to `general`.
    fn delete_folder(&self, folder_id: &str) -> impl Future<Output = Result<(), AppError>> + Send;
}
