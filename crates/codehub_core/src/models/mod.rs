//! Data models shared by the store, the endpoint contract and local state.

/// Activity log entries.
pub mod activity;
/// Collaboration chat messages.
pub mod chat;
/// Folder model and privacy.
pub mod folder;
/// Locally managed projects.
pub mod project;
/// Submission records and their create/update payloads.
pub mod submission;
/// Lenient decoders for spreadsheet-shaped JSON.
pub(crate) mod wire;


pub use activity::ActivityEntry;
pub use chat::ChatMessage;
pub use folder::{CreateFolderRequest, Folder, Privacy};
pub use project::Project;
pub use submission::{
    EditorDraft, Expiration, NewSubmission, Submission, SubmissionEdit, SubmissionUpdate,
    UploadFile, UploadOptions,
};
