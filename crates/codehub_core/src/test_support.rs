//! Shared test-only fixtures for codehub_core.

use crate::{
    backend::{Action, Backend, MemoryBackend},
    models::{
        CreateFolderRequest, Folder, NewSubmission, Privacy, Submission, SubmissionUpdate,
    },
    text::file_type_from_name,
    AppError,
};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashSet;
use std::sync::Mutex;

pub(crate) fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, minute, 0).unwrap()
}

/// A stored submission with small deterministic content.
pub(crate) fn submission(id: &str, folder: &str, file_name: &str, uploaded_by: &str) -> Submission {
    let content = format!("// {}\n", file_name);
    Submission {
        submission_id: id.to_string(),
        file_name: file_name.to_string(),
        file_type: file_type_from_name(file_name),
        file_size: content.len() as u64,
        code_content: content,
        timestamp: Some(at(0)),
        description: String::new(),
        folder: folder.to_string(),
        uploaded_by: uploaded_by.to_string(),
        tags: Vec::new(),
        last_modified: None,
        modified_by: None,
        expiration: None,
    }
}

pub(crate) fn new_submission(file_name: &str, folder: &str, uploaded_by: &str) -> NewSubmission {
    NewSubmission {
        file_name: file_name.to_string(),
        file_type: file_type_from_name(file_name),
        code_content: "content".to_string(),
        timestamp: at(0),
        file_size: 7,
        description: String::new(),
        folder: folder.to_string(),
        uploaded_by: uploaded_by.to_string(),
        tags: Vec::new(),
        expiration: "never".to_string(),
    }
}

pub(crate) fn folder(id: &str, privacy: Privacy, owner: Option<&str>) -> Folder {
    Folder {
        id: id.to_string(),
        name: id.to_uppercase(),
        privacy,
        owner: owner.map(str::to_string),
        file_count: 0,
        total_size: 0,
    }
}

/// Memory backend that fails selected actions or submission ids on demand.
#[derive(Default)]
pub(crate) struct FlakyBackend {
    pub(crate) inner: MemoryBackend,
    failing_actions: Mutex<HashSet<Action>>,
    failing_ids: Mutex<HashSet<String>>,
}

impl FlakyBackend {
    pub(crate) fn with_rows(submissions: Vec<Submission>, folders: Vec<Folder>) -> Self {
        Self {
            inner: MemoryBackend::with_rows(submissions, folders),
            ..Self::default()
        }
    }

    pub(crate) fn fail(&self, action: Action) {
        self.failing_actions.lock().expect("lock").insert(action);
    }

    pub(crate) fn heal(&self, action: Action) {
        self.failing_actions.lock().expect("lock").remove(&action);
    }

    pub(crate) fn fail_id(&self, submission_id: &str) {
        self.failing_ids
            .lock()
            .expect("lock")
            .insert(submission_id.to_string());
    }

    fn check(&self, action: Action, submission_id: Option<&str>) -> Result<(), AppError> {
        if self.failing_actions.lock().expect("lock").contains(&action) {
            return Err(AppError::Transport("HTTP 500".to_string()));
        }
        if let Some(id) = submission_id {
            if self.failing_ids.lock().expect("lock").contains(id) {
                return Err(AppError::Remote(action.default_error().to_string()));
            }
        }
        Ok(())
    }
}

impl Backend for FlakyBackend {
    async fn register_user(&self, user_name: &str, timestamp: DateTime<Utc>) -> Result<(), AppError> {
        self.check(Action::RegisterUser, None)?;
        self.inner.register_user(user_name, timestamp).await
    }

    async fn list_submissions(&self) -> Result<Vec<Submission>, AppError> {
        self.check(Action::GetSubmissions, None)?;
        self.inner.list_submissions().await
    }

    async fn create_submission(&self, submission: &NewSubmission) -> Result<Option<String>, AppError> {
        self.check(Action::SubmitCode, Some(&submission.file_name))?;
        self.inner.create_submission(submission).await
    }

    async fn update_submission(&self, update: &SubmissionUpdate) -> Result<(), AppError> {
        self.check(Action::UpdateFile, Some(&update.submission_id))?;
        self.inner.update_submission(update).await
    }

    async fn delete_submission(&self, submission_id: &str) -> Result<(), AppError> {
        self.check(Action::DeleteFile, Some(submission_id))?;
        self.inner.delete_submission(submission_id).await
    }

    async fn list_folders(&self) -> Result<Vec<Folder>, AppError> {
        self.check(Action::GetFolders, None)?;
        self.inner.list_folders().await
    }

    async fn create_folder(&self, request: &CreateFolderRequest) -> Result<Option<String>, AppError> {
        self.check(Action::CreateFolder, None)?;
        self.inner.create_folder(request).await
    }

    async fn delete_folder(&self, folder_id: &str) -> Result<(), AppError> {
        self.check(Action::DeleteFolder, None)?;
        self.inner.delete_folder(folder_id).await
    }
}
