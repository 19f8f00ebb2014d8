//! Session-scoped orchestration of every user operation.
//!
//! A [`Workspace`] owns the session, the submission cache, the folder list and
//! the persisted local state, and drives a [`Backend`] for remote calls. Every
//! mutating operation re-fetches afterwards instead of patching the cache.

use crate::{
    access,
    backend::Backend,
    constants::{
        EDITOR_DEFAULT_DESCRIPTION, GENERAL_FOLDER_ID, RECENT_SUBMISSIONS_LIMIT,
        UPLOAD_DEFAULT_DESCRIPTION,
    },
    models::{
        ActivityEntry, ChatMessage, CreateFolderRequest, EditorDraft, Expiration, Folder,
        NewSubmission, Privacy, Project, Submission, SubmissionEdit, SubmissionUpdate, UploadFile,
        UploadOptions,
    },
    session::Session,
    state::LocalState,
    store::{Analytics, FilterQuery, SubmissionStore},
    text::{file_type_from_name, normalize_optional_nonempty},
    AppError,
};
use chrono::Utc;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Per-id outcome of a bulk delete.
#[derive(Debug, Default)]
pub struct BulkDeleteReport {
    pub deleted: Vec<String>,
    pub failed: Vec<(String, AppError)>,
}

impl BulkDeleteReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Client context for one signed-in (or anonymous) user.
pub struct Workspace<B> {
    backend: B,
    session: Session,
    store: SubmissionStore,
    folders: Vec<Folder>,
    /// Set once a folder fetch succeeds; the persisted list may be stale.
    folders_loaded: bool,
    state: LocalState,
    state_path: Option<PathBuf>,
}

impl<B: Backend> Workspace<B> {
    /// Build a workspace from already-loaded state; nothing is persisted.
    pub fn new(backend: B, state: LocalState, admin_username: &str) -> Self {
        let session = Session::new(&state.user_name, admin_username, &state.current_folder);
        Self {
            backend,
            folders: state.folders.clone(),
            folders_loaded: false,
            session,
            store: SubmissionStore::new(),
            state,
            state_path: None,
        }
    }

    /// Load local state from `state_path` and persist changes back to it.
    ///
    /// # Errors
    /// Returns I/O or serialization errors from reading the state document.
    pub fn open(
        backend: B,
        state_path: impl Into<PathBuf>,
        admin_username: &str,
    ) -> Result<Self, AppError> {
        let state_path = state_path.into();
        let state = LocalState::load(&state_path)?;
        let mut workspace = Self::new(backend, state, admin_username);
        workspace.state_path = Some(state_path);
        Ok(workspace)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &SubmissionStore {
        &self.store
    }

    pub fn state(&self) -> &LocalState {
        &self.state
    }

    pub fn state_path(&self) -> Option<&Path> {
        self.state_path.as_deref()
    }

    /// Every folder from the last fetch, including `general`.
    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    /// Whether the folder list came from the endpoint rather than local state.
    pub fn folders_loaded(&self) -> bool {
        self.folders_loaded
    }

    /// Write local state, if this workspace was opened from a file.
    pub fn persist(&self) -> Result<(), AppError> {
        match &self.state_path {
            Some(path) => self.state.save(path),
            None => Ok(()),
        }
    }

    fn log_activity(&mut self, action: impl Into<String>) {
        self.state.log_activity(action, Utc::now());
    }

    fn set_current_folder(&mut self, folder_id: &str) {
        self.session.set_current_folder(folder_id);
        self.state.current_folder = folder_id.to_string();
    }

    /// Set the acting user and register them with the endpoint.
    ///
    /// Registration is best effort; a failure is logged and the sign-in still
    /// succeeds.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] for a blank name, or the error from
    /// persisting local state.
    pub async fn sign_in(&mut self, user_name: &str) -> Result<(), AppError> {
        let user_name = user_name.trim();
        if user_name.is_empty() {
            return Err(AppError::BadRequest("Please enter your name".to_string()));
        }
        self.session.set_user(user_name);
        self.state.user_name = user_name.to_string();
        self.persist()?;

        if let Err(err) = self.backend.register_user(user_name, Utc::now()).await {
            tracing::warn!(user = user_name, error = %err, "user registration failed");
        }
        tracing::info!(user = user_name, role = ?self.session.role(), "signed in");
        Ok(())
    }

    /// Fetch folders, then submissions.
    pub async fn refresh(&mut self) -> Result<(), AppError> {
        self.load_folders().await?;
        self.load_submissions().await?;
        Ok(())
    }

    /// Fetch the folder list and cache it in local state.
    ///
    /// # Returns
    /// The number of folders, `general` included.
    pub async fn load_folders(&mut self) -> Result<usize, AppError> {
        let mut folders = self.backend.list_folders().await?;
        if !folders.iter().any(Folder::is_general) {
            folders.insert(0, Folder::general());
        }
        self.folders = folders;
        self.folders_loaded = true;
        self.apply_folder_stats();
        self.state.folders = self.folders.clone();
        self.persist()?;
        tracing::info!(count = self.folders.len(), "loaded folders");
        Ok(self.folders.len())
    }

    /// Fetch every submission, refiling any whose folder no longer exists.
    ///
    /// Refiling needs a folder list fetched by this workspace; before that,
    /// submissions keep the folder the endpoint reports.
    ///
    /// # Returns
    /// The number of cached submissions.
    pub async fn load_submissions(&mut self) -> Result<usize, AppError> {
        let count = self.store.load(&self.backend).await?;
        if !self.folders_loaded {
            self.apply_folder_stats();
            return Ok(count);
        }
        let known: HashSet<&str> = self
            .folders
            .iter()
            .map(|folder| folder.id.as_str())
            .chain(self.state.projects.iter().map(|project| project.id.as_str()))
            .collect();
        let moved = self.store.reassign_orphans(&known);
        if moved > 0 {
            tracing::warn!(moved, "refiled submissions from unknown folders under general");
        }
        self.apply_folder_stats();
        Ok(count)
    }

    fn apply_folder_stats(&mut self) {
        if self.store.loaded_at().is_none() {
            return;
        }
        let stats = self.store.folder_stats();
        for folder in &mut self.folders {
            let entry = stats.get(&folder.id).copied().unwrap_or_default();
            folder.file_count = entry.file_count;
            folder.total_size = entry.total_size;
        }
    }

    pub fn folder(&self, folder_id: &str) -> Option<&Folder> {
        self.folders.iter().find(|folder| folder.id == folder_id)
    }

    /// Display name for a folder or project id, falling back to the id.
    pub fn folder_name(&self, folder_id: &str) -> String {
        if let Some(folder) = self.folder(folder_id) {
            return folder.name.clone();
        }
        if let Some(project) = self.state.project(folder_id) {
            return project.name.clone();
        }
        folder_id.to_string()
    }

    /// Folders the session may select.
    pub fn visible_folders(&self) -> Vec<&Folder> {
        access::visible_folders(&self.folders, &self.session)
    }

    /// Make `folder_id` the current folder.
    ///
    /// # Errors
    /// Returns [`AppError::NotFound`] for unknown folders and
    /// [`AppError::PermissionDenied`] for private folders the session cannot
    /// see; the current folder is unchanged in both cases.
    pub fn switch_folder(&mut self, folder_id: &str) -> Result<(), AppError> {
        let folder = self.folder(folder_id).ok_or(AppError::NotFound)?;
        access::ensure_can_switch(folder, &self.session)?;
        let name = folder.name.clone();
        self.set_current_folder(folder_id);
        self.log_activity(format!("Switched to folder: {}", name));
        self.persist()
    }

    /// Make a local project the current folder.
    pub fn switch_project(&mut self, project_id: &str) -> Result<(), AppError> {
        let name = self
            .state
            .project(project_id)
            .map(|project| project.name.clone())
            .ok_or(AppError::NotFound)?;
        self.set_current_folder(project_id);
        self.log_activity(format!("Switched to project: {}", name));
        self.persist()
    }

    /// Create a folder owned by the current user and reload the folder list.
    ///
    /// # Returns
    /// The new folder id when the endpoint reports one.
    pub async fn create_folder(
        &mut self,
        name: &str,
        privacy: Privacy,
    ) -> Result<Option<String>, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest(
                "Please enter a folder name".to_string(),
            ));
        }
        let request = CreateFolderRequest {
            folder_name: name.to_string(),
            privacy,
            owner: self.session.user_name().to_string(),
        };
        let folder_id = self.backend.create_folder(&request).await?;
        tracing::info!(folder = name, %privacy, "created folder");
        self.log_activity(format!("Created {} folder: {}", privacy, name));
        self.load_folders().await?;
        Ok(folder_id)
    }

    /// Delete a folder; its files end up in `general`.
    ///
    /// The endpoint moves member files; any it misses are refiled locally on
    /// the following reload. Deleting the current folder switches to
    /// `general` first. Once the endpoint confirms the delete, a failed
    /// reload is only logged.
    pub async fn delete_folder(&mut self, folder_id: &str) -> Result<(), AppError> {
        let folder = self.folder(folder_id).ok_or(AppError::NotFound)?;
        access::ensure_can_delete_folder(folder, &self.session)?;
        let name = folder.name.clone();

        self.backend.delete_folder(folder_id).await?;
        tracing::info!(folder_id, "deleted folder");
        if self.session.current_folder() == folder_id {
            self.set_current_folder(GENERAL_FOLDER_ID);
            let general = self.folder_name(GENERAL_FOLDER_ID);
            self.log_activity(format!("Switched to folder: {}", general));
        }
        self.log_activity(format!("Deleted folder: {}", name));
        self.persist()?;
        if let Err(err) = self.refresh().await {
            tracing::warn!(folder_id, error = %err, "reload after folder delete failed");
        }
        Ok(())
    }

    /// Cached submissions matching `query`.
    pub fn filter(&self, query: &FilterQuery) -> Vec<&Submission> {
        self.store.filter(query)
    }

    /// Every cached submission in the current folder.
    pub fn current_submissions(&self) -> Vec<&Submission> {
        self.filter(&FilterQuery::folder(self.session.current_folder()))
    }

    /// Current-folder listing narrowed by search term and file type.
    pub fn search(&self, term: Option<&str>, file_type: Option<&str>) -> Vec<&Submission> {
        self.store
            .filter_by(self.session.current_folder(), term, file_type)
    }

    pub fn starred(&self) -> Vec<&Submission> {
        self.store
            .starred(self.session.current_folder(), &self.state.starred_files)
    }

    pub fn recent(&self) -> Vec<&Submission> {
        self.store
            .recent(self.session.current_folder(), RECENT_SUBMISSIONS_LIMIT)
    }

    pub fn is_starred(&self, submission_id: &str) -> bool {
        self.state.starred_files.contains(submission_id)
    }

    /// Star or unstar a submission.
    ///
    /// # Returns
    /// `true` when the submission is starred after the call.
    pub fn toggle_star(&mut self, submission_id: &str) -> Result<bool, AppError> {
        let starred = self.state.starred_files.toggle(submission_id);
        self.log_activity("Toggled star for file");
        self.persist()?;
        Ok(starred)
    }

    pub fn can_edit(&self, submission: &Submission) -> bool {
        access::can_edit(submission, &self.session)
    }

    fn ensure_assignable(&self, folder_id: &str) -> Result<(), AppError> {
        if folder_id == GENERAL_FOLDER_ID || self.state.project(folder_id).is_some() {
            return Ok(());
        }
        match self.folder(folder_id) {
            Some(folder) => access::ensure_can_switch(folder, &self.session),
            None => Err(AppError::BadRequest(format!(
                "Unknown folder '{}'",
                folder_id
            ))),
        }
    }

    fn target_folder(&self, requested: Option<String>) -> Result<String, AppError> {
        let folder = normalize_optional_nonempty(requested)
            .unwrap_or_else(|| self.session.current_folder().to_string());
        self.ensure_assignable(&folder)?;
        Ok(folder)
    }

    /// Send one `SUBMIT_CODE` per file, in order, then reload.
    ///
    /// The batch stops at the first failed file; files already sent stay
    /// stored.
    ///
    /// # Returns
    /// The ids reported for each uploaded file.
    pub async fn upload(
        &mut self,
        files: Vec<UploadFile>,
        options: UploadOptions,
    ) -> Result<Vec<Option<String>>, AppError> {
        if files.is_empty() {
            return Err(AppError::BadRequest(
                "Please select at least one file to upload.".to_string(),
            ));
        }
        let folder = self.target_folder(options.folder)?;
        let description = normalize_optional_nonempty(options.description)
            .unwrap_or_else(|| UPLOAD_DEFAULT_DESCRIPTION.to_string());

        let mut ids = Vec::with_capacity(files.len());
        let mut failure = None;
        for file in files {
            let now = Utc::now();
            let new = NewSubmission {
                file_type: file_type_from_name(&file.file_name),
                file_size: file.content.len() as u64,
                file_name: file.file_name,
                code_content: file.content,
                timestamp: now,
                description: description.clone(),
                folder: folder.clone(),
                uploaded_by: self.session.uploader_name().to_string(),
                tags: options.tags.clone(),
                expiration: options.expiration.wire_value(now),
            };
            match self.backend.create_submission(&new).await {
                Ok(id) => ids.push(id),
                Err(err) => {
                    tracing::warn!(file = %new.file_name, error = %err, "upload failed");
                    failure = Some(err);
                    break;
                }
            }
        }

        if !ids.is_empty() {
            tracing::info!(count = ids.len(), folder = %folder, "uploaded files");
            self.log_activity(format!("Uploaded {} file(s)", ids.len()));
            self.persist()?;
            self.load_submissions().await?;
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(ids),
        }
    }

    /// Store a file composed in the editor.
    pub async fn create_from_editor(
        &mut self,
        draft: EditorDraft,
    ) -> Result<Option<String>, AppError> {
        let file_name = draft.file_name.trim().to_string();
        if file_name.is_empty() {
            return Err(AppError::BadRequest("Please enter a file name".to_string()));
        }
        if draft.code_content.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Please write some code before creating a file".to_string(),
            ));
        }
        let folder = self.target_folder(draft.folder)?;
        let now = Utc::now();
        let new = NewSubmission {
            file_type: file_type_from_name(&file_name),
            file_size: draft.code_content.len() as u64,
            code_content: draft.code_content,
            timestamp: now,
            description: normalize_optional_nonempty(draft.description)
                .unwrap_or_else(|| EDITOR_DEFAULT_DESCRIPTION.to_string()),
            folder,
            uploaded_by: self.session.uploader_name().to_string(),
            tags: draft.tags,
            expiration: Expiration::Never.wire_value(now),
            file_name,
        };
        let id = self.backend.create_submission(&new).await?;
        tracing::info!(file = %new.file_name, "created file from editor");
        self.log_activity(format!("Created file: {}", new.file_name));
        self.persist()?;
        self.load_submissions().await?;
        Ok(id)
    }

    /// Apply `edit` to a submission the session may edit, then reload.
    ///
    /// A rename re-derives the file type from the new name.
    pub async fn update_submission(
        &mut self,
        submission_id: &str,
        edit: SubmissionEdit,
    ) -> Result<(), AppError> {
        let current = self.store.get(submission_id).ok_or(AppError::NotFound)?;
        access::ensure_can_edit(current, &self.session)?;

        let file_name = match edit.file_name {
            Some(name) => name.trim().to_string(),
            None => current.file_name.clone(),
        };
        if file_name.is_empty() {
            return Err(AppError::BadRequest("File name cannot be empty".to_string()));
        }
        let code_content = edit
            .code_content
            .unwrap_or_else(|| current.code_content.clone());
        if code_content.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Code content cannot be empty".to_string(),
            ));
        }
        let file_type = if file_name == current.file_name {
            current.file_type.clone()
        } else {
            file_type_from_name(&file_name)
        };
        let folder = match normalize_optional_nonempty(edit.folder) {
            Some(folder) => {
                self.ensure_assignable(&folder)?;
                folder
            }
            None => self
                .store
                .stored_folder(submission_id)
                .unwrap_or(current.folder.as_str())
                .to_string(),
        };
        let update = SubmissionUpdate {
            submission_id: submission_id.to_string(),
            file_type,
            code_content,
            description: edit
                .description
                .map(|d| d.trim().to_string())
                .unwrap_or_else(|| current.description.clone()),
            tags: edit.tags.unwrap_or_else(|| current.tags.clone()),
            folder,
            last_modified: Utc::now(),
            modified_by: self.session.uploader_name().to_string(),
            file_name,
        };

        self.backend.update_submission(&update).await?;
        tracing::info!(submission_id, "updated file");
        self.log_activity(format!("Edited file: {}", update.file_name));
        self.persist()?;
        self.load_submissions().await?;
        Ok(())
    }

    async fn delete_one(&mut self, submission_id: &str) -> Result<String, AppError> {
        let submission = self.store.get(submission_id).ok_or(AppError::NotFound)?;
        access::ensure_can_delete(submission, &self.session)?;
        let file_name = submission.file_name.clone();
        self.backend.delete_submission(submission_id).await?;
        if self.state.starred_files.contains(submission_id) {
            self.state.starred_files.toggle(submission_id);
        }
        self.log_activity(format!("Deleted file: {}", file_name));
        Ok(file_name)
    }

    /// Delete one submission the session may delete, then reload.
    pub async fn delete_submission(&mut self, submission_id: &str) -> Result<(), AppError> {
        self.delete_one(submission_id).await?;
        tracing::info!(submission_id, "deleted file");
        self.persist()?;
        self.load_submissions().await?;
        Ok(())
    }

    /// Delete each id in turn, continuing past failures, then reload once.
    ///
    /// Nothing is rolled back when an item fails.
    pub async fn bulk_delete(&mut self, ids: &[String]) -> Result<BulkDeleteReport, AppError> {
        if ids.is_empty() {
            return Err(AppError::BadRequest("No files selected".to_string()));
        }
        let mut report = BulkDeleteReport::default();
        for id in ids {
            match self.delete_one(id).await {
                Ok(_) => report.deleted.push(id.clone()),
                Err(err) => {
                    tracing::warn!(submission_id = %id, error = %err, "bulk delete item failed");
                    report.failed.push((id.clone(), err));
                }
            }
        }
        tracing::info!(
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "bulk delete finished"
        );
        self.persist()?;
        if let Err(err) = self.load_submissions().await {
            tracing::warn!(error = %err, "reload after bulk delete failed");
        }
        Ok(report)
    }

    pub fn analytics(&self) -> Analytics {
        self.store.analytics(self.state.projects.len())
    }

    /// Copies of every submission in the current folder, for writing to disk.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] when the folder is empty.
    pub fn export_current_folder(&mut self) -> Result<Vec<Submission>, AppError> {
        let files: Vec<Submission> = self.current_submissions().into_iter().cloned().collect();
        if files.is_empty() {
            return Err(AppError::BadRequest(
                "No files to export in this folder.".to_string(),
            ));
        }
        self.log_activity(format!("Exported {} files", files.len()));
        self.persist()?;
        Ok(files)
    }

    pub fn create_project(&mut self, name: &str, description: &str) -> Result<Project, AppError> {
        let project = self
            .state
            .create_project(name, description, Utc::now())?
            .clone();
        self.log_activity(format!("Created project: {}", project.name));
        self.persist()?;
        Ok(project)
    }

    pub fn projects(&self) -> &[Project] {
        &self.state.projects
    }

    /// Post to a chat thread; blank text posts nothing.
    pub fn post_chat_message(
        &mut self,
        chat_id: &str,
        text: &str,
    ) -> Result<Option<ChatMessage>, AppError> {
        let message = self
            .state
            .post_chat_message(chat_id, text, Utc::now())
            .cloned();
        if message.is_some() {
            self.persist()?;
        }
        Ok(message)
    }

    pub fn chat(&self, chat_id: &str) -> &[ChatMessage] {
        self.state.chat(chat_id)
    }

    pub fn activity(&self, limit: usize) -> &[ActivityEntry] {
        self.state.activity_log.recent(limit)
    }

    pub fn set_dark_mode(&mut self, enabled: bool) -> Result<(), AppError> {
        self.state.dark_mode = enabled;
        self.persist()
    }
}

#[cfg(test)]
mod tests;
