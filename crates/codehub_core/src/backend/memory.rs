//! In-memory backend: a process-local stand-in for the spreadsheet datastore.

use super::Backend;
use crate::{
    constants::GENERAL_FOLDER_ID,
    models::{CreateFolderRequest, Folder, NewSubmission, Submission, SubmissionUpdate},
    AppError,
};
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// A user seen through `REGISTER_USER`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredUser {
    pub user_name: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    submissions: Vec<Submission>,
    folders: Vec<Folder>,
    users: Vec<RegisteredUser>,
}

/// Mutex-guarded tables; rows keep insertion order.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: Mutex<Tables>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with existing rows, e.g. fixtures or an imported snapshot.
    pub fn with_rows(submissions: Vec<Submission>, folders: Vec<Folder>) -> Self {
        Self {
            tables: Mutex::new(Tables {
                submissions,
                folders,
                users: Vec::new(),
            }),
        }
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // A panic while holding the lock cannot leave rows half-written; every
        // mutation below is a single push, remove or field assignment.
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Users registered so far.
    pub fn users(&self) -> Vec<RegisteredUser> {
        self.tables().users.clone()
    }

    fn register(&self, user_name: &str, timestamp: DateTime<Utc>) -> Result<(), AppError> {
        let user_name = user_name.trim();
        if user_name.is_empty() {
            return Err(AppError::Remote("User name is required".to_string()));
        }
        let mut tables = self.tables();
        match tables
            .users
            .iter_mut()
            .find(|user| user.user_name == user_name)
        {
            Some(user) => user.last_seen = timestamp,
            None => tables.users.push(RegisteredUser {
                user_name: user_name.to_string(),
                first_seen: timestamp,
                last_seen: timestamp,
            }),
        }
        Ok(())
    }

    fn insert_submission(&self, new: &NewSubmission) -> Result<String, AppError> {
        if new.file_name.trim().is_empty() {
            return Err(AppError::Remote("File name is required".to_string()));
        }
        let id = Uuid::new_v4().to_string();
        let submission = Submission::from_new(id.clone(), new.clone());
        self.tables().submissions.push(submission);
        tracing::debug!(submission_id = %id, folder = %new.folder, "stored submission");
        Ok(id)
    }

    fn apply_update(&self, update: &SubmissionUpdate) -> Result<(), AppError> {
        let mut tables = self.tables();
        let submission = tables
            .submissions
            .iter_mut()
            .find(|submission| submission.submission_id == update.submission_id)
            .ok_or_else(|| AppError::Remote("File not found".to_string()))?;
        submission.apply_update(update);
        Ok(())
    }

    fn remove_submission(&self, submission_id: &str) -> Result<(), AppError> {
        let mut tables = self.tables();
        let before = tables.submissions.len();
        tables
            .submissions
            .retain(|submission| submission.submission_id != submission_id);
        if tables.submissions.len() == before {
            return Err(AppError::Remote("File not found".to_string()));
        }
        Ok(())
    }

    fn folders_with_counts(&self) -> Vec<Folder> {
        let tables = self.tables();
        tables
            .folders
            .iter()
            .map(|folder| {
                let mut folder = folder.clone();
                let members = tables
                    .submissions
                    .iter()
                    .filter(|submission| submission.folder == folder.id);
                let (count, size) =
                    members.fold((0u64, 0u64), |(count, size), submission| {
                        (count + 1, size + submission.file_size)
                    });
                folder.file_count = count;
                folder.total_size = size;
                folder
            })
            .collect()
    }

    fn insert_folder(&self, request: &CreateFolderRequest) -> Result<String, AppError> {
        let name = request.folder_name.trim();
        if name.is_empty() {
            return Err(AppError::Remote("Folder name is required".to_string()));
        }
        let owner = Some(request.owner.trim().to_string()).filter(|owner| !owner.is_empty());
        let folder = Folder::new(name.to_string(), request.privacy, owner);
        let id = folder.id.clone();
        self.tables().folders.push(folder);
        Ok(id)
    }

    fn remove_folder(&self, folder_id: &str) -> Result<usize, AppError> {
        if folder_id == GENERAL_FOLDER_ID {
            return Err(AppError::Remote(
                "Cannot delete the General folder".to_string(),
            ));
        }
        let mut tables = self.tables();
        let Some(index) = tables.folders.iter().position(|f| f.id == folder_id) else {
            return Err(AppError::Remote("Folder not found".to_string()));
        };
        tables.folders.remove(index);

        let mut migrated = 0;
        for submission in tables
            .submissions
            .iter_mut()
            .filter(|submission| submission.folder == folder_id)
        {
            submission.folder = GENERAL_FOLDER_ID.to_string();
            migrated += 1;
        }
        Ok(migrated)
    }
}

impl Backend for MemoryBackend {
    async fn register_user(&self, user_name: &str, timestamp: DateTime<Utc>) -> Result<(), AppError> {
        self.register(user_name, timestamp)
    }

    async fn list_submissions(&self) -> Result<Vec<Submission>, AppError> {
        Ok(self.tables().submissions.clone())
    }

    async fn create_submission(&self, submission: &NewSubmission) -> Result<Option<String>, AppError> {
        self.insert_submission(submission).map(Some)
    }

    async fn update_submission(&self, update: &SubmissionUpdate) -> Result<(), AppError> {
        self.apply_update(update)
    }

    async fn delete_submission(&self, submission_id: &str) -> Result<(), AppError> {
        self.remove_submission(submission_id)
    }

    async fn list_folders(&self) -> Result<Vec<Folder>, AppError> {
        Ok(self.folders_with_counts())
    }

    async fn create_folder(&self, request: &CreateFolderRequest) -> Result<Option<String>, AppError> {
        self.insert_folder(request).map(Some)
    }

    async fn delete_folder(&self, folder_id: &str) -> Result<(), AppError> {
        let migrated = self.remove_folder(folder_id)?;
        tracing::info!(folder_id, migrated, "deleted folder and moved its files to general");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryBackend;
    use crate::backend::Backend;
    use crate::models::{CreateFolderRequest, Privacy};
    use crate::test_support::{new_submission, submission};
    use crate::AppError;
    use chrono::Utc;

    #[tokio::test]
    async fn create_then_list_assigns_ids() {
        let backend = MemoryBackend::new();
        let id = backend
            .create_submission(&new_submission("a.rs", "general", "ana"))
            .await
            .expect("create")
            .expect("id");

        let listed = backend.list_submissions().await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].submission_id, id);
        assert_eq!(listed[0].file_name, "a.rs");
    }

    #[tokio::test]
    async fn delete_unknown_submission_is_remote_error() {
        let backend = MemoryBackend::new();
        let err = backend.delete_submission("missing").await.expect_err("missing");
        assert!(matches!(err, AppError::Remote(ref msg) if msg == "File not found"));
    }

    #[tokio::test]
    async fn deleting_folder_moves_members_to_general() {
        let backend = MemoryBackend::new();
        let folder_id = backend
            .create_folder(&CreateFolderRequest {
                folder_name: "Tools".to_string(),
                privacy: Privacy::Public,
                owner: "ana".to_string(),
            })
            .await
            .expect("create folder")
            .expect("folder id");
        backend
            .create_submission(&new_submission("t.sh", &folder_id, "ana"))
            .await
            .expect("create");

        let folders = backend.list_folders().await.expect("folders");
        assert_eq!(folders[0].file_count, 1);

        backend.delete_folder(&folder_id).await.expect("delete folder");
        assert!(backend.list_folders().await.expect("folders").is_empty());
        let listed = backend.list_submissions().await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].folder, "general");
    }

    #[tokio::test]
    async fn general_folder_cannot_be_deleted() {
        let backend = MemoryBackend::with_rows(vec![submission("1", "general", "a", "ana")], vec![]);
        assert!(backend.delete_folder("general").await.is_err());
        assert_eq!(backend.list_submissions().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn register_user_upserts_by_name() {
        let backend = MemoryBackend::new();
        let first = Utc::now();
        backend.register_user("ana", first).await.expect("register");
        backend
            .register_user("ana", first + chrono::Duration::seconds(5))
            .await
            .expect("register again");
        let users = backend.users();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].first_seen, first);
        assert!(backend.register_user("  ", first).await.is_err());
    }
}
