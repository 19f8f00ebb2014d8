//! HTTP backend speaking the action-dispatched endpoint contract.

use chrono::{DateTime, Utc};
use codehub_core::{
    backend::protocol::{
        create_folder_form, delete_file_query, delete_folder_form, list_query,
        register_user_form, submit_form, update_form, Envelope, FoldersPayload, FormFields,
        Receipt, SubmissionsPayload,
    },
    backend::Action,
    models::{CreateFolderRequest, Folder, NewSubmission, Submission, SubmissionUpdate},
    AppError, Backend,
};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Remote datastore reached through a single endpoint URL.
#[derive(Debug, Clone)]
pub struct AppsScriptBackend {
    client: reqwest::Client,
    endpoint: reqwest::Url,
}

impl AppsScriptBackend {
    /// Build a client for `endpoint` with a per-request timeout.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] for an unparseable URL and
    /// [`AppError::Transport`] when the HTTP client cannot be built.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, AppError> {
        let endpoint = reqwest::Url::parse(endpoint.trim()).map_err(|err| {
            AppError::BadRequest(format!("Invalid endpoint URL '{}': {}", endpoint, err))
        })?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::Transport(err.to_string()))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &reqwest::Url {
        &self.endpoint
    }

    async fn call<T>(&self, action: Action, fields: FormFields) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        let request = if action.uses_get() {
            self.client.get(self.endpoint.clone()).query(&fields)
        } else {
            self.client.post(self.endpoint.clone()).form(&fields)
        };
        let response = request.send().await.map_err(|err| {
            tracing::warn!(%action, error = %err, "request failed");
            AppError::Transport(err.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%action, status = status.as_u16(), "endpoint returned error status");
            return Err(AppError::Transport(format!("HTTP {}", status.as_u16())));
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|err| AppError::Transport(format!("Invalid response: {}", err)))?;
        tracing::debug!(%action, success = envelope.success, "endpoint responded");
        envelope.into_result(action)
    }
}

impl Backend for AppsScriptBackend {
    async fn register_user(&self, user_name: &str, timestamp: DateTime<Utc>) -> Result<(), AppError> {
        self.call::<Receipt>(Action::RegisterUser, register_user_form(user_name, timestamp))
            .await
            .map(|_| ())
    }

    async fn list_submissions(&self) -> Result<Vec<Submission>, AppError> {
        let payload: SubmissionsPayload = self
            .call(Action::GetSubmissions, list_query(Action::GetSubmissions, Utc::now()))
            .await?;
        Ok(payload.submissions)
    }

    async fn create_submission(&self, submission: &NewSubmission) -> Result<Option<String>, AppError> {
        let receipt: Receipt = self.call(Action::SubmitCode, submit_form(submission)).await?;
        Ok(receipt.submission_id)
    }

    async fn update_submission(&self, update: &SubmissionUpdate) -> Result<(), AppError> {
        self.call::<Receipt>(Action::UpdateFile, update_form(update))
            .await
            .map(|_| ())
    }

    async fn delete_submission(&self, submission_id: &str) -> Result<(), AppError> {
        self.call::<Receipt>(Action::DeleteFile, delete_file_query(submission_id))
            .await
            .map(|_| ())
    }

    async fn list_folders(&self) -> Result<Vec<Folder>, AppError> {
        let payload: FoldersPayload = self
            .call(Action::GetFolders, list_query(Action::GetFolders, Utc::now()))
            .await?;
        Ok(payload.folders)
    }

    async fn create_folder(&self, request: &CreateFolderRequest) -> Result<Option<String>, AppError> {
        let receipt: Receipt = self.call(Action::CreateFolder, create_folder_form(request)).await?;
        Ok(receipt.folder_id)
    }

    async fn delete_folder(&self, folder_id: &str) -> Result<(), AppError> {
        self.call::<Receipt>(Action::DeleteFolder, delete_folder_form(folder_id))
            .await
            .map(|_| ())
    }
}
