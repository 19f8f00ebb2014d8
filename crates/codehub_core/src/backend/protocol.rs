//! Action-discriminated wire contract shared by the HTTP client and the
//! endpoint server.
//!
//! Every request carries an `action` parameter plus flat string fields, sent
//! either as a form-encoded POST body or a query string. Every response is a
//! JSON object with `success`, an optional `error`, and action-specific
//! payload keys at the top level.

use crate::{
    error::AppError,
    models::{wire, CreateFolderRequest, Folder, NewSubmission, Privacy, Submission, SubmissionUpdate},
    text::{join_tags, parse_tags},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Operation selector carried in the `action` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    RegisterUser,
    SubmitCode,
    UpdateFile,
    GetSubmissions,
    GetFolders,
    CreateFolder,
    DeleteFolder,
    DeleteFile,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::RegisterUser,
        Action::SubmitCode,
        Action::UpdateFile,
        Action::GetSubmissions,
        Action::GetFolders,
        Action::CreateFolder,
        Action::DeleteFolder,
        Action::DeleteFile,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::RegisterUser => "REGISTER_USER",
            Self::SubmitCode => "SUBMIT_CODE",
            Self::UpdateFile => "UPDATE_FILE",
            Self::GetSubmissions => "GET_SUBMISSIONS",
            Self::GetFolders => "GET_FOLDERS",
            Self::CreateFolder => "CREATE_FOLDER",
            Self::DeleteFolder => "DELETE_FOLDER",
            Self::DeleteFile => "DELETE_FILE",
        }
    }

    /// Whether the action is sent as a query-string GET instead of a form POST.
    pub fn uses_get(self) -> bool {
        matches!(
            self,
            Self::GetSubmissions | Self::GetFolders | Self::DeleteFile
        )
    }

    /// Message reported when the endpoint fails without an `error` field.
    pub fn default_error(self) -> &'static str {
        match self {
            Self::RegisterUser => "User registration failed",
            Self::SubmitCode => "Upload failed",
            Self::UpdateFile => "File update failed",
            Self::GetSubmissions => "Failed to load files",
            Self::GetFolders => "Failed to load folders",
            Self::CreateFolder => "Failed to create folder",
            Self::DeleteFolder => "Failed to delete folder",
            Self::DeleteFile => "Delete failed",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == value.trim())
            .ok_or_else(|| AppError::BadRequest("Unknown action".to_string()))
    }
}

/// Response wrapper: `{success, error?, ...payload}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub payload: T,
}

impl<T> Envelope<T> {
    pub fn ok(payload: T) -> Self {
        Self {
            success: true,
            error: None,
            payload,
        }
    }

    /// Unwrap the payload of a successful response.
    ///
    /// # Errors
    /// Returns [`AppError::Remote`] with the endpoint's message, or the
    /// action's default message when none was given.
    pub fn into_result(self, action: Action) -> Result<T, AppError> {
        if self.success {
            return Ok(self.payload);
        }
        let message = self
            .error
            .map(|message| message.trim().to_string())
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| action.default_error().to_string());
        Err(AppError::Remote(message))
    }
}

impl<T: Default> Envelope<T> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            payload: T::default(),
        }
    }
}

/// Payload of `GET_SUBMISSIONS`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SubmissionsPayload {
    #[serde(default)]
    pub submissions: Vec<Submission>,
}

/// Payload of `GET_FOLDERS`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FoldersPayload {
    #[serde(default)]
    pub folders: Vec<Folder>,
}

/// Payload of mutating actions; ids are reported when the endpoint knows them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    #[serde(
        default,
        deserialize_with = "wire::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub submission_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "wire::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub folder_id: Option<String>,
}

/// Flat request fields, in send order.
pub type FormFields = Vec<(&'static str, String)>;

fn with_action(action: Action, mut fields: FormFields) -> FormFields {
    fields.insert(0, ("action", action.as_str().to_string()));
    fields
}

pub fn register_user_form(user_name: &str, timestamp: DateTime<Utc>) -> FormFields {
    with_action(
        Action::RegisterUser,
        vec![
            ("userName", user_name.to_string()),
            ("timestamp", timestamp.to_rfc3339()),
        ],
    )
}

pub fn submit_form(submission: &NewSubmission) -> FormFields {
    with_action(
        Action::SubmitCode,
        vec![
            ("fileName", submission.file_name.clone()),
            ("fileType", submission.file_type.clone()),
            ("codeContent", submission.code_content.clone()),
            ("timestamp", submission.timestamp.to_rfc3339()),
            ("fileSize", submission.file_size.to_string()),
            ("description", submission.description.clone()),
            ("folder", submission.folder.clone()),
            ("uploadedBy", submission.uploaded_by.clone()),
            ("tags", join_tags(&submission.tags)),
            ("expiration", submission.expiration.clone()),
        ],
    )
}

pub fn update_form(update: &SubmissionUpdate) -> FormFields {
    with_action(
        Action::UpdateFile,
        vec![
            ("submissionId", update.submission_id.clone()),
            ("fileName", update.file_name.clone()),
            ("fileType", update.file_type.clone()),
            ("codeContent", update.code_content.clone()),
            ("description", update.description.clone()),
            ("tags", join_tags(&update.tags)),
            ("folder", update.folder.clone()),
            ("lastModified", update.last_modified.to_rfc3339()),
            ("modifiedBy", update.modified_by.clone()),
        ],
    )
}

pub fn create_folder_form(request: &CreateFolderRequest) -> FormFields {
    with_action(
        Action::CreateFolder,
        vec![
            ("folderName", request.folder_name.clone()),
            ("privacy", request.privacy.as_str().to_string()),
            ("owner", request.owner.clone()),
        ],
    )
}

pub fn delete_folder_form(folder_id: &str) -> FormFields {
    with_action(Action::DeleteFolder, vec![("folderId", folder_id.to_string())])
}

pub fn delete_file_query(submission_id: &str) -> FormFields {
    with_action(
        Action::DeleteFile,
        vec![("submissionId", submission_id.to_string())],
    )
}

/// Query for the list actions; `timestamp` defeats intermediary caches.
pub fn list_query(action: Action, now: DateTime<Utc>) -> FormFields {
    match action {
        Action::GetSubmissions => with_action(
            action,
            vec![("timestamp", now.timestamp_millis().to_string())],
        ),
        _ => with_action(action, Vec::new()),
    }
}

/// Decoded request parameters on the endpoint side.
#[derive(Debug, Clone, Default)]
pub struct FormParams(HashMap<String, String>);

impl From<HashMap<String, String>> for FormParams {
    fn from(value: HashMap<String, String>) -> Self {
        Self(value)
    }
}

impl FromIterator<(String, String)> for FormParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FormParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Fetch a field that must be present and non-blank.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] naming the missing field.
    pub fn required(&self, name: &str) -> Result<&str, AppError> {
        self.get(name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::BadRequest(format!("Missing field '{}'", name)))
    }

    fn text(&self, name: &str) -> String {
        self.get(name).unwrap_or_default().to_string()
    }

    /// Parse an optional RFC 3339 field; blank values count as absent.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] for malformed timestamps.
    pub fn timestamp(&self, name: &str) -> Result<Option<DateTime<Utc>>, AppError> {
        let Some(raw) = self.get(name).map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(None);
        };
        DateTime::parse_from_rfc3339(raw)
            .map(|parsed| Some(parsed.with_timezone(&Utc)))
            .map_err(|err| AppError::BadRequest(format!("Invalid '{}': {}", name, err)))
    }

    /// The request's action.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] with `Unknown action` when the action
    /// is missing or unrecognized.
    pub fn action(&self) -> Result<Action, AppError> {
        self.get("action").unwrap_or_default().parse()
    }
}

/// Decode a `SUBMIT_CODE` request.
///
/// # Errors
/// Returns [`AppError::BadRequest`] when `fileName` is missing or a
/// timestamp or size field is malformed.
pub fn parse_submit(params: &FormParams) -> Result<NewSubmission, AppError> {
    let file_name = params.required("fileName")?.to_string();
    let code_content = params.text("codeContent");
    let file_size = match params.get("fileSize").map(str::trim) {
        None | Some("") => code_content.len() as u64,
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::BadRequest(format!("Invalid 'fileSize': {}", raw)))?,
    };
    let file_type = match params.get("fileType").map(str::trim) {
        Some(file_type) if !file_type.is_empty() => file_type.to_string(),
        _ => crate::text::file_type_from_name(&file_name),
    };
    Ok(NewSubmission {
        file_type,
        timestamp: params.timestamp("timestamp")?.unwrap_or_else(Utc::now),
        file_size,
        description: params.text("description"),
        folder: params
            .get("folder")
            .map(str::trim)
            .filter(|folder| !folder.is_empty())
            .unwrap_or(crate::constants::GENERAL_FOLDER_ID)
            .to_string(),
        uploaded_by: params.text("uploadedBy"),
        tags: parse_tags(params.get("tags").unwrap_or_default()),
        expiration: params
            .get("expiration")
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or("never")
            .to_string(),
        file_name,
        code_content,
    })
}

/// Decode an `UPDATE_FILE` request.
///
/// # Errors
/// Returns [`AppError::BadRequest`] when `submissionId` or `fileName` is
/// missing or `lastModified` is malformed.
pub fn parse_update(params: &FormParams) -> Result<SubmissionUpdate, AppError> {
    let file_name = params.required("fileName")?.to_string();
    Ok(SubmissionUpdate {
        submission_id: params.required("submissionId")?.to_string(),
        file_type: params
            .get("fileType")
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| crate::text::file_type_from_name(&file_name)),
        file_name,
        code_content: params.text("codeContent"),
        description: params.text("description"),
        tags: parse_tags(params.get("tags").unwrap_or_default()),
        folder: params
            .get("folder")
            .map(str::trim)
            .filter(|folder| !folder.is_empty())
            .unwrap_or(crate::constants::GENERAL_FOLDER_ID)
            .to_string(),
        last_modified: params.timestamp("lastModified")?.unwrap_or_else(Utc::now),
        modified_by: params.text("modifiedBy"),
    })
}

/// Decode a `CREATE_FOLDER` request.
///
/// # Errors
/// Returns [`AppError::BadRequest`] when `folderName` is missing.
pub fn parse_create_folder(params: &FormParams) -> Result<CreateFolderRequest, AppError> {
    Ok(CreateFolderRequest {
        folder_name: params.required("folderName")?.to_string(),
        privacy: Privacy::parse(params.get("privacy").unwrap_or_default()),
        owner: params.text("owner").trim().to_string(),
    })
}
