//! Submission records and the payloads that create and update them.

use super::wire;
use crate::constants::GENERAL_FOLDER_ID;
use crate::error::AppError;
use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn general_folder() -> String {
    GENERAL_FOLDER_ID.to_string()
}

/// A stored code file with its metadata, as returned by `GET_SUBMISSIONS`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(deserialize_with = "wire::string_or_number")]
    pub submission_id: String,
    #[serde(deserialize_with = "wire::string_or_number")]
    pub file_name: String,
    #[serde(default, deserialize_with = "wire::text_or_default")]
    pub file_type: String,
    #[serde(default, deserialize_with = "wire::text_or_default")]
    pub code_content: String,
    #[serde(default, deserialize_with = "wire::lenient_u64")]
    pub file_size: u64,
    /// Upload time; `None` when the stored cell is blank or unreadable.
    #[serde(
        default,
        deserialize_with = "wire::optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "wire::text_or_default")]
    pub description: String,
    #[serde(default = "general_folder", deserialize_with = "wire::string_or_number")]
    pub folder: String,
    #[serde(default, deserialize_with = "wire::text_or_default")]
    pub uploaded_by: String,
    #[serde(default, deserialize_with = "wire::tags")]
    pub tags: Vec<String>,
    #[serde(
        default,
        deserialize_with = "wire::optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "wire::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub modified_by: Option<String>,
    #[serde(
        default,
        deserialize_with = "wire::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub expiration: Option<String>,
}

impl Submission {
    /// Materialize a stored record from an upload payload.
    pub fn from_new(submission_id: String, new: NewSubmission) -> Self {
        Self {
            submission_id,
            file_name: new.file_name,
            file_type: new.file_type,
            code_content: new.code_content,
            file_size: new.file_size,
            timestamp: Some(new.timestamp),
            description: new.description,
            folder: new.folder,
            uploaded_by: new.uploaded_by,
            tags: new.tags,
            last_modified: None,
            modified_by: None,
            expiration: Some(new.expiration),
        }
    }

    /// Overwrite the editable fields with an `UPDATE_FILE` payload.
    pub fn apply_update(&mut self, update: &SubmissionUpdate) {
        self.file_name = update.file_name.clone();
        self.file_type = update.file_type.clone();
        self.file_size = update.code_content.len() as u64;
        self.code_content = update.code_content.clone();
        self.description = update.description.clone();
        self.tags = update.tags.clone();
        self.folder = update.folder.clone();
        self.last_modified = Some(update.last_modified);
        self.modified_by = Some(update.modified_by.clone());
    }

    /// Number of lines in the code content; empty content has none.
    pub fn line_count(&self) -> usize {
        if self.code_content.is_empty() {
            0
        } else {
            self.code_content.matches('\n').count() + 1
        }
    }
}

/// Retention choice offered at upload time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Expiration {
    #[default]
    Never,
    OneDay,
    OneWeek,
    OneMonth,
    ThreeMonths,
}

impl Expiration {
    /// Instant at which an upload made at `now` expires.
    ///
    /// # Returns
    /// `None` for [`Expiration::Never`].
    pub fn expires_at(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Never => None,
            Self::OneDay => Some(now + Duration::days(1)),
            Self::OneWeek => Some(now + Duration::days(7)),
            Self::OneMonth => now.checked_add_months(Months::new(1)),
            Self::ThreeMonths => now.checked_add_months(Months::new(3)),
        }
    }

    /// Value sent in the `expiration` field: `never` or an RFC 3339 instant.
    pub fn wire_value(self, now: DateTime<Utc>) -> String {
        self.expires_at(now)
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| "never".to_string())
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Never => "never",
            Self::OneDay => "1day",
            Self::OneWeek => "1week",
            Self::OneMonth => "1month",
            Self::ThreeMonths => "3months",
        }
    }
}

impl fmt::Display for Expiration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Expiration {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "never" => Ok(Self::Never),
            "1day" => Ok(Self::OneDay),
            "1week" => Ok(Self::OneWeek),
            "1month" => Ok(Self::OneMonth),
            "3months" => Ok(Self::ThreeMonths),
            other => Err(AppError::BadRequest(format!(
                "Unknown expiration '{}' (expected never, 1day, 1week, 1month or 3months)",
                other
            ))),
        }
    }
}

/// Complete `SUBMIT_CODE` payload.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubmission {
    pub file_name: String,
    pub file_type: String,
    pub code_content: String,
    pub timestamp: DateTime<Utc>,
    pub file_size: u64,
    pub description: String,
    pub folder: String,
    pub uploaded_by: String,
    pub tags: Vec<String>,
    pub expiration: String,
}

/// Complete `UPDATE_FILE` payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionUpdate {
    pub submission_id: String,
    pub file_name: String,
    pub file_type: String,
    pub code_content: String,
    pub description: String,
    pub tags: Vec<String>,
    pub folder: String,
    pub last_modified: DateTime<Utc>,
    pub modified_by: String,
}

/// A file picked for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content: String,
}

/// Form fields shared by every file in one upload batch.
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    pub description: Option<String>,
    pub folder: Option<String>,
    pub tags: Vec<String>,
    pub expiration: Expiration,
}

/// A file composed in the editor rather than read from disk.
#[derive(Debug, Clone, Default)]
pub struct EditorDraft {
    pub file_name: String,
    pub code_content: String,
    pub description: Option<String>,
    pub folder: Option<String>,
    pub tags: Vec<String>,
}

/// Requested changes to an existing submission; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct SubmissionEdit {
    pub file_name: Option<String>,
    pub code_content: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub folder: Option<String>,
}
