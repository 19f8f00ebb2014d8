//! Folder model and privacy scope.

use super::wire;
use crate::constants::{GENERAL_FOLDER_ID, GENERAL_FOLDER_NAME};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Who may select a folder.
///
/// Anything the endpoint reports other than `public` is treated as private.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Privacy {
    Public,
    #[default]
    Private,
}

impl From<String> for Privacy {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl Privacy {
    /// Parse a privacy label; unknown labels are private.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("public") {
            Self::Public
        } else {
            Self::Private
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, privacy-scoped grouping of submissions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    #[serde(deserialize_with = "wire::string_or_number")]
    pub id: String,
    #[serde(deserialize_with = "wire::string_or_number")]
    pub name: String,
    #[serde(default)]
    pub privacy: Privacy,
    #[serde(
        default,
        deserialize_with = "wire::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub owner: Option<String>,
    #[serde(default, deserialize_with = "wire::lenient_u64")]
    pub file_count: u64,
    #[serde(default, deserialize_with = "wire::lenient_u64")]
    pub total_size: u64,
}

/// `CREATE_FOLDER` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateFolderRequest {
    pub folder_name: String,
    pub privacy: Privacy,
    pub owner: String,
}

impl Folder {
    /// Create a folder with a fresh id and zeroed counters.
    pub fn new(name: String, privacy: Privacy, owner: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            privacy,
            owner,
            file_count: 0,
            total_size: 0,
        }
    }

    /// The default folder every user can see.
    pub fn general() -> Self {
        Self {
            id: GENERAL_FOLDER_ID.to_string(),
            name: GENERAL_FOLDER_NAME.to_string(),
            privacy: Privacy::Public,
            owner: None,
            file_count: 0,
            total_size: 0,
        }
    }

    pub fn is_general(&self) -> bool {
        self.id == GENERAL_FOLDER_ID
    }

    /// Size label shown next to the folder name, in KiB with one decimal.
    pub fn size_label(&self) -> String {
        format!("{:.1} KB", self.total_size as f64 / 1024.0)
    }
}
