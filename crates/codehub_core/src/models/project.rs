//! Locally managed projects.

use crate::constants::PROJECT_ID_PREFIX;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named grouping kept in local state; its id doubles as a folder id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub owner: String,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub files: u64,
}

impl Project {
    pub fn new(name: String, description: String, owner: String, now: DateTime<Utc>) -> Self {
        Self {
            id: format!("{}{}", PROJECT_ID_PREFIX, now.timestamp_millis()),
            name,
            description,
            owner,
            created: now,
            files: 0,
        }
    }
}
