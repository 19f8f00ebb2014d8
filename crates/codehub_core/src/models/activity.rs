use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One line of the local activity log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityEntry {
    pub action: String,
    #[serde(default)]
    pub user: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub folder: String,
}
