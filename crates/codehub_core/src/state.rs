//! Per-user state persisted between client runs.
//!
//! The document is a single JSON object whose keys match the browser client's
//! storage keys, so a state export from either client loads in the other.

use crate::{
    constants::{ACTIVITY_LOG_CAPACITY, GENERAL_FOLDER_ID},
    models::{ActivityEntry, ChatMessage, Folder, Project},
    AppError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Ids of starred submissions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct StarredFiles(BTreeSet<String>);

impl StarredFiles {
    /// Flip membership of `id`.
    ///
    /// # Returns
    /// `true` when the id is starred after the call.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.0.remove(id) {
            false
        } else {
            self.0.insert(id.to_string());
            true
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Newest-first activity entries, capped at [`ACTIVITY_LOG_CAPACITY`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ActivityLog(Vec<ActivityEntry>);

impl ActivityLog {
    pub fn record(&mut self, entry: ActivityEntry) {
        self.0.insert(0, entry);
        self.0.truncate(ACTIVITY_LOG_CAPACITY);
    }

    /// Up to `limit` most recent entries.
    pub fn recent(&self, limit: usize) -> &[ActivityEntry] {
        &self.0[..limit.min(self.0.len())]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn enforce_capacity(&mut self) {
        self.0.truncate(ACTIVITY_LOG_CAPACITY);
    }
}

/// Everything the client remembers locally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalState {
    pub user_name: String,
    pub current_folder: String,
    pub dark_mode: bool,
    pub projects: Vec<Project>,
    pub starred_files: StarredFiles,
    pub activity_log: ActivityLog,
    /// Folder list from the last successful fetch.
    pub folders: Vec<Folder>,
    pub chat_messages: BTreeMap<String, Vec<ChatMessage>>,
}

impl Default for LocalState {
    fn default() -> Self {
        Self {
            user_name: String::new(),
            current_folder: GENERAL_FOLDER_ID.to_string(),
            dark_mode: false,
            projects: Vec::new(),
            starred_files: StarredFiles::default(),
            activity_log: ActivityLog::default(),
            folders: Vec::new(),
            chat_messages: BTreeMap::new(),
        }
    }
}

impl LocalState {
    /// Read the state document at `path`.
    ///
    /// # Returns
    /// Default state when the file does not exist.
    ///
    /// # Errors
    /// Returns I/O errors other than not-found, and serialization errors for
    /// malformed documents.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut state: Self = serde_json::from_str(&raw)?;
        state.normalize();
        Ok(state)
    }

    /// Write the state document via a sibling temp file and rename.
    ///
    /// # Errors
    /// Returns I/O or serialization errors; the previous document is left in
    /// place when writing the temp file fails.
    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let encoded = serde_json::to_vec_pretty(self)?;
        let mut temp_name = path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = std::path::PathBuf::from(temp_name);
        std::fs::write(&temp_path, encoded)?;
        std::fs::rename(&temp_path, path)?;
        Ok(())
    }

    fn normalize(&mut self) {
        if self.current_folder.trim().is_empty() {
            self.current_folder = GENERAL_FOLDER_ID.to_string();
        }
        self.user_name = self.user_name.trim().to_string();
        self.activity_log.enforce_capacity();
    }

    /// Prepend an activity entry, evicting the oldest beyond capacity.
    pub fn log_activity(&mut self, action: impl Into<String>, now: DateTime<Utc>) {
        self.activity_log.record(ActivityEntry {
            action: action.into(),
            user: self.user_name.clone(),
            timestamp: now,
            folder: self.current_folder.clone(),
        });
    }

    /// Add a project owned by the current user.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] for a blank name.
    pub fn create_project(
        &mut self,
        name: &str,
        description: &str,
        now: DateTime<Utc>,
    ) -> Result<&Project, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest(
                "Please enter a project name".to_string(),
            ));
        }
        let mut project = Project::new(
            name.to_string(),
            description.trim().to_string(),
            self.user_name.clone(),
            now,
        );
        project.id = unique_id(project.id, |id| self.project(id).is_some());
        self.projects.push(project);
        Ok(&self.projects[self.projects.len() - 1])
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == id)
    }

    /// Append a chat message from the current user.
    ///
    /// # Returns
    /// `None` when `text` is blank and nothing was posted.
    pub fn post_chat_message(
        &mut self,
        chat_id: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> Option<&ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let mut message = ChatMessage::new(
            chat_id.to_string(),
            self.user_name.clone(),
            text.to_string(),
            now,
        );
        let messages = self.chat_messages.entry(chat_id.to_string()).or_default();
        message.id = unique_id(message.id, |id| messages.iter().any(|m| m.id == id));
        messages.push(message);
        messages.last()
    }

    pub fn chat(&self, chat_id: &str) -> &[ChatMessage] {
        self.chat_messages
            .get(chat_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// `base`, or `base_<n>` for the first `n` not already taken.
fn unique_id(base: String, taken: impl Fn(&str) -> bool) -> String {
    if !taken(&base) {
        return base;
    }
    let mut suffix = 1;
    loop {
        let candidate = format!("{}_{}", base, suffix);
        if !taken(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}
