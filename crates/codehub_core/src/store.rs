//! In-memory submission cache and the filters that compute visible subsets.

use crate::{
    backend::Backend,
    constants::GENERAL_FOLDER_ID,
    models::Submission,
    state::StarredFiles,
    text::{contains_folded, normalize_optional_nonempty},
    AppError,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Folder, search term and file type narrowing a submission listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterQuery {
    folder: String,
    search: Option<String>,
    file_type: Option<String>,
}

impl FilterQuery {
    /// Match everything filed under `folder`.
    pub fn folder(folder: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            search: None,
            file_type: None,
        }
    }

    /// Also require `term` in a searchable field; blank terms are ignored.
    pub fn with_search(mut self, term: Option<String>) -> Self {
        self.search = normalize_optional_nonempty(term).map(|term| term.to_lowercase());
        self
    }

    /// Also require this file type; blank types are ignored.
    pub fn with_file_type(mut self, file_type: Option<String>) -> Self {
        self.file_type = normalize_optional_nonempty(file_type).map(|value| value.to_lowercase());
        self
    }

    pub fn folder_id(&self) -> &str {
        &self.folder
    }

    /// Whether `submission` satisfies every set criterion.
    pub fn matches(&self, submission: &Submission) -> bool {
        if submission.folder != self.folder {
            return false;
        }
        if let Some(term) = self.search.as_deref() {
            let hit = contains_folded(&submission.file_name, term)
                || contains_folded(&submission.description, term)
                || contains_folded(&submission.code_content, term)
                || contains_folded(&submission.uploaded_by, term)
                || submission
                    .tags
                    .iter()
                    .any(|tag| contains_folded(tag, term));
            if !hit {
                return false;
            }
        }
        if let Some(file_type) = self.file_type.as_deref() {
            if submission.file_type.to_lowercase() != file_type {
                return false;
            }
        }
        true
    }

    /// Keep the matching items, preserving order.
    pub fn apply<'a, I>(&self, submissions: I) -> Vec<&'a Submission>
    where
        I: IntoIterator<Item = &'a Submission>,
    {
        submissions
            .into_iter()
            .filter(|submission| self.matches(submission))
            .collect()
    }
}

/// File count and byte total for one folder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderStats {
    pub file_count: u64,
    pub total_size: u64,
}

/// Dashboard figures across every cached submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub total_files: usize,
    pub total_lines: usize,
    pub storage_bytes: u64,
    pub collaborators: usize,
    pub file_types: usize,
    pub active_projects: usize,
}

impl Analytics {
    /// Storage used in MiB, as shown on the dashboard.
    pub fn storage_mib(&self) -> f64 {
        self.storage_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// The authoritative local copy of every fetched submission.
#[derive(Debug, Clone, Default)]
pub struct SubmissionStore {
    submissions: Vec<Submission>,
    loaded_at: Option<DateTime<Utc>>,
    /// Folder each refiled submission is stored under on the endpoint.
    refiled: BTreeMap<String, String>,
}

impl SubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_submissions(submissions: Vec<Submission>) -> Self {
        Self {
            submissions,
            loaded_at: Some(Utc::now()),
            refiled: BTreeMap::new(),
        }
    }

    /// Replace the cached set with a fresh fetch from `backend`.
    ///
    /// # Returns
    /// The number of submissions now cached.
    ///
    /// # Errors
    /// Propagates the backend error; the previous contents stay in place.
    pub async fn load<B: Backend>(&mut self, backend: &B) -> Result<usize, AppError> {
        match backend.list_submissions().await {
            Ok(submissions) => {
                self.replace(submissions);
                tracing::info!(count = self.submissions.len(), "loaded submissions");
                Ok(self.submissions.len())
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    cached = self.submissions.len(),
                    "failed to load submissions; keeping cached copy"
                );
                Err(err)
            }
        }
    }

    /// Swap in a complete submission list.
    pub fn replace(&mut self, submissions: Vec<Submission>) {
        self.submissions = submissions;
        self.loaded_at = Some(Utc::now());
        self.refiled.clear();
    }

    /// When the cached list was last replaced, if ever.
    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    pub fn all(&self) -> &[Submission] {
        &self.submissions
    }

    pub fn len(&self) -> usize {
        self.submissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }

    pub fn get(&self, submission_id: &str) -> Option<&Submission> {
        self.submissions
            .iter()
            .find(|submission| submission.submission_id == submission_id)
    }

    /// The folder the endpoint has on record for a submission, ignoring any
    /// local refiling.
    pub fn stored_folder(&self, submission_id: &str) -> Option<&str> {
        match self.refiled.get(submission_id) {
            Some(folder) => Some(folder.as_str()),
            None => self.get(submission_id).map(|submission| submission.folder.as_str()),
        }
    }

    /// Submissions matching `query`.
    pub fn filter(&self, query: &FilterQuery) -> Vec<&Submission> {
        query.apply(&self.submissions)
    }

    /// Folder listing narrowed by optional search term and file type.
    pub fn filter_by(
        &self,
        folder: &str,
        search: Option<&str>,
        file_type: Option<&str>,
    ) -> Vec<&Submission> {
        let query = FilterQuery::folder(folder)
            .with_search(search.map(str::to_string))
            .with_file_type(file_type.map(str::to_string));
        self.filter(&query)
    }

    /// Starred submissions filed under `folder`.
    pub fn starred(&self, folder: &str, starred: &StarredFiles) -> Vec<&Submission> {
        self.submissions
            .iter()
            .filter(|submission| {
                submission.folder == folder && starred.contains(&submission.submission_id)
            })
            .collect()
    }

    /// The `limit` newest submissions in `folder`, newest first.
    pub fn recent(&self, folder: &str, limit: usize) -> Vec<&Submission> {
        let mut in_folder: Vec<&Submission> = self
            .submissions
            .iter()
            .filter(|submission| submission.folder == folder)
            .collect();
        in_folder.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        in_folder.truncate(limit);
        in_folder
    }

    /// Per-folder file counts and byte totals.
    pub fn folder_stats(&self) -> BTreeMap<String, FolderStats> {
        let mut stats: BTreeMap<String, FolderStats> = BTreeMap::new();
        for submission in &self.submissions {
            let entry = stats.entry(submission.folder.clone()).or_default();
            entry.file_count += 1;
            entry.total_size += submission.file_size;
        }
        stats
    }

    /// Dashboard figures; projects live in local state, so their count is passed in.
    pub fn analytics(&self, active_projects: usize) -> Analytics {
        let collaborators: BTreeSet<&str> = self
            .submissions
            .iter()
            .map(|submission| submission.uploaded_by.as_str())
            .collect();
        let file_types: BTreeSet<&str> = self
            .submissions
            .iter()
            .map(|submission| submission.file_type.as_str())
            .collect();
        Analytics {
            total_files: self.submissions.len(),
            total_lines: self.submissions.iter().map(Submission::line_count).sum(),
            storage_bytes: self.submissions.iter().map(|s| s.file_size).sum(),
            collaborators: collaborators.len(),
            file_types: file_types.len(),
            active_projects,
        }
    }

    /// Refile submissions whose folder is not in `known` under `general`.
    ///
    /// Only the cached view changes; [`Self::stored_folder`] still reports
    /// the endpoint's folder.
    ///
    /// # Returns
    /// How many submissions were refiled.
    pub fn reassign_orphans(&mut self, known: &HashSet<&str>) -> usize {
        let mut moved = 0;
        for submission in &mut self.submissions {
            if submission.folder != GENERAL_FOLDER_ID && !known.contains(submission.folder.as_str())
            {
                let original =
                    std::mem::replace(&mut submission.folder, GENERAL_FOLDER_ID.to_string());
                self.refiled
                    .entry(submission.submission_id.clone())
                    .or_insert(original);
                moved += 1;
            }
        }
        moved
    }
}

#[cfg(test)]
mod tests;
