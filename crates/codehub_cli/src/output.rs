//! Text and JSON rendering for CLI output.

use codehub_core::{
    models::{ActivityEntry, ChatMessage, Folder, Project, Submission},
    state::StarredFiles,
    store::Analytics,
};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn size_label(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

pub(crate) fn format_submissions(
    submissions: &[&Submission],
    starred: &StarredFiles,
    json: bool,
) -> anyhow::Result<String> {
    if json {
        return to_json(submissions);
    }
    let rows: Vec<String> = submissions
        .iter()
        .map(|submission| {
            let star = if starred.contains(&submission.submission_id) {
                "*"
            } else {
                " "
            };
            format!(
                "{} {:<36} {:<28} {:<8} {:>9} {:<14} {}",
                star,
                submission.submission_id,
                submission.file_name,
                submission.file_type,
                size_label(submission.file_size),
                submission.uploaded_by,
                submission
                    .timestamp
                    .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string())
            )
        })
        .collect();
    Ok(rows.join("\n"))
}

/// Full content for plain output, the whole record for JSON.
pub(crate) fn format_submission(submission: &Submission, json: bool) -> anyhow::Result<String> {
    if json {
        return to_json(submission);
    }
    Ok(submission.code_content.clone())
}

pub(crate) fn format_folders(
    folders: &[&Folder],
    current_folder: &str,
    json: bool,
) -> anyhow::Result<String> {
    if json {
        return to_json(folders);
    }
    let rows: Vec<String> = folders
        .iter()
        .map(|folder| {
            let marker = if folder.id == current_folder { ">" } else { " " };
            format!(
                "{} {:<36} {:<24} {:<8} {:>4} files {:>10}",
                marker,
                folder.id,
                folder.name,
                folder.privacy.as_str(),
                folder.file_count,
                folder.size_label()
            )
        })
        .collect();
    Ok(rows.join("\n"))
}

pub(crate) fn format_projects(
    projects: &[Project],
    current_folder: &str,
    json: bool,
) -> anyhow::Result<String> {
    if json {
        return to_json(projects);
    }
    let rows: Vec<String> = projects
        .iter()
        .map(|project| {
            let marker = if project.id == current_folder { ">" } else { " " };
            format!(
                "{} {:<22} {:<24} {}",
                marker, project.id, project.name, project.description
            )
        })
        .collect();
    Ok(rows.join("\n"))
}

pub(crate) fn format_activity(entries: &[ActivityEntry], json: bool) -> anyhow::Result<String> {
    if json {
        return to_json(entries);
    }
    let rows: Vec<String> = entries
        .iter()
        .map(|entry| {
            format!(
                "{}  {:<14} {}",
                entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                entry.user,
                entry.action
            )
        })
        .collect();
    Ok(rows.join("\n"))
}

pub(crate) fn format_chat(messages: &[ChatMessage], json: bool) -> anyhow::Result<String> {
    if json {
        return to_json(messages);
    }
    let rows: Vec<String> = messages
        .iter()
        .map(|message| {
            format!(
                "[{}] {}: {}",
                message.timestamp.format("%H:%M"),
                message.sender,
                message.text
            )
        })
        .collect();
    Ok(rows.join("\n"))
}

pub(crate) fn format_analytics(analytics: &Analytics, json: bool) -> anyhow::Result<String> {
    if json {
        return to_json(analytics);
    }
    Ok([
        format!("Total files:     {}", analytics.total_files),
        format!("Lines of code:   {}", analytics.total_lines),
        format!("Storage used:    {:.2} MB", analytics.storage_mib()),
        format!("Collaborators:   {}", analytics.collaborators),
        format!("File types:      {}", analytics.file_types),
        format!("Active projects: {}", analytics.active_projects),
    ]
    .join("\n"))
}

/// Destination paths for exported files, one per submission.
///
/// Names are reduced to their final path component; a name already taken in
/// the batch is prefixed with the submission id.
pub(crate) fn export_paths(dir: &Path, submissions: &[Submission]) -> Vec<PathBuf> {
    let mut taken = HashSet::new();
    submissions
        .iter()
        .map(|submission| {
            let base = Path::new(&submission.file_name)
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| submission.submission_id.clone());
            let name = if taken.insert(base.clone()) {
                base
            } else {
                format!("{}-{}", submission.submission_id, base)
            };
            dir.join(name)
        })
        .collect()
}
