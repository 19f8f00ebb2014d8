//! Folder handlers.

use crate::{error::HttpError, AppState};
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use codehub_core::{
    backend::protocol::{parse_create_folder, Envelope, FoldersPayload, FormParams, Receipt},
    Backend,
};

/// List folders with live file counts and sizes.
///
/// # Errors
/// Returns an error if the backend read fails.
pub async fn get_folders(state: &AppState) -> Result<Response, HttpError> {
    let folders = state.backend.list_folders().await?;
    Ok(Json(Envelope::ok(FoldersPayload { folders })).into_response())
}

/// Create a folder.
///
/// # Returns
/// A receipt carrying the new `folderId`.
///
/// # Errors
/// Returns an error if `folderName` is missing.
pub async fn create_folder(state: &AppState, params: &FormParams) -> Result<Response, HttpError> {
    let request = parse_create_folder(params)?;
    let folder_id = state.backend.create_folder(&request).await?;
    tracing::info!(
        folder = %request.folder_name,
        privacy = %request.privacy,
        "created folder"
    );
    Ok(Json(Envelope::ok(Receipt {
        submission_id: None,
        folder_id,
    }))
    .into_response())
}

/// Delete a folder and move its submissions to `general`.
///
/// # Errors
/// Returns an error for `general`, unknown ids, or a missing `folderId`.
pub async fn delete_folder(state: &AppState, params: &FormParams) -> Result<Response, HttpError> {
    let folder_id = params.required("folderId")?;
    state.backend.delete_folder(folder_id).await?;
    Ok(Json(Envelope::ok(Receipt::default())).into_response())
}
