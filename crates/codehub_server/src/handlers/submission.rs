//! Submission handlers.

use crate::{error::HttpError, AppState};
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use codehub_core::{
    backend::protocol::{parse_submit, parse_update, Envelope, FormParams, Receipt, SubmissionsPayload},
    Backend,
};

/// List every stored submission.
///
/// # Errors
/// Returns an error if the backend read fails.
pub async fn get_submissions(state: &AppState) -> Result<Response, HttpError> {
    let submissions = state.backend.list_submissions().await?;
    Ok(Json(Envelope::ok(SubmissionsPayload { submissions })).into_response())
}

/// Store a new submission.
///
/// # Returns
/// A receipt carrying the new `submissionId`.
///
/// # Errors
/// Returns an error if required fields are missing or malformed.
pub async fn submit_code(state: &AppState, params: &FormParams) -> Result<Response, HttpError> {
    let new = parse_submit(params)?;
    let submission_id = state.backend.create_submission(&new).await?;
    tracing::info!(
        file = %new.file_name,
        folder = %new.folder,
        size = new.file_size,
        "stored submission"
    );
    Ok(Json(Envelope::ok(Receipt {
        submission_id,
        folder_id: None,
    }))
    .into_response())
}

/// Overwrite an existing submission.
///
/// # Errors
/// Returns an error if the submission does not exist or fields are invalid.
pub async fn update_file(state: &AppState, params: &FormParams) -> Result<Response, HttpError> {
    let update = parse_update(params)?;
    state.backend.update_submission(&update).await?;
    tracing::info!(submission_id = %update.submission_id, "updated submission");
    Ok(Json(Envelope::ok(Receipt {
        submission_id: Some(update.submission_id),
        folder_id: None,
    }))
    .into_response())
}

/// Remove a submission by id.
///
/// # Errors
/// Returns an error if the id is missing or unknown.
pub async fn delete_file(state: &AppState, params: &FormParams) -> Result<Response, HttpError> {
    let submission_id = params.required("submissionId")?;
    state.backend.delete_submission(submission_id).await?;
    tracing::info!(submission_id, "deleted submission");
    Ok(Json(Envelope::ok(Receipt::default())).into_response())
}
