//! Action handlers for the single endpoint route.
//!
//! GET query strings and POST form bodies carry the same flat fields and are
//! dispatched the same way on their `action` parameter.

/// Folder actions.
pub mod folder;
/// Submission actions.
pub mod submission;
/// User registration.
pub mod user;

use crate::{error::HttpError, AppState};
use axum::{
    extract::{Query, State},
    response::Response,
    Form,
};
use codehub_core::backend::{protocol::FormParams, Action};
use std::collections::HashMap;

/// `GET /?action=...`
pub async fn query_action(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, HttpError> {
    dispatch(&state, FormParams::from(params)).await
}

/// `POST /` with a form-encoded body.
pub async fn form_action(
    State(state): State<AppState>,
    Form(params): Form<HashMap<String, String>>,
) -> Result<Response, HttpError> {
    dispatch(&state, FormParams::from(params)).await
}

async fn dispatch(state: &AppState, params: FormParams) -> Result<Response, HttpError> {
    let action = params.action()?;
    tracing::debug!(%action, "dispatching action");
    match action {
        Action::RegisterUser => user::register_user(state, &params).await,
        Action::SubmitCode => submission::submit_code(state, &params).await,
        Action::UpdateFile => submission::update_file(state, &params).await,
        Action::GetSubmissions => submission::get_submissions(state).await,
        Action::DeleteFile => submission::delete_file(state, &params).await,
        Action::GetFolders => folder::get_folders(state).await,
        Action::CreateFolder => folder::create_folder(state, &params).await,
        Action::DeleteFolder => folder::delete_folder(state, &params).await,
    }
}
