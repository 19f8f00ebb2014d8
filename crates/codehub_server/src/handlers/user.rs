//! `REGISTER_USER` handler.

use crate::{error::HttpError, AppState};
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use codehub_core::{
    backend::protocol::{Envelope, FormParams, Receipt},
    Backend,
};

/// Record a user, stamped with the client's timestamp when one is sent.
///
/// # Errors
/// Returns an error when the name is blank or the timestamp is malformed.
pub async fn register_user(state: &AppState, params: &FormParams) -> Result<Response, HttpError> {
    let user_name = params.get("userName").unwrap_or_default();
    let timestamp = params.timestamp("timestamp")?.unwrap_or_else(Utc::now);
    state.backend.register_user(user_name, timestamp).await?;
    tracing::info!(user = user_name.trim(), "registered user");
    Ok(Json(Envelope::ok(Receipt::default())).into_response())
}
