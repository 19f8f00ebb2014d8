//! Map handler errors onto `{success: false, error}` envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use codehub_core::{
    backend::protocol::{Envelope, Receipt},
    AppError,
};

/// Handler error rendered as a failure envelope.
///
/// Rejected requests answer `200 OK` with `success: false`, matching the
/// spreadsheet endpoint; only internal failures use a 5xx status.
#[derive(Debug)]
pub struct HttpError(pub AppError);

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl HttpError {
    fn status(&self) -> StatusCode {
        match self.0 {
            AppError::Io(_) | AppError::Serialization(_) | AppError::Transport(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::OK,
        }
    }

    fn message(&self) -> String {
        match &self.0 {
            AppError::BadRequest(message) => message.clone(),
            AppError::NotFound => "Not found".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::debug!(error = %message, "request rejected");
        }
        (status, Json(Envelope::<Receipt>::failure(message))).into_response()
    }
}
