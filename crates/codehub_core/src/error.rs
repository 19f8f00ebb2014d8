//! Application error types for the CodeHub client and endpoint.
use thiserror::Error;

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// The endpoint answered with `success: false`.
    #[error("{0}")]
    Remote(String),

    /// The endpoint could not be reached or answered with a non-2xx status.
    #[error("{0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Client-side permission check failed; nothing was sent.
    #[error("{0}")]
    PermissionDenied(String),
}

impl AppError {
    /// Whether the endpoint was contacted and reported or caused the failure.
    ///
    /// # Returns
    /// `true` for [`AppError::Remote`] and [`AppError::Transport`]; local
    /// validation, permission, and state-file errors return `false`.
    pub fn is_endpoint_failure(&self) -> bool {
        matches!(self, Self::Remote(_) | Self::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_remote_and_transport_errors_blame_the_endpoint() {
        assert!(AppError::Remote("Sheet locked".to_string()).is_endpoint_failure());
        assert!(AppError::Transport("HTTP 502".to_string()).is_endpoint_failure());
        assert!(!AppError::NotFound.is_endpoint_failure());
        assert!(!AppError::BadRequest("No files selected".to_string()).is_endpoint_failure());
        assert!(!AppError::PermissionDenied("nope".to_string()).is_endpoint_failure());
        assert!(!AppError::Io(std::io::Error::other("disk")).is_endpoint_failure());
    }
}
