use crate::separator::SeparatorError;
use crate::types::JobId;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Multipart form contained no usable `audioFile` field
    #[error("no file provided")]
    MissingUpload,

    /// Invalid request data (malformed multipart stream, bad field values)
    #[error("{message}")]
    BadRequest { message: String },

    /// Upload exceeded the configured size limit
    #[error("{message}")]
    PayloadTooLarge { message: String },

    /// Requested resource not found
    #[error("{resource} {id} not found")]
    NotFound { resource: String, id: String },

    /// Filesystem operation failed (store, rename, mkdir)
    #[error("failed to {operation}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// The external separation process failed to spawn or exited non-zero
    #[error(transparent)]
    Separation(#[from] SeparatorError),

    /// The process exited successfully but produced neither expected stem
    #[error("separation produced no output files for job {job}")]
    NoStems { job: JobId },

    /// Generic internal service error
    #[error("failed to {operation}")]
    Internal { operation: String },

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Wrap a filesystem error with the operation that was being attempted.
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            operation: operation.into(),
            source,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingUpload | Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Io { .. }
            | Error::Separation(_)
            | Error::NoStems { .. }
            | Error::Internal { .. }
            | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::MissingUpload => "No file uploaded.".to_string(),
            Error::BadRequest { message } => message.clone(),
            Error::PayloadTooLarge { message } => message.clone(),
            Error::NotFound { resource, id } => format!("{resource} {id} not found."),
            Error::Io { operation, .. } => format!("Failed to {operation}."),
            Error::Separation(_) => "Error processing audio file.".to_string(),
            Error::NoStems { .. } => "Processed files not found.".to_string(),
            Error::Internal { .. } | Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details server-side - different log levels based on severity
        match &self {
            Error::Io { .. } | Error::Separation(_) | Error::NoStems { .. } | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Request failed: {:#}", self);
            }
            Error::PayloadTooLarge { .. } => {
                tracing::warn!("Oversized upload rejected: {}", self);
            }
            Error::MissingUpload | Error::BadRequest { .. } | Error::NotFound { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        (self.status_code(), self.user_message()).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_error_classes() {
        assert_eq!(Error::MissingUpload.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::NotFound {
                resource: "Stem".into(),
                id: "vocals.wav".into()
            }
            .status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::io("rename uploaded file", std::io::Error::other("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::NoStems { job: uuid::Uuid::new_v4() }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn user_messages_do_not_leak_sources() {
        let err = Error::io("rename uploaded file", std::io::Error::other("/secret/path denied"));
        assert_eq!(err.user_message(), "Failed to rename uploaded file.");
        assert!(!err.user_message().contains("/secret/path"));
    }

    #[test]
    fn missing_upload_matches_client_wording() {
        assert_eq!(Error::MissingUpload.user_message(), "No file uploaded.");
    }
}
