//! Progress update errors.

use dojo_storage::StorageError;
use serde::Serialize;

/// Result type for progress operations.
pub type Result<T> = std::result::Result<T, ProgressError>;

/// Errors surfaced by progress operations.
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    /// A required field is missing or malformed
    #[error("Invalid request: {0}")]
    InvalidInput(String),

    /// Unknown requirement or user
    #[error("Not found: {0}")]
    NotFound(String),

    /// The user changed concurrently and retries were exhausted
    #[error("Conflicting update: {0}")]
    Conflict(#[source] StorageError),

    /// Store lookup or commit failure
    #[error("Storage error: {0}")]
    Storage(#[source] StorageError),
}

impl ProgressError {
    /// HTTP-style status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Storage(_) => 500,
        }
    }

    /// Structured failure body.
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            status_code: self.status_code(),
            message: self.to_string(),
        }
    }
}

impl From<StorageError> for ProgressError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => Self::NotFound(what),
            err @ StorageError::Conflict { .. } => Self::Conflict(err),
            err => Self::Storage(err),
        }
    }
}

/// Failure body returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// HTTP-style status code
    pub status_code: u16,

    /// Human-readable message
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_status_codes() {
        assert_eq!(ProgressError::InvalidInput("cohort is required".into()).status_code(), 400);
        assert_eq!(ProgressError::from(StorageError::NotFound("user x".into())).status_code(), 404);
        assert_eq!(
            ProgressError::from(StorageError::Conflict { expected: 1, found: 2 }).status_code(),
            409
        );
        assert_eq!(ProgressError::from(StorageError::Other("disk full".into())).status_code(), 500);
    }

    #[test]
    fn test_storage_cause_is_preserved() {
        let err = ProgressError::from(StorageError::Other("disk full".into()));
        let source = err.source().expect("source");
        assert_eq!(source.to_string(), "disk full");
    }

    #[test]
    fn test_response_body() {
        let response = ProgressError::InvalidInput("cohort is required".into()).to_response();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["statusCode"], 400);
        assert_eq!(json["message"], "Invalid request: cohort is required");
    }
}
