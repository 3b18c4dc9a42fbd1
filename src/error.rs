//! Error taxonomy for the submission pipeline.
//!
//! Only [`SubmitError`] ever reaches an HTTP caller. Store and remote errors are
//! absorbed by the services and turned into fallback behaviour.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::models::FieldError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("local storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("failed to serialize local data: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::StorageUnavailable(e.to_string())
    }
}

#[derive(Error, Debug, Clone)]
pub enum RemoteError {
    #[error("remote client not ready: {0}")]
    NotReady(String),

    #[error("remote insert failed: {message} (code: {})", code.as_deref().unwrap_or("none"))]
    InsertFailed {
        message: String,
        code: Option<String>,
    },

    #[error("remote query failed: {0}")]
    QueryFailed(String),
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("validation failed for {} field(s)", field_errors.len())]
    ValidationFailed { field_errors: Vec<FieldError> },

    #[error("submission failed: remote ({remote}); local ({local})")]
    SubmissionFailed { remote: String, local: String },
}

impl ResponseError for SubmitError {
    fn status_code(&self) -> StatusCode {
        match self {
            SubmitError::ValidationFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            SubmitError::SubmissionFailed { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            SubmitError::ValidationFailed { field_errors } => {
                HttpResponse::UnprocessableEntity().json(json!({
                    "error": "Please correct the highlighted fields",
                    "fieldErrors": field_errors
                }))
            }
            // internals stay in the logs
            SubmitError::SubmissionFailed { .. } => HttpResponse::ServiceUnavailable().json(json!({
                "error": "Submission failed, please try again later"
            })),
        }
    }
}
