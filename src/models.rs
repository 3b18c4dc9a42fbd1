use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::attendance::AttendanceRecord;

/// A single failing form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    #[schema(example = "employeeName")]
    pub field: String,
    #[schema(example = "must be at least 2 characters")]
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Outcome of a successful submission.
///
/// Either `remote_id` (record stored remotely) or `fallback_reason` (stored only
/// locally) is set, never neither.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub remote: bool,
    /// Client-generated record id.
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    pub record: AttendanceRecord,
}

impl SubmissionResult {
    pub fn stored_remotely(record: AttendanceRecord, remote_id: String) -> Self {
        Self {
            remote: true,
            id: record.id.clone(),
            remote_id: Some(remote_id),
            fallback_reason: None,
            record,
        }
    }

    pub fn stored_locally(record: AttendanceRecord, reason: String) -> Self {
        Self {
            remote: false,
            id: record.id.clone(),
            remote_id: None,
            fallback_reason: Some(reason),
            record,
        }
    }
}

/// Index entry for a per-record JSON backup kept in the local store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackupEntry {
    pub id: String,
    #[schema(example = "attendance_Wang Lei_2026-01-05_0815.json")]
    pub file_name: String,
    pub timestamp: String,
    pub employee_name: String,
    pub attendance_date: String,
}
