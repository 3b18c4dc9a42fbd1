use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::model::network_info::{NetworkInfo, UNKNOWN};

/// Location code that requires a free-text `customLocation`.
pub const LOCATION_OTHER: &str = "other";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceType {
    Checkin,
    Checkout,
}

/// Raw form input as submitted by the client. Every field is optional on the wire so
/// validation can report all missing fields at once instead of failing on the first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
#[schema(example = json!({
    "employeeName": "Wang Lei",
    "department": "IT",
    "attendanceDate": "2026-01-05",
    "attendanceTime": "08:15",
    "attendanceType": "checkin",
    "location": "office",
    "customLocation": "",
    "notes": ""
}))]
pub struct AttendanceInput {
    pub employee_name: Option<String>,
    pub department: Option<String>,
    pub attendance_date: Option<String>,
    pub attendance_time: Option<String>,
    pub attendance_type: Option<String>,
    pub location: Option<String>,
    pub custom_location: Option<String>,
    pub notes: Option<String>,
}

/// One submitted check-in or check-out event. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    #[schema(example = "5f0c7d0e-8f7b-4a53-9a4e-0d9d6d1f3b1a")]
    pub id: String,

    #[schema(example = "Wang Lei")]
    pub employee_name: String,

    #[schema(example = "IT")]
    pub department: String,

    #[schema(example = "2026-01-05", format = "date")]
    pub attendance_date: String,

    /// `HH:MM` wall-clock time.
    #[schema(example = "08:15")]
    pub attendance_time: String,

    pub attendance_type: AttendanceType,

    #[schema(example = "office")]
    pub location: String,

    #[serde(default)]
    pub custom_location: String,

    #[serde(default)]
    pub notes: String,

    /// `unknown` on records written before the field existed.
    #[schema(example = "2026-01-05T08:15:02.123+08:00")]
    #[serde(default = "unknown_value")]
    pub submitted_at: String,

    #[serde(default = "unknown_value")]
    pub user_agent: String,

    #[serde(default = "NetworkInfo::unknown")]
    pub network_info: NetworkInfo,
}

fn unknown_value() -> String {
    UNKNOWN.to_string()
}

impl AttendanceRecord {
    pub fn is_checkin(&self) -> bool {
        self.attendance_type == AttendanceType::Checkin
    }

    pub fn is_checkout(&self) -> bool {
        self.attendance_type == AttendanceType::Checkout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn attendance_type_uses_lowercase_codes() {
        assert_eq!(AttendanceType::Checkin.to_string(), "checkin");
        assert_eq!(AttendanceType::Checkout.as_ref(), "checkout");
        assert_eq!(AttendanceType::from_str("checkin").unwrap(), AttendanceType::Checkin);
        assert!(AttendanceType::from_str("lunch").is_err());
    }

    #[test]
    fn record_deserializes_without_optional_fields() {
        let raw = serde_json::json!({
            "id": "a1",
            "employeeName": "Wang Lei",
            "department": "IT",
            "attendanceDate": "2026-01-05",
            "attendanceTime": "08:15",
            "attendanceType": "checkout",
            "location": "office",
            "submittedAt": "2026-01-05T08:15:00Z"
        });

        let record: AttendanceRecord = serde_json::from_value(raw).unwrap();
        assert!(record.is_checkout());
        assert_eq!(record.custom_location, "");
        assert_eq!(record.user_agent, UNKNOWN);
        assert_eq!(record.network_info, NetworkInfo::unknown());
    }
}
