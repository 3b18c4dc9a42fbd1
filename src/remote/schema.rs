use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::attendance::{AttendanceRecord, AttendanceType};
use crate::model::network_info::{NetworkInfo, UNKNOWN, or_unknown};
use crate::utils::time::{normalize_time, to_minutes};

pub const SOURCE_REMOTE: &str = "remote";

/// Row body for `attendance_records` inserts. `id` and `submitted_at` are assigned
/// by the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRemoteRow {
    pub employee_name: String,
    pub department: String,
    pub attendance_date: String,
    pub attendance_time: String,
    pub attendance_type: String,
    pub location: String,
    pub custom_location: String,
    pub notes: String,
    pub ip_address: String,
    pub ip_country: String,
    pub ip_city: String,
    pub ip_isp: String,
    pub user_agent: String,
}

impl From<&AttendanceRecord> for NewRemoteRow {
    fn from(record: &AttendanceRecord) -> Self {
        let net = &record.network_info;
        Self {
            employee_name: record.employee_name.clone(),
            department: record.department.clone(),
            attendance_date: record.attendance_date.clone(),
            attendance_time: normalize_time(&record.attendance_time),
            attendance_type: record.attendance_type.to_string(),
            location: record.location.clone(),
            custom_location: record.custom_location.clone(),
            notes: record.notes.clone(),
            ip_address: or_unknown(Some(&net.ip)),
            ip_country: or_unknown(Some(&net.country)),
            ip_city: or_unknown(Some(&net.city)),
            ip_isp: or_unknown(Some(&net.isp)),
            user_agent: or_unknown(Some(&record.user_agent)),
        }
    }
}

/// Row as returned by the remote table.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteRow {
    pub id: Value,
    pub employee_name: String,
    pub department: String,
    pub attendance_date: String,
    pub attendance_time: String,
    pub attendance_type: String,
    pub location: String,
    #[serde(default)]
    pub custom_location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub ip_country: Option<String>,
    #[serde(default)]
    pub ip_city: Option<String>,
    #[serde(default)]
    pub ip_isp: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<String>,
}

impl RemoteRow {
    /// Server ids may be numeric or uuid strings.
    pub fn remote_id(&self) -> String {
        match &self.id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl TryFrom<RemoteRow> for AttendanceRecord {
    type Error = String;

    fn try_from(row: RemoteRow) -> Result<Self, Self::Error> {
        let attendance_type = AttendanceType::from_str(&row.attendance_type)
            .map_err(|_| format!("unknown attendance type '{}'", row.attendance_type))?;
        let id = row.remote_id();

        Ok(AttendanceRecord {
            id,
            employee_name: row.employee_name,
            department: row.department,
            attendance_date: row.attendance_date,
            attendance_time: to_minutes(&row.attendance_time),
            attendance_type,
            location: row.location,
            custom_location: row.custom_location.unwrap_or_default(),
            notes: row.notes.unwrap_or_default(),
            submitted_at: row.submitted_at.unwrap_or_else(|| UNKNOWN.to_string()),
            user_agent: or_unknown(row.user_agent.as_deref()),
            network_info: NetworkInfo {
                ip: or_unknown(row.ip_address.as_deref()),
                country: or_unknown(row.ip_country.as_deref()),
                city: or_unknown(row.ip_city.as_deref()),
                isp: or_unknown(row.ip_isp.as_deref()),
                source: SOURCE_REMOTE.to_string(),
                ..NetworkInfo::unknown()
            },
        })
    }
}
