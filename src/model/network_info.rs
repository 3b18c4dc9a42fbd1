use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Sentinel used in place of absent network metadata.
pub const UNKNOWN: &str = "unknown";

/// Best-effort metadata about the submitting client.
///
/// Every field is always populated; consumers compare against [`UNKNOWN`]
/// instead of checking for absence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct NetworkInfo {
    #[schema(example = "203.0.113.7")]
    pub ip: String,
    #[schema(example = "Taiwan")]
    pub country: String,
    #[schema(example = "Chiayi")]
    pub city: String,
    #[schema(example = "Chiayi County")]
    pub region: String,
    #[schema(example = "HiNet")]
    pub isp: String,
    #[schema(example = "Asia/Taipei")]
    pub timezone: String,
    /// Which resolution method produced this value.
    #[schema(example = "ipapi.co")]
    pub source: String,
    pub timestamp: String,
}

impl Default for NetworkInfo {
    fn default() -> Self {
        Self::unknown()
    }
}

impl NetworkInfo {
    pub fn unknown() -> Self {
        Self {
            ip: UNKNOWN.to_string(),
            country: UNKNOWN.to_string(),
            city: UNKNOWN.to_string(),
            region: UNKNOWN.to_string(),
            isp: UNKNOWN.to_string(),
            timezone: UNKNOWN.to_string(),
            source: UNKNOWN.to_string(),
            timestamp: UNKNOWN.to_string(),
        }
    }

    /// All-sentinel value tagged with `source` and stamped with the current time.
    pub fn from_source(source: &str) -> Self {
        Self {
            source: source.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            ..Self::unknown()
        }
    }

    /// True when the value carries an address a caller can use.
    pub fn has_ip(&self) -> bool {
        is_known(&self.ip)
    }
}

pub fn is_known(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != UNKNOWN
}

/// Maps an optional, possibly blank string onto the sentinel.
pub fn or_unknown(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_deserialize_to_sentinel() {
        let info: NetworkInfo = serde_json::from_str(r#"{"ip":"1.2.3.4"}"#).unwrap();
        assert_eq!(info.ip, "1.2.3.4");
        assert_eq!(info.city, UNKNOWN);
        assert_eq!(info.source, UNKNOWN);
        assert!(info.has_ip());
    }

    #[test]
    fn blank_values_become_unknown() {
        assert_eq!(or_unknown(Some("  ")), UNKNOWN);
        assert_eq!(or_unknown(None), UNKNOWN);
        assert_eq!(or_unknown(Some("Taipei")), "Taipei");
        assert!(!NetworkInfo::from_source("x").has_ip());
    }
}
