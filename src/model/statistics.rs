use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};
use utoipa::ToSchema;

use crate::model::attendance::AttendanceRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DataSource {
    Remote,
    Local,
}

/// Derived per-day view; recomputed on demand, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyStatistics {
    #[schema(example = "2026-01-05", format = "date")]
    pub date: String,
    pub source: DataSource,
    #[schema(example = 12)]
    pub checkin_count: usize,
    #[schema(example = 3)]
    pub checkout_count: usize,
    /// Newest first.
    pub records: Vec<AttendanceRecord>,
}

/// Table-wide counts gathered with count-only remote queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RemoteTotals {
    #[schema(example = 240)]
    pub total: u64,
    #[schema(example = 130)]
    pub checkins: u64,
    #[schema(example = 110)]
    pub checkouts: u64,
    #[schema(example = 15)]
    pub today: u64,
}
