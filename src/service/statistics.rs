use std::sync::Arc;

use tracing::{debug, warn};

use crate::model::attendance::AttendanceRecord;
use crate::model::statistics::{DailyStatistics, DataSource};
use crate::remote::RemotePersistenceClient;
use crate::store::LocalRecordStore;
use crate::utils::time::sort_key;

/// Daily counts and listing, remote first with the local store as fallback.
pub struct StatisticsService {
    store: Arc<LocalRecordStore>,
    remote: Arc<RemotePersistenceClient>,
}

impl StatisticsService {
    pub fn new(store: Arc<LocalRecordStore>, remote: Arc<RemotePersistenceClient>) -> Self {
        Self { store, remote }
    }

    /// Never fails; a day without data yields zero counts.
    pub async fn daily_summary(&self, date: &str) -> DailyStatistics {
        let (records, source) = match self.remote.query_by_date(date).await {
            Ok(records) => (records, DataSource::Remote),
            Err(e) => {
                warn!(error = %e, date, "Remote summary unavailable, using local records");
                (self.store.query_by_date(date).await, DataSource::Local)
            }
        };

        let summary = summarize(date, records, source);
        debug!(
            date,
            source = %summary.source,
            checkins = summary.checkin_count,
            checkouts = summary.checkout_count,
            "Daily summary computed"
        );
        summary
    }
}

/// Counts by type and orders newest first. The sort is stable, so records with equal
/// timestamps keep the order the source returned them in.
pub fn summarize(date: &str, mut records: Vec<AttendanceRecord>, source: DataSource) -> DailyStatistics {
    records.sort_by(|a, b| {
        sort_key(&b.attendance_date, &b.attendance_time)
            .cmp(&sort_key(&a.attendance_date, &a.attendance_time))
    });

    DailyStatistics {
        date: date.to_string(),
        source,
        checkin_count: records.iter().filter(|r| r.is_checkin()).count(),
        checkout_count: records.iter().filter(|r| r.is_checkout()).count(),
        records,
    }
}
