//! Remote persistence for attendance records.
//!
//! The connection to the remote table is created lazily. Concurrent callers of
//! [`RemotePersistenceClient::ensure_ready`] share one in-flight initialization; a
//! failed attempt is not remembered, so the next call starts a fresh one.

pub mod postgrest;
pub mod schema;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use moka::future::Cache;
use serde::Serialize;
use strum_macros::{AsRefStr, Display};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::error::RemoteError;
use crate::model::attendance::{AttendanceRecord, AttendanceType};
use crate::model::statistics::RemoteTotals;

pub use postgrest::PostgrestConnector;
pub use schema::{NewRemoteRow, RemoteRow};

const HANDLE_KEY: &str = "attendance_records";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InitState {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

/// Builds a live handle to the remote table (credentials, HTTP client, probe).
#[async_trait]
pub trait RemoteConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn RemoteTable>, RemoteError>;
}

/// Operations used against the `attendance_records` table.
#[async_trait]
pub trait RemoteTable: Send + Sync {
    /// Insert one row and return the stored representation.
    async fn insert(&self, row: &NewRemoteRow) -> Result<Vec<RemoteRow>, RemoteError>;

    /// Rows for `date`, newest `submitted_at` first.
    async fn select_by_date(&self, date: &str) -> Result<Vec<RemoteRow>, RemoteError>;

    /// Count rows matching all `(column, value)` equality filters.
    async fn count(&self, filters: &[(&str, &str)]) -> Result<u64, RemoteError>;
}

pub struct RemotePersistenceClient {
    connector: Arc<dyn RemoteConnector>,
    handle: Cache<&'static str, Arc<dyn RemoteTable>>,
    state: Arc<Mutex<InitState>>,
}

impl RemotePersistenceClient {
    pub fn new(connector: Arc<dyn RemoteConnector>) -> Self {
        Self {
            connector,
            handle: Cache::builder().build(),
            state: Arc::new(Mutex::new(InitState::Uninitialized)),
        }
    }

    pub fn state(&self) -> InitState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns the ready handle, initializing it first if needed.
    pub async fn ensure_ready(&self) -> Result<Arc<dyn RemoteTable>, RemoteError> {
        let connector = self.connector.clone();
        let state = self.state.clone();

        self.handle
            .try_get_with(HANDLE_KEY, async move {
                let mut guard = InitGuard {
                    state: state.clone(),
                    finished: false,
                };
                set_state(&state, InitState::Initializing);
                info!("Initializing remote client");

                let result = connector.connect().await;
                guard.finished = true;
                match &result {
                    Ok(_) => {
                        set_state(&state, InitState::Ready);
                        info!("Remote client ready");
                    }
                    Err(e) => {
                        set_state(&state, InitState::Failed);
                        warn!(error = %e, "Remote client initialization failed");
                    }
                }
                result
            })
            .await
            .map_err(|e| e.as_ref().clone())
    }

    /// Inserts `record` and returns the server-assigned id.
    pub async fn insert(&self, record: &AttendanceRecord) -> Result<String, RemoteError> {
        let table = self.ensure_ready().await?;
        let rows = table.insert(&NewRemoteRow::from(record)).await?;

        rows.first()
            .map(RemoteRow::remote_id)
            .ok_or_else(|| RemoteError::InsertFailed {
                message: "insert succeeded but returned no row".to_string(),
                code: None,
            })
    }

    /// Records for `date`, newest submission first. Rows that cannot be mapped are
    /// skipped.
    pub async fn query_by_date(&self, date: &str) -> Result<Vec<AttendanceRecord>, RemoteError> {
        let table = self
            .ensure_ready()
            .await
            .map_err(|e| RemoteError::QueryFailed(e.to_string()))?;
        let rows = table.select_by_date(date).await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| match AttendanceRecord::try_from(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(error = %e, date, "Skipping malformed remote row");
                    None
                }
            })
            .collect())
    }

    /// Table-wide totals plus the count for `today`.
    pub async fn totals(&self, today: &str) -> Result<RemoteTotals, RemoteError> {
        let table = self
            .ensure_ready()
            .await
            .map_err(|e| RemoteError::QueryFailed(e.to_string()))?;

        let checkin = AttendanceType::Checkin.to_string();
        let checkout = AttendanceType::Checkout.to_string();
        let by_checkin = [("attendance_type", checkin.as_str())];
        let by_checkout = [("attendance_type", checkout.as_str())];
        let by_date = [("attendance_date", today)];

        let (total, checkins, checkouts, today) = futures::try_join!(
            table.count(&[]),
            table.count(&by_checkin),
            table.count(&by_checkout),
            table.count(&by_date),
        )?;

        Ok(RemoteTotals {
            total,
            checkins,
            checkouts,
            today,
        })
    }
}

fn set_state(state: &Mutex<InitState>, next: InitState) {
    *state.lock().unwrap_or_else(|e| e.into_inner()) = next;
}

/// Resets the state when an initialization is dropped before `connect` returns
/// (every waiting caller went away).
struct InitGuard {
    state: Arc<Mutex<InitState>>,
    finished: bool,
}

impl Drop for InitGuard {
    fn drop(&mut self) {
        if !self.finished {
            set_state(&self.state, InitState::Uninitialized);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct EmptyTable;

    #[async_trait]
    impl RemoteTable for EmptyTable {
        async fn insert(&self, _row: &NewRemoteRow) -> Result<Vec<RemoteRow>, RemoteError> {
            Ok(Vec::new())
        }

        async fn select_by_date(&self, _date: &str) -> Result<Vec<RemoteRow>, RemoteError> {
            Ok(Vec::new())
        }

        async fn count(&self, filters: &[(&str, &str)]) -> Result<u64, RemoteError> {
            Ok(filters.len() as u64)
        }
    }

    /// Fails the first `failures` attempts, then succeeds.
    struct SlowConnector {
        attempts: AtomicUsize,
        failures: usize,
    }

    #[async_trait]
    impl RemoteConnector for SlowConnector {
        async fn connect(&self) -> Result<Arc<dyn RemoteTable>, RemoteError> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            if attempt < self.failures {
                Err(RemoteError::NotReady("endpoint unreachable".into()))
            } else {
                Ok(Arc::new(EmptyTable))
            }
        }
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_initialization() {
        let connector = Arc::new(SlowConnector {
            attempts: AtomicUsize::new(0),
            failures: 0,
        });
        let client = RemotePersistenceClient::new(connector.clone());
        assert_eq!(client.state(), InitState::Uninitialized);

        let results = futures::future::join_all((0..8).map(|_| client.ensure_ready())).await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(connector.attempts.load(Ordering::SeqCst), 1);
        assert_eq!(client.state(), InitState::Ready);

        client.ensure_ready().await.unwrap();
        assert_eq!(connector.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_callers_share_a_failure_and_later_retry() {
        let connector = Arc::new(SlowConnector {
            attempts: AtomicUsize::new(0),
            failures: 1,
        });
        let client = RemotePersistenceClient::new(connector.clone());

        let results = futures::future::join_all((0..4).map(|_| client.ensure_ready())).await;
        assert!(results.iter().all(|r| matches!(r, Err(RemoteError::NotReady(_)))));
        assert_eq!(connector.attempts.load(Ordering::SeqCst), 1);
        assert_eq!(client.state(), InitState::Failed);

        client.ensure_ready().await.unwrap();
        assert_eq!(connector.attempts.load(Ordering::SeqCst), 2);
        assert_eq!(client.state(), InitState::Ready);
    }

    /// Never finishes connecting.
    struct HangingConnector {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl RemoteConnector for HangingConnector {
        async fn connect(&self) -> Result<Arc<dyn RemoteTable>, RemoteError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn abandoned_initialization_resets_state() {
        let connector = Arc::new(HangingConnector {
            attempts: AtomicUsize::new(0),
        });
        let client = RemotePersistenceClient::new(connector.clone());

        let waited = tokio::time::timeout(Duration::from_millis(50), client.ensure_ready()).await;
        assert!(waited.is_err());
        assert_eq!(connector.attempts.load(Ordering::SeqCst), 1);
        assert_eq!(client.state(), InitState::Uninitialized);

        // a later caller starts over
        let waited = tokio::time::timeout(Duration::from_millis(50), client.ensure_ready()).await;
        assert!(waited.is_err());
        assert_eq!(connector.attempts.load(Ordering::SeqCst), 2);
        assert_eq!(client.state(), InitState::Uninitialized);
    }

    #[tokio::test]
    async fn empty_insert_response_is_an_insert_failure() {
        let client = RemotePersistenceClient::new(Arc::new(SlowConnector {
            attempts: AtomicUsize::new(0),
            failures: 0,
        }));
        let record: AttendanceRecord = serde_json::from_value(serde_json::json!({
            "id": "a",
            "employeeName": "Wang Lei",
            "department": "IT",
            "attendanceDate": "2026-01-05",
            "attendanceTime": "08:15",
            "attendanceType": "checkin",
            "location": "office",
            "submittedAt": "2026-01-05T08:15:00Z"
        }))
        .unwrap();

        let err = client.insert(&record).await.unwrap_err();
        assert!(matches!(err, RemoteError::InsertFailed { code: None, .. }));
    }

    #[tokio::test]
    async fn totals_issue_four_counts() {
        let client = RemotePersistenceClient::new(Arc::new(SlowConnector {
            attempts: AtomicUsize::new(0),
            failures: 0,
        }));
        let totals = client.totals("2026-01-05").await.unwrap();
        assert_eq!(
            totals,
            RemoteTotals {
                total: 0,
                checkins: 1,
                checkouts: 1,
                today: 1
            }
        );
    }
}
