#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use attendance_desk::db::init_db;
use attendance_desk::error::{RemoteError, StoreError};
use attendance_desk::model::attendance::AttendanceInput;
use attendance_desk::remote::{NewRemoteRow, RemoteConnector, RemoteRow, RemoteTable};
use attendance_desk::resolver::{
    Institution, LocalEnvironment, NetworkInfoResolver, OriginHint, RequestAddress,
    ResolutionStrategy,
};
use attendance_desk::store::{LocalRecordStore, SqliteStorage, Storage};
use chrono::NaiveDate;
use serde_json::Value;
use tempfile::TempDir;

pub const TODAY: &str = "2026-01-05";

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
}

pub fn database_url(dir: &TempDir) -> String {
    format!("sqlite://{}?mode=rwc", dir.path().join("attendance.db").display())
}

/// Store backed by a fresh SQLite file. Keep the `TempDir` alive for the test.
pub async fn sqlite_store() -> (Arc<LocalRecordStore>, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = open_store(&dir).await;
    (store, dir)
}

pub async fn open_store(dir: &TempDir) -> Arc<LocalRecordStore> {
    let pool = init_db(&database_url(dir)).await.expect("Failed to open sqlite");
    Arc::new(
        LocalRecordStore::open(Arc::new(SqliteStorage::new(pool)))
            .await
            .expect("Failed to open store"),
    )
}

/// Medium that refuses every write.
pub struct FailingStorage;

#[async_trait]
impl Storage for FailingStorage {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::StorageUnavailable("disk full".into()))
    }
}

pub async fn failing_store() -> Arc<LocalRecordStore> {
    Arc::new(
        LocalRecordStore::open(Arc::new(FailingStorage))
            .await
            .expect("Failed to open store"),
    )
}

/// In-memory stand-in for the remote table.
#[derive(Default)]
pub struct MemoryTable {
    rows: Mutex<Vec<RemoteRow>>,
    next_id: AtomicU64,
}

impl MemoryTable {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl RemoteTable for MemoryTable {
    async fn insert(&self, row: &NewRemoteRow) -> Result<Vec<RemoteRow>, RemoteError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let stored = RemoteRow {
            id: Value::from(id),
            employee_name: row.employee_name.clone(),
            department: row.department.clone(),
            attendance_date: row.attendance_date.clone(),
            attendance_time: row.attendance_time.clone(),
            attendance_type: row.attendance_type.clone(),
            location: row.location.clone(),
            custom_location: Some(row.custom_location.clone()),
            notes: Some(row.notes.clone()),
            ip_address: Some(row.ip_address.clone()),
            ip_country: Some(row.ip_country.clone()),
            ip_city: Some(row.ip_city.clone()),
            ip_isp: Some(row.ip_isp.clone()),
            user_agent: Some(row.user_agent.clone()),
            submitted_at: Some(format!("2026-01-05T00:00:{id:02}Z")),
        };
        self.rows.lock().unwrap().push(stored.clone());
        Ok(vec![stored])
    }

    async fn select_by_date(&self, date: &str) -> Result<Vec<RemoteRow>, RemoteError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|r| r.attendance_date == date)
            .cloned()
            .collect())
    }

    async fn count(&self, filters: &[(&str, &str)]) -> Result<u64, RemoteError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|r| {
                filters.iter().all(|(column, value)| match *column {
                    "attendance_type" => r.attendance_type == *value,
                    "attendance_date" => r.attendance_date == *value,
                    _ => false,
                })
            })
            .count() as u64)
    }
}

pub struct MemoryConnector(pub Arc<MemoryTable>);

#[async_trait]
impl RemoteConnector for MemoryConnector {
    async fn connect(&self) -> Result<Arc<dyn RemoteTable>, RemoteError> {
        Ok(self.0.clone())
    }
}

/// Remote endpoint that is never reachable.
pub struct DownConnector;

#[async_trait]
impl RemoteConnector for DownConnector {
    async fn connect(&self) -> Result<Arc<dyn RemoteTable>, RemoteError> {
        Err(RemoteError::NotReady("connection refused".into()))
    }
}

pub fn institution() -> Institution {
    Institution {
        domain: "ccu.edu.tw".into(),
        name: "National Chung Cheng University".into(),
        city: "Chiayi".into(),
        region: "Chiayi County".into(),
        country: "Taiwan".into(),
    }
}

/// Resolver with no network strategies; always lands on the local heuristic.
pub fn offline_resolver() -> Arc<NetworkInfoResolver> {
    Arc::new(NetworkInfoResolver::new(
        Vec::new(),
        LocalEnvironment::new(institution(), "Asia/Taipei"),
    ))
}

/// Origin hint plus the request address steps; no outbound lookups.
pub fn request_resolver() -> Arc<NetworkInfoResolver> {
    let strategies: Vec<Box<dyn ResolutionStrategy>> = vec![
        Box::new(OriginHint::new(institution())),
        Box::new(RequestAddress::non_public()),
        Box::new(RequestAddress::any()),
    ];
    Arc::new(NetworkInfoResolver::new(
        strategies,
        LocalEnvironment::new(institution(), "Asia/Taipei"),
    ))
}

pub fn valid_input(attendance_type: &str) -> AttendanceInput {
    AttendanceInput {
        employee_name: Some("Wang Lei".into()),
        department: Some("IT".into()),
        attendance_date: Some(TODAY.into()),
        attendance_time: Some("08:15".into()),
        attendance_type: Some(attendance_type.into()),
        location: Some("office".into()),
        custom_location: None,
        notes: Some("early shift".into()),
    }
}
