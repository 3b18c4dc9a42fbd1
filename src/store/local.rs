use std::sync::Arc;

use chrono::Utc;
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::model::attendance::AttendanceRecord;
use crate::models::BackupEntry;
use crate::store::Storage;

pub const RECORDS_KEY: &str = "attendanceData";
pub const BACKUP_INDEX_KEY: &str = "jsonFileList";
const BACKUP_KEY_PREFIX: &str = "json_backup_";
const QUARANTINE_SUFFIX: &str = "_corrupt_";
const BACKUP_FORMAT_VERSION: &str = "1.0";

/// On-device record store. Append-only from the submission path.
///
/// The full record array is kept in memory and rewritten to the medium on every
/// append; the cache only changes once the write has succeeded.
pub struct LocalRecordStore {
    storage: Arc<dyn Storage>,
    records: RwLock<Vec<AttendanceRecord>>,
}

impl LocalRecordStore {
    /// Loads the stored record array. Records that no longer parse are not dropped
    /// silently: the raw blob is copied to a quarantine key first, and the store refuses
    /// to open if that copy cannot be written, since the next append would overwrite it.
    pub async fn open(storage: Arc<dyn Storage>) -> Result<Self, StoreError> {
        let records = match storage.get(RECORDS_KEY).await? {
            Some(raw) => load_records(storage.as_ref(), &raw).await?,
            None => Vec::new(),
        };

        debug!(count = records.len(), "Local record store opened");

        Ok(Self {
            storage,
            records: RwLock::new(records),
        })
    }

    /// Durably stores `record`, then writes its JSON backup (best effort).
    pub async fn append(&self, record: &AttendanceRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;

        let payload = serde_json::to_string(
            &records.iter().chain(std::iter::once(record)).collect::<Vec<_>>(),
        )?;
        self.storage.set(RECORDS_KEY, &payload).await?;
        records.push(record.clone());

        if let Err(e) = self.write_backup(record).await {
            warn!(error = %e, id = %record.id, "Failed to write record backup");
        }

        Ok(())
    }

    /// Records for `date` in insertion order.
    pub async fn query_by_date(&self, date: &str) -> Vec<AttendanceRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.attendance_date == date)
            .cloned()
            .collect()
    }

    pub async fn load_all(&self) -> Vec<AttendanceRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn backups(&self) -> Result<Vec<BackupEntry>, StoreError> {
        self.read_backup_index().await
    }

    pub async fn backup(&self, id: &str) -> Result<Option<Value>, StoreError> {
        match self.storage.get(&backup_key(id)).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn write_backup(&self, record: &AttendanceRecord) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();
        let blob = json!({
            "attendanceRecord": record,
            "exportInfo": {
                "exportTime": now,
                "version": BACKUP_FORMAT_VERSION,
                "system": env!("CARGO_PKG_NAME"),
            }
        });
        self.storage
            .set(&backup_key(&record.id), &serde_json::to_string_pretty(&blob)?)
            .await?;

        let mut index = self.read_backup_index().await?;
        index.push(BackupEntry {
            id: record.id.clone(),
            file_name: backup_file_name(record),
            timestamp: now,
            employee_name: record.employee_name.clone(),
            attendance_date: record.attendance_date.clone(),
        });
        self.storage
            .set(BACKUP_INDEX_KEY, &serde_json::to_string(&index)?)
            .await
    }

    async fn read_backup_index(&self) -> Result<Vec<BackupEntry>, StoreError> {
        Ok(match self.storage.get(BACKUP_INDEX_KEY).await? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Backup index is corrupt, rebuilding");
                Vec::new()
            }),
            None => Vec::new(),
        })
    }
}

async fn load_records(
    storage: &dyn Storage,
    raw: &str,
) -> Result<Vec<AttendanceRecord>, StoreError> {
    let (records, unreadable) = match serde_json::from_str::<Vec<Value>>(raw) {
        Ok(items) => {
            let total = items.len();
            let records: Vec<AttendanceRecord> = items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect();
            let unreadable = total - records.len();
            (records, unreadable)
        }
        Err(_) => (Vec::new(), 1),
    };

    if unreadable > 0 {
        let key = quarantine_key();
        storage.set(&key, raw).await?;
        warn!(
            %key,
            kept = records.len(),
            unreadable,
            "Stored attendance data is partly unreadable, original kept under quarantine key"
        );
    }

    Ok(records)
}

fn quarantine_key() -> String {
    format!(
        "{RECORDS_KEY}{QUARANTINE_SUFFIX}{}",
        Utc::now().format("%Y%m%dT%H%M%S%.3fZ")
    )
}

fn backup_key(id: &str) -> String {
    format!("{BACKUP_KEY_PREFIX}{id}")
}

fn backup_file_name(record: &AttendanceRecord) -> String {
    format!(
        "attendance_{}_{}_{}.json",
        record.employee_name,
        record.attendance_date,
        record.attendance_time.replace(':', "")
    )
}
