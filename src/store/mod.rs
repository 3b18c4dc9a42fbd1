pub mod local;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::StoreError;

/// Durable string key/value medium backing the local record store.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

pub use local::LocalRecordStore;
pub use sqlite::SqliteStorage;
