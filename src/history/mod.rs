//! Per-owner history of generated designs.
//!
//! Two interchangeable backends: JSON record files under the data directory
//! (the default) and SQLite when a database URL is configured.

pub mod file_store;
pub mod record;
pub mod sqlite_store;
pub mod storage;

use std::path::Path;

use thiserror::Error;

pub use file_store::FileHistoryStore;
pub use record::ImageHistoryRecord;
pub use sqlite_store::SqliteHistoryStore;
pub use storage::LocalFileStorage;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("history record encoding error: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("history database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("corrupt history record {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

#[derive(Clone, Debug)]
pub enum HistoryStore {
    File(FileHistoryStore),
    Sqlite(SqliteHistoryStore),
}

impl HistoryStore {
    /// SQLite when `database_url` is given, record files under `data_dir` otherwise.
    pub async fn open(database_url: Option<&str>, data_dir: &Path) -> Result<Self, HistoryError> {
        match database_url {
            Some(url) => Ok(Self::Sqlite(SqliteHistoryStore::connect(url).await?)),
            None => Ok(Self::File(FileHistoryStore::new(data_dir.to_path_buf()))),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::File(_) => "files",
            Self::Sqlite(_) => "sqlite",
        }
    }

    /// Insert a new record for `owner_id`; id and timestamp are assigned here.
    pub async fn append(
        &self,
        owner_id: &str,
        image_url: &str,
    ) -> Result<ImageHistoryRecord, HistoryError> {
        let record = ImageHistoryRecord::new(owner_id, image_url);
        match self {
            Self::File(store) => store.append(&record).await?,
            Self::Sqlite(store) => store.append(&record).await?,
        }
        Ok(record)
    }

    /// All records whose owner id matches exactly, newest first.
    pub async fn list_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<ImageHistoryRecord>, HistoryError> {
        match self {
            Self::File(store) => store.list_by_owner(owner_id).await,
            Self::Sqlite(store) => store.list_by_owner(owner_id).await,
        }
    }
}
