use std::path::PathBuf;

use tracing::warn;

use crate::hash::compute_hash;
use crate::history::{HistoryError, ImageHistoryRecord, LocalFileStorage};

const HISTORY_DIR: &str = "history";

/// History kept as one JSON file per record, grouped by a hash of the owner id
/// so arbitrary owner strings never become path components.
#[derive(Clone, Debug)]
pub struct FileHistoryStore {
    storage: LocalFileStorage,
}

impl FileHistoryStore {
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            storage: LocalFileStorage::new(base_dir),
        }
    }

    fn owner_dir(owner_id: &str) -> String {
        format!("{HISTORY_DIR}/{}", compute_hash(owner_id))
    }

    fn record_key(record: &ImageHistoryRecord) -> String {
        // Fixed-width timestamp so file names sort chronologically.
        let stamp = record.created_at.format("%Y%m%dT%H%M%S%.9fZ");
        format!("{}/{stamp}_{}.json", Self::owner_dir(&record.user_id), record.id)
    }

    pub async fn append(&self, record: &ImageHistoryRecord) -> Result<(), HistoryError> {
        let payload = serde_json::to_vec_pretty(record)?;
        self.storage.put(&Self::record_key(record), &payload).await?;
        Ok(())
    }

    pub async fn list_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<ImageHistoryRecord>, HistoryError> {
        let keys = self
            .storage
            .list_json_keys_desc(&Self::owner_dir(owner_id))
            .await?;
        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            let Some(bytes) = self.storage.get(&key).await? else {
                continue;
            };
            match serde_json::from_slice::<ImageHistoryRecord>(&bytes) {
                Ok(record) if record.user_id == owner_id => records.push(record),
                Ok(_) => {}
                Err(err) => warn!(key = %key, error = %err, "skipping unreadable history record"),
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_only_the_owners_records_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileHistoryStore::new(dir.path().to_path_buf());

        let first = ImageHistoryRecord::new("alice", "data:image/png;base64,AAAA");
        store.append(&first).await.unwrap();
        let other = ImageHistoryRecord::new("bob", "https://example.com/b.png");
        store.append(&other).await.unwrap();
        let second = ImageHistoryRecord::new("alice", "https://example.com/a2.png");
        store.append(&second).await.unwrap();

        let records = store.list_by_owner("alice").await.unwrap();
        assert_eq!(records, vec![second, first]);
        assert_eq!(store.list_by_owner("bob").await.unwrap(), vec![other]);
        assert!(store.list_by_owner("carol").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn owner_ids_with_path_separators_stay_inside_the_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileHistoryStore::new(dir.path().join("data"));

        let record = ImageHistoryRecord::new("../../etc", "https://example.com/x.png");
        store.append(&record).await.unwrap();

        assert!(!dir.path().join("etc").exists());
        assert_eq!(store.list_by_owner("../../etc").await.unwrap(), vec![record]);
    }

    #[tokio::test]
    async fn corrupt_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileHistoryStore::new(dir.path().to_path_buf());
        let record = ImageHistoryRecord::new("alice", "https://example.com/a.png");
        store.append(&record).await.unwrap();
        let broken = format!("{}/99999999T000000.000000000Z_broken.json", FileHistoryStore::owner_dir("alice"));
        store.storage.put(&broken, b"not json").await.unwrap();

        assert_eq!(store.list_by_owner("alice").await.unwrap(), vec![record]);
    }
}
