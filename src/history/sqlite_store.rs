use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::info;

use crate::history::{HistoryError, ImageHistoryRecord};

#[derive(sqlx::FromRow)]
struct HistoryRow {
    id: String,
    user_id: String,
    image_url: String,
    created_at: String,
}

impl TryFrom<HistoryRow> for ImageHistoryRecord {
    type Error = HistoryError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|err| HistoryError::Corrupt {
                id: row.id.clone(),
                reason: err.to_string(),
            })?
            .with_timezone(&Utc);
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            image_url: row.image_url,
            created_at,
        })
    }
}

/// Relational history backend on SQLite.
#[derive(Clone, Debug)]
pub struct SqliteHistoryStore {
    pool: SqlitePool,
}

impl SqliteHistoryStore {
    /// Open (creating if needed) the database at `url` and ensure the schema.
    pub async fn connect(url: &str) -> Result<Self, HistoryError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.init_schema().await?;
        info!("Opened history database: {url}");
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn init_schema(&self) -> Result<(), HistoryError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS image_history (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                image_url TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_image_history_user ON image_history (user_id, created_at)",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn append(&self, record: &ImageHistoryRecord) -> Result<(), HistoryError> {
        sqlx::query(
            "INSERT INTO image_history (id, user_id, image_url, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.image_url)
        .bind(record.created_at.to_rfc3339_opts(SecondsFormat::Nanos, true))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<ImageHistoryRecord>, HistoryError> {
        let rows: Vec<HistoryRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, image_url, created_at
            FROM image_history
            WHERE user_id = ?
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(ImageHistoryRecord::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_store(dir: &tempfile::TempDir) -> SqliteHistoryStore {
        let url = format!("sqlite://{}", dir.path().join("history.db").display());
        SqliteHistoryStore::connect(&url).await.unwrap()
    }

    #[tokio::test]
    async fn filters_by_owner_and_orders_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir).await;

        let mut expected_a = Vec::new();
        for i in 0..3 {
            let record = ImageHistoryRecord::new("owner-a", &format!("https://example.com/a{i}.png"));
            store.append(&record).await.unwrap();
            expected_a.push(record);
        }
        for i in 0..2 {
            let record = ImageHistoryRecord::new("owner-b", &format!("https://example.com/b{i}.png"));
            store.append(&record).await.unwrap();
        }
        expected_a.reverse();

        let records = store.list_by_owner("owner-a").await.unwrap();
        assert_eq!(records, expected_a);
        assert_eq!(store.list_by_owner("owner-b").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn reopening_keeps_existing_records() {
        let dir = tempfile::tempdir().unwrap();
        let record = ImageHistoryRecord::new("owner", "data:image/png;base64,AAAA");
        {
            let store = temp_store(&dir).await;
            store.append(&record).await.unwrap();
        }
        let store = temp_store(&dir).await;
        assert_eq!(store.list_by_owner("owner").await.unwrap(), vec![record]);
    }

    #[tokio::test]
    async fn append_fails_when_table_is_gone() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir).await;
        sqlx::query("DROP TABLE image_history")
            .execute(store.pool())
            .await
            .unwrap();

        let record = ImageHistoryRecord::new("owner", "https://example.com/x.png");
        let err = store.append(&record).await.unwrap_err();
        assert!(matches!(err, HistoryError::Database(_)));
    }
}
