//! `RecordStore` over the local SQLite database.

use async_trait::async_trait;
use chrono::Utc;

use super::{RecordStore, StoredRecord};
use crate::db::{record_repo, Database, DatabaseError};
use crate::error::{DeleteError, InsertError};
use crate::job::{CommitRecord, RecordId};

#[derive(Clone)]
pub struct SqliteRecordStore {
    db: Database,
}

impl SqliteRecordStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    async fn run_blocking<F, T>(&self, f: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(&Database) -> Result<T, DatabaseError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| DatabaseError::Task(e.to_string()))?
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn insert_returning(&self, record: &CommitRecord) -> Result<StoredRecord, InsertError> {
        let submitted = record.clone();
        let created_at = Utc::now().to_rfc3339();
        let row = self
            .run_blocking(move |db| record_repo::insert_returning(db, &submitted, &created_at))
            .await?;

        Ok(StoredRecord {
            id: RecordId::from(row.id),
            record: row.to_commit_record()?,
        })
    }

    async fn delete_by_id(&self, id: &RecordId) -> Result<(), DeleteError> {
        let row_id: i64 = id
            .as_str()
            .parse()
            .map_err(|_| DeleteError::NotFound(id.to_string()))?;

        let removed = self
            .run_blocking(move |db| record_repo::delete_by_id(db, row_id))
            .await?;

        if removed == 0 {
            return Err(DeleteError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobMetadata;
    use crate::metrics::LogMetrics;

    fn store() -> SqliteRecordStore {
        SqliteRecordStore::new(Database::open_in_memory().unwrap())
    }

    fn record() -> CommitRecord {
        CommitRecord::new(&JobMetadata::new("JAN 1", 10, "X"), &LogMetrics::new(12, 11))
    }

    #[tokio::test]
    async fn test_insert_verifies_and_returns_id() {
        let store = store();
        let id = store.insert(&record()).await.unwrap();

        let row = record_repo::find_by_id(store.database(), id.as_str().parse().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(row.job_order, "JAN 1");
    }

    #[tokio::test]
    async fn test_delete_removes_row() {
        let store = store();
        let id = store.insert(&record()).await.unwrap();

        store.delete_by_id(&id).await.unwrap();
        assert_eq!(record_repo::count_by_job(store.database(), "JAN 1").unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_not_found() {
        let store = store();
        assert!(matches!(
            store.delete_by_id(&RecordId::new("999")).await,
            Err(DeleteError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_by_id(&RecordId::new("not-a-number")).await,
            Err(DeleteError::NotFound(_))
        ));
    }
}
