//! Record and archive store contracts, plus their adapters.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::{DeleteError, InsertError, StoreError};
use crate::job::{CommitRecord, RecordId};

pub mod filesystem;
pub mod http;
pub mod postgrest;
pub mod sqlite;
pub mod supabase;

pub use filesystem::FilesystemArchiveStore;
pub use postgrest::PostgrestRecordStore;
pub use sqlite::SqliteRecordStore;
pub use supabase::SupabaseArchiveStore;

/// The row as echoed back by the record store after an insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub id: RecordId,
    pub record: CommitRecord,
}

impl StoredRecord {
    /// Compares every echoed field against the submitted record.
    pub fn verify_echo(&self, submitted: &CommitRecord) -> Result<(), InsertError> {
        let echoed = &self.record;
        if echoed.job_id != submitted.job_id {
            return Err(mismatch("job_order", &submitted.job_id, &echoed.job_id));
        }
        if echoed.quantity != submitted.quantity {
            return Err(mismatch("job_quantity", submitted.quantity, echoed.quantity));
        }
        if echoed.programmed_count != submitted.programmed_count {
            return Err(mismatch(
                "programmed",
                submitted.programmed_count,
                echoed.programmed_count,
            ));
        }
        if echoed.verified_count != submitted.verified_count {
            return Err(mismatch(
                "verified",
                submitted.verified_count,
                echoed.verified_count,
            ));
        }
        if echoed.device != submitted.device {
            return Err(mismatch("device", &submitted.device, &echoed.device));
        }
        Ok(())
    }
}

fn mismatch(
    field: &'static str,
    submitted: impl ToString,
    echoed: impl ToString,
) -> InsertError {
    InsertError::EchoMismatch {
        field,
        submitted: submitted.to_string(),
        echoed: echoed.to_string(),
    }
}

/// Database backend holding one row per committed job.
#[async_trait]
pub trait RecordStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    /// Inserts the record and returns the row exactly as the backend stored it.
    async fn insert_returning(&self, record: &CommitRecord) -> Result<StoredRecord, InsertError>;

    /// Inserts and verifies the echo field-by-field. A mismatching echo is an
    /// error and its id is never surfaced.
    async fn insert(&self, record: &CommitRecord) -> Result<RecordId, InsertError> {
        let stored = self.insert_returning(record).await?;
        stored.verify_echo(record)?;
        Ok(stored.id)
    }

    async fn delete_by_id(&self, id: &RecordId) -> Result<(), DeleteError>;
}

/// Object storage backend holding the raw logs.
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    /// Existence probe. Adapters may report absence either as `Ok(false)`
    /// or as `Err(StoreError::NotFound)`.
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;
}

/// Source of "today" for archive key dates.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the host.
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Always returns the same date.
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
