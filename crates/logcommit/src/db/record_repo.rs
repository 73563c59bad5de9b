//! Record repository: insert, find, delete and count on the `coding_log` table.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DatabaseError};
use crate::job::CommitRecord;

/// A raw `coding_log` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
    pub id: i64,
    pub job_order: String,
    pub job_quantity: i64,
    pub programmed: i64,
    pub verified: i64,
    pub device: String,
    pub created_at: Option<String>,
}

impl RecordRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            job_order: row.get("job_order")?,
            job_quantity: row.get("job_quantity")?,
            programmed: row.get("programmed")?,
            verified: row.get("verified")?,
            device: row.get("device")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Converts the stored columns back into a `CommitRecord` for echo comparison.
    pub fn to_commit_record(&self) -> Result<CommitRecord, DatabaseError> {
        Ok(CommitRecord {
            job_id: self.job_order.clone(),
            quantity: from_sql_int("job_quantity", self.job_quantity)?,
            programmed_count: from_sql_int("programmed", self.programmed)?,
            verified_count: from_sql_int("verified", self.verified)?,
            device: self.device.clone(),
        })
    }
}

fn to_sql_int(column: &'static str, value: u64) -> Result<i64, DatabaseError> {
    i64::try_from(value).map_err(|_| DatabaseError::OutOfRange { column, value })
}

fn from_sql_int(column: &'static str, value: i64) -> Result<u64, DatabaseError> {
    u64::try_from(value).map_err(|_| DatabaseError::Corrupt { column, value })
}

/// Inserts a record and returns the stored row.
pub fn insert_returning(
    db: &Database,
    record: &CommitRecord,
    created_at: &str,
) -> Result<RecordRow, DatabaseError> {
    let quantity = to_sql_int("job_quantity", record.quantity)?;
    let programmed = to_sql_int("programmed", record.programmed_count)?;
    let verified = to_sql_int("verified", record.verified_count)?;

    db.with_conn(|conn| {
        let row = conn.query_row(
            "INSERT INTO coding_log (job_order, job_quantity, programmed, verified, device, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, job_order, job_quantity, programmed, verified, device, created_at",
            params![
                record.job_id,
                quantity,
                programmed,
                verified,
                record.device,
                created_at,
            ],
            RecordRow::from_row,
        )?;
        Ok(row)
    })
}

/// Finds a record by its ID.
pub fn find_by_id(db: &Database, id: i64) -> Result<Option<RecordRow>, DatabaseError> {
    db.with_conn(|conn| {
        let row = conn
            .query_row(
                "SELECT id, job_order, job_quantity, programmed, verified, device, created_at
                 FROM coding_log WHERE id = ?1",
                params![id],
                RecordRow::from_row,
            )
            .optional()?;
        Ok(row)
    })
}

/// Deletes a record by its ID. Returns the number of rows removed.
pub fn delete_by_id(db: &Database, id: i64) -> Result<usize, DatabaseError> {
    db.with_conn(|conn| {
        let removed = conn.execute("DELETE FROM coding_log WHERE id = ?1", params![id])?;
        Ok(removed)
    })
}

/// Counts records for a job.
pub fn count_by_job(db: &Database, job_order: &str) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM coding_log WHERE job_order = ?1",
            params![job_order],
            |r| r.get(0),
        )?;
        from_sql_int("count", count)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobMetadata;
    use crate::metrics::LogMetrics;

    fn test_db() -> Database {
        Database::open_in_memory().expect("Failed to create test database")
    }

    fn sample_record(job: &str) -> CommitRecord {
        CommitRecord::new(&JobMetadata::new(job, 10, "X"), &LogMetrics::new(12, 11))
    }

    #[test]
    fn test_insert_returning_echoes_row() {
        let db = test_db();
        let record = sample_record("JAN 1");
        let row = insert_returning(&db, &record, "2026-01-01T00:00:00Z").unwrap();

        assert!(row.id > 0);
        assert_eq!(row.to_commit_record().unwrap(), record);
        assert_eq!(row.created_at.as_deref(), Some("2026-01-01T00:00:00Z"));
    }

    #[test]
    fn test_find_and_delete() {
        let db = test_db();
        let row = insert_returning(&db, &sample_record("JAN 2"), "2026-01-01T00:00:00Z").unwrap();

        assert!(find_by_id(&db, row.id).unwrap().is_some());
        assert_eq!(delete_by_id(&db, row.id).unwrap(), 1);
        assert!(find_by_id(&db, row.id).unwrap().is_none());
        assert_eq!(delete_by_id(&db, row.id).unwrap(), 0);
    }

    #[test]
    fn test_count_by_job() {
        let db = test_db();
        insert_returning(&db, &sample_record("FEB 3"), "t").unwrap();
        insert_returning(&db, &sample_record("FEB 3"), "t").unwrap();
        insert_returning(&db, &sample_record("FEB 4"), "t").unwrap();

        assert_eq!(count_by_job(&db, "FEB 3").unwrap(), 2);
        assert_eq!(count_by_job(&db, "MAR 1").unwrap(), 0);
    }

    #[test]
    fn test_out_of_range_quantity_rejected() {
        let db = test_db();
        let mut record = sample_record("JAN 9");
        record.quantity = u64::MAX;
        assert!(matches!(
            insert_returning(&db, &record, "t"),
            Err(DatabaseError::OutOfRange {
                column: "job_quantity",
                ..
            })
        ));
    }
}
