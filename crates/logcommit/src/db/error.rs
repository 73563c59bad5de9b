//! Database error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// SQLite error from rusqlite.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error when creating directories or files.
    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A migration failed to apply.
    #[error("Migration failed at version {version}: {reason}")]
    Migration { version: u32, reason: String },

    /// A counter does not fit the SQLite INTEGER column.
    #[error("Value for '{column}' out of range: {value}")]
    OutOfRange { column: &'static str, value: u64 },

    /// A stored counter is negative.
    #[error("Corrupt value {value} stored in '{column}'")]
    Corrupt { column: &'static str, value: i64 },

    /// The database lock was poisoned.
    #[error("Database lock poisoned")]
    LockPoisoned,

    /// The blocking database task panicked or was cancelled.
    #[error("Database task failed: {0}")]
    Task(String),
}
