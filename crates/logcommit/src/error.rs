use std::path::PathBuf;
use thiserror::Error;

/// Minimum archive permissions the configured credentials must grant.
pub const REQUIRED_ARCHIVE_PERMISSIONS: &[&str] = &[
    "read-existence (HEAD object)",
    "write-object (PUT/POST object)",
    "list (LIST bucket)",
];

#[derive(Error, Debug)]
pub enum LogCommitError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Secret resolution failed: {0}")]
    Secret(#[from] crate::secrets::SecretError),

    #[error("Failed to read log file '{path}': {source}")]
    ReadLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Settings error: {0}")]
    Settings(#[from] crate::settings::SettingsError),

    #[error("HTTP endpoint error: {0}")]
    Endpoint(#[from] crate::store::http::EndpointError),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("No config file found (looked for '{0}')")]
    NotFound(PathBuf),
}

/// Rejected form input. Produced before any remote call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown job month '{0}' (expected JAN..DEC)")]
    InvalidMonth(String),

    #[error("Please enter a valid numeric job number (got '{0}')")]
    InvalidJobNumber(String),

    #[error("Please enter a valid job quantity (got '{0}')")]
    InvalidQuantity(String),
}

/// Failure of `RecordStore::insert`. No record id is surfaced with any variant.
#[derive(Error, Debug)]
pub enum InsertError {
    #[error("Record store rejected the insert: {0}")]
    Rejected(String),

    #[error("Record store unreachable: {0}")]
    Transport(String),

    #[error("Record store returned no inserted row")]
    EchoMissing,

    #[error("Inserted row could not be read back: {0}")]
    EchoMalformed(String),

    #[error("Inserted row does not match submitted data: {field} submitted '{submitted}', echoed '{echoed}'")]
    EchoMismatch {
        field: &'static str,
        submitted: String,
        echoed: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),
}

impl InsertError {
    /// True when the backend accepted the call but echoed different data.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(
            self,
            InsertError::EchoMissing
                | InsertError::EchoMalformed(_)
                | InsertError::EchoMismatch { .. }
        )
    }
}

#[derive(Error, Debug)]
pub enum DeleteError {
    #[error("No record with id '{0}'")]
    NotFound(String),

    #[error("Record store rejected the delete: {0}")]
    Rejected(String),

    #[error("Record store unreachable: {0}")]
    Transport(String),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),
}

/// Closed failure taxonomy of the archive backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Object '{0}' not found")]
    NotFound(String),

    #[error("Access denied for '{key}': {detail}. Required permissions: {}", REQUIRED_ARCHIVE_PERMISSIONS.join(", "))]
    AccessDenied { key: String, detail: String },

    #[error("Archive credentials rejected: {0}")]
    InvalidCredentials(String),

    #[error("Archive backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Archive error: {0}")]
    Other(String),
}

impl StoreError {
    /// Actionable permission guidance, present only for access-denied failures.
    pub fn guidance(&self) -> Option<String> {
        match self {
            StoreError::AccessDenied { .. } => Some(format!(
                "Grant the archive credentials at least: {}",
                REQUIRED_ARCHIVE_PERMISSIONS.join(", ")
            )),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("The specified path does not point to a valid file: {0}")]
    NotAFile(PathBuf),

    #[error("Failed to make '{path}' writable: {source}")]
    Permissions {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete '{path}': {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, LogCommitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_denied_lists_required_permissions() {
        let err = StoreError::AccessDenied {
            key: "logs/a.txt".to_string(),
            detail: "403".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("read-existence"));
        assert!(msg.contains("write-object"));
        assert!(msg.contains("list"));
        assert!(err.guidance().is_some());
    }

    #[test]
    fn test_guidance_absent_for_other_errors() {
        assert!(StoreError::BackendUnavailable("down".into())
            .guidance()
            .is_none());
        assert!(StoreError::NotFound("k".into()).guidance().is_none());
    }

    #[test]
    fn test_integrity_violation_classification() {
        assert!(InsertError::EchoMissing.is_integrity_violation());
        assert!(InsertError::EchoMismatch {
            field: "job_quantity",
            submitted: "100".into(),
            echoed: "99".into(),
        }
        .is_integrity_violation());
        assert!(InsertError::EchoMalformed("device: null".into()).is_integrity_violation());
        assert!(!InsertError::Transport("timeout".into()).is_integrity_violation());
        assert!(!InsertError::Rejected("409".into()).is_integrity_violation());
    }
}
