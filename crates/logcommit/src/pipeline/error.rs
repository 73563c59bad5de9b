use thiserror::Error;

use crate::error::{DeleteError, StoreError};
use crate::naming::SequenceError;

/// Failure anywhere in the upload stage. Every variant triggers the
/// compensating delete of the inserted record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("Could not choose an archive key: {0}")]
    Sequence(#[from] SequenceError),

    #[error("Archive upload failed: {0}")]
    Put(StoreError),

    #[error("Uploaded object '{key}' could not be found on re-check")]
    NotVerified { key: String },

    #[error("Could not re-check uploaded object: {0}")]
    Verify(StoreError),
}

impl UploadError {
    /// The underlying archive failure, if there is one.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            UploadError::Sequence(SequenceError::Probe(e))
            | UploadError::Put(e)
            | UploadError::Verify(e) => Some(e),
            UploadError::Sequence(SequenceError::Exhausted { .. })
            | UploadError::NotVerified { .. } => None,
        }
    }
}

/// The compensating delete itself failed; the record must be removed by hand.
#[derive(Error, Debug)]
#[error("Rollback of record '{record_id}' failed: {source}")]
pub struct RollbackError {
    pub record_id: String,
    #[source]
    pub source: DeleteError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineWarning {
    /// An existence probe was denied and treated as "absent".
    ProbeAccessDenied { key: String, detail: String },
}

impl std::fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineWarning::ProbeAccessDenied { key, detail } => write!(
                f,
                "Existence check for '{}' was denied ({}); assumed free",
                key, detail
            ),
        }
    }
}
