//! Terminal result of one commit attempt.

use crate::error::{InsertError, SourceError};
use crate::job::{JobMetadata, RecordId};
use crate::metrics::LogMetrics;
use crate::naming::ArchiveKey;

use super::context::{CommitContext, CommitPhase};
use super::error::{PipelineWarning, RollbackError, UploadError};
use super::policy::{Advisory, Counter};

#[derive(Debug)]
pub enum RollbackStatus {
    RolledBack,
    /// The record is orphaned and needs manual deletion.
    Failed(RollbackError),
}

impl RollbackStatus {
    pub fn succeeded(&self) -> bool {
        matches!(self, RollbackStatus::RolledBack)
    }
}

#[derive(Debug)]
pub enum Outcome {
    /// No remote call was made.
    BelowThreshold { counter: Counter },

    /// Nothing was written.
    InsertFailed { error: InsertError },

    /// The record was inserted, the upload stage failed, and one rollback
    /// was attempted.
    UploadFailed {
        record_id: RecordId,
        cause: UploadError,
        rollback: RollbackStatus,
    },

    /// Both remote writes are durable; only the local cleanup failed.
    SourceDeleteFailed {
        record_id: RecordId,
        archive_key: ArchiveKey,
        error: SourceError,
    },

    Committed {
        record_id: RecordId,
        archive_key: ArchiveKey,
    },
}

impl Outcome {
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::BelowThreshold { .. } => "below_threshold",
            Outcome::InsertFailed { .. } => "insert_failed",
            Outcome::UploadFailed { .. } => "upload_failed",
            Outcome::SourceDeleteFailed { .. } => "source_delete_failed",
            Outcome::Committed { .. } => "committed",
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, Outcome::Committed { .. })
    }

    /// Both remote writes are durable, whether or not the source was removed.
    pub fn is_durable(&self) -> bool {
        matches!(
            self,
            Outcome::Committed { .. } | Outcome::SourceDeleteFailed { .. }
        )
    }

    /// True when an operator has to clean up an orphaned record.
    pub fn needs_manual_intervention(&self) -> bool {
        matches!(
            self,
            Outcome::UploadFailed {
                rollback: RollbackStatus::Failed(_),
                ..
            }
        )
    }

    pub fn archive_key(&self) -> Option<&ArchiveKey> {
        match self {
            Outcome::Committed { archive_key, .. }
            | Outcome::SourceDeleteFailed { archive_key, .. } => Some(archive_key),
            _ => None,
        }
    }
}

/// Everything the reporter and the caller need about one attempt.
#[derive(Debug)]
pub struct CommitReport {
    pub attempt_id: String,
    pub metadata: JobMetadata,
    pub metrics: LogMetrics,
    pub phase: CommitPhase,
    pub outcome: Outcome,
    pub advisories: Vec<Advisory>,
    pub warnings: Vec<PipelineWarning>,
}

impl CommitReport {
    pub fn new(ctx: CommitContext, outcome: Outcome) -> Self {
        Self {
            attempt_id: ctx.attempt_id,
            metadata: ctx.metadata,
            metrics: ctx.metrics,
            phase: ctx.phase,
            outcome,
            advisories: ctx.advisories,
            warnings: ctx.warnings,
        }
    }
}
