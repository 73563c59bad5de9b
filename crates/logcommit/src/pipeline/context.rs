use std::fmt;

use uuid::Uuid;

use crate::job::JobMetadata;
use crate::metrics::LogMetrics;

use super::error::PipelineWarning;
use super::policy::Advisory;

/// States of one commit attempt, in the order they are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CommitPhase {
    Start,
    ThresholdChecked,
    Inserted,
    Uploaded,
    SourceDeleted,
    Done,
}

impl fmt::Display for CommitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommitPhase::Start => "start",
            CommitPhase::ThresholdChecked => "threshold_checked",
            CommitPhase::Inserted => "inserted",
            CommitPhase::Uploaded => "uploaded",
            CommitPhase::SourceDeleted => "source_deleted",
            CommitPhase::Done => "done",
        };
        f.write_str(name)
    }
}

pub struct CommitContext {
    // Input
    pub attempt_id: String,
    pub metadata: JobMetadata,
    pub metrics: LogMetrics,

    pub phase: CommitPhase,

    pub advisories: Vec<Advisory>,

    // Non-fatal warnings
    pub warnings: Vec<PipelineWarning>,
}

impl CommitContext {
    pub fn new(metadata: JobMetadata, metrics: LogMetrics) -> Self {
        Self {
            attempt_id: Uuid::new_v4().to_string(),
            metadata,
            metrics,
            phase: CommitPhase::Start,
            advisories: Vec::new(),
            warnings: Vec::new(),
        }
    }
}
