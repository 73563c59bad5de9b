use tracing::{info, warn};

use super::context::CommitPhase;

/// Events emitted by the pipeline while committing.
pub enum ProgressEvent {
    Phase { phase: CommitPhase, message: String },
    Completed { archive_key: String },
    Failed { error: String },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Logs phase transitions through `tracing`. Used by the CLI.
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Phase { phase, message } => {
                info!(phase = %phase, "{}", message);
            }
            ProgressEvent::Completed { archive_key } => {
                info!(archive_key = %archive_key, "Commit completed");
            }
            ProgressEvent::Failed { error } => {
                warn!(error = %error, "Commit did not complete");
            }
        }
    }
}
