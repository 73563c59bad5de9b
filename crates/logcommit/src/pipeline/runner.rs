use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::error::{InsertError, StoreError};
use crate::job::{CommitRecord, JobMetadata, RecordId};
use crate::metrics::LogMetrics;
use crate::naming::{self, ArchiveKey, KeyProbe};
use crate::sanitize;
use crate::source::SourceFile;
use crate::store::{ArchiveStore, Clock, RecordStore};

use super::config::PipelineConfig;
use super::context::{CommitContext, CommitPhase};
use super::error::{PipelineWarning, RollbackError, UploadError};
use super::outcome::{CommitReport, Outcome, RollbackStatus};
use super::policy::{self, Counter};
use super::progress::{ProgressEvent, ProgressReporter};

/// Input of one commit attempt. `payload` is the raw log as read from disk.
pub struct CommitRequest {
    pub metadata: JobMetadata,
    pub metrics: LogMetrics,
    pub payload: Vec<u8>,
}

impl CommitRequest {
    /// Counts the payload and bundles it with the metadata.
    pub fn from_log(metadata: JobMetadata, payload: Vec<u8>) -> Self {
        let metrics = LogMetrics::count_bytes(&payload);
        Self {
            metadata,
            metrics,
            payload,
        }
    }
}

/// Drives threshold → insert → upload (or rollback) → delete-source.
///
/// Holds no per-attempt state; concurrent calls to `commit` are independent.
pub struct CommitPipeline {
    config: PipelineConfig,
    records: Arc<dyn RecordStore>,
    archive: Arc<dyn ArchiveStore>,
    clock: Arc<dyn Clock>,
}

impl CommitPipeline {
    pub fn new(
        config: PipelineConfig,
        records: Arc<dyn RecordStore>,
        archive: Arc<dyn ArchiveStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            records,
            archive,
            clock,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs one commit attempt to a terminal outcome. Never returns early
    /// between a successful insert and the end of its compensation.
    pub async fn commit(
        &self,
        request: CommitRequest,
        source: &dyn SourceFile,
        progress: &dyn ProgressReporter,
    ) -> CommitReport {
        let CommitRequest {
            metadata,
            metrics,
            payload,
        } = request;
        let mut ctx = CommitContext::new(metadata, metrics);

        let span = info_span!("commit",
            attempt_id = %ctx.attempt_id,
            job_id = %ctx.metadata.job_id,
            quantity = ctx.metadata.quantity,
            source = %sanitize::redact_path(source.path()),
            records = self.records.backend_name(),
            archive = self.archive.backend_name(),
        );

        let outcome = self
            .run(&mut ctx, &payload, source, progress)
            .instrument(span.clone())
            .await;

        span.in_scope(|| {
            info!(
                outcome = outcome.kind(),
                phase = %ctx.phase,
                warnings = ctx.warnings.len(),
                "Commit attempt finished"
            );
        });

        CommitReport::new(ctx, outcome)
    }

    async fn run(
        &self,
        ctx: &mut CommitContext,
        payload: &[u8],
        source: &dyn SourceFile,
        progress: &dyn ProgressReporter,
    ) -> Outcome {
        // Step 1: Threshold
        {
            let _step = info_span!("threshold").entered();
            progress.report(ProgressEvent::Phase {
                phase: CommitPhase::Start,
                message: "Checking counts against job quantity...".to_string(),
            });
            if let Err(counter) = self.step_threshold(ctx) {
                progress.report(ProgressEvent::Failed {
                    error: format!("{} count is less than job quantity", counter),
                });
                return Outcome::BelowThreshold { counter };
            }
        }

        // Step 2: Insert record
        progress.report(ProgressEvent::Phase {
            phase: CommitPhase::ThresholdChecked,
            message: "Posting record to the database...".to_string(),
        });
        let record_id = match self.step_insert(ctx).instrument(info_span!("insert")).await {
            Ok(id) => id,
            Err(error) => {
                error!(
                    error = %error,
                    integrity = error.is_integrity_violation(),
                    "Record insert failed"
                );
                progress.report(ProgressEvent::Failed {
                    error: error.to_string(),
                });
                return Outcome::InsertFailed { error };
            }
        };

        // Step 3: Upload, compensating on any failure
        progress.report(ProgressEvent::Phase {
            phase: CommitPhase::Inserted,
            message: "Uploading log to the archive...".to_string(),
        });
        let upload = self
            .step_upload(ctx, payload)
            .instrument(info_span!("upload", record_id = %record_id))
            .await;
        let archive_key = match upload {
            Ok(key) => key,
            Err(cause) => {
                warn!(error = %cause, record_id = %record_id, "Upload stage failed, rolling back record");
                let rollback = self
                    .step_rollback(&record_id)
                    .instrument(info_span!("rollback", record_id = %record_id))
                    .await;
                progress.report(ProgressEvent::Failed {
                    error: cause.to_string(),
                });
                return Outcome::UploadFailed {
                    record_id,
                    cause,
                    rollback,
                };
            }
        };

        // Step 4: Delete source; remote writes stay regardless
        progress.report(ProgressEvent::Phase {
            phase: CommitPhase::Uploaded,
            message: "Deleting source log file...".to_string(),
        });
        let deleted = source
            .delete_source()
            .instrument(info_span!("delete_source"))
            .await;
        if let Err(error) = deleted {
            warn!(error = %error, archive_key = %archive_key, "Source log deletion failed, remote writes kept");
            progress.report(ProgressEvent::Failed {
                error: error.to_string(),
            });
            return Outcome::SourceDeleteFailed {
                record_id,
                archive_key,
                error,
            };
        }
        ctx.phase = CommitPhase::SourceDeleted;
        progress.report(ProgressEvent::Phase {
            phase: CommitPhase::SourceDeleted,
            message: "Source log file deleted".to_string(),
        });

        ctx.phase = CommitPhase::Done;
        progress.report(ProgressEvent::Completed {
            archive_key: archive_key.to_string(),
        });
        Outcome::Committed {
            record_id,
            archive_key,
        }
    }

    fn step_threshold(&self, ctx: &mut CommitContext) -> Result<(), Counter> {
        let quantity = ctx.metadata.quantity;
        if let Err(counter) = policy::check_threshold(&ctx.metrics, quantity) {
            info!(
                counter = %counter,
                programmed = ctx.metrics.programmed_count,
                verified = ctx.metrics.verified_count,
                "Condition not met"
            );
            return Err(counter);
        }

        if let Some(advisory) =
            policy::variance_advisory(&ctx.metrics, quantity, self.config.variance_margin)
        {
            warn!(advisory = %advisory, "Excessive variance");
            ctx.advisories.push(advisory);
        }

        ctx.phase = CommitPhase::ThresholdChecked;
        Ok(())
    }

    async fn step_insert(&self, ctx: &mut CommitContext) -> Result<RecordId, InsertError> {
        let record = CommitRecord::new(&ctx.metadata, &ctx.metrics);
        let id = self.records.insert(&record).await?;
        debug!(record_id = %id, "Record inserted and echo verified");

        ctx.phase = CommitPhase::Inserted;
        Ok(id)
    }

    async fn step_upload(
        &self,
        ctx: &mut CommitContext,
        payload: &[u8],
    ) -> Result<ArchiveKey, UploadError> {
        let date = self.clock.today();
        let mut probe = ArchiveProbe {
            archive: self.archive.as_ref(),
            warnings: &mut ctx.warnings,
        };
        let key = naming::next_key(
            date,
            &ctx.metadata.job_id,
            ctx.metadata.quantity,
            self.config.max_sequence,
            &mut probe,
        )
        .await?;
        debug!(key = %key, "Archive key chosen");

        self.archive
            .put(key.as_str(), payload)
            .await
            .map_err(UploadError::Put)?;

        // A put is only trusted once the object is visible
        match self.archive.exists(key.as_str()).await {
            Ok(true) => {}
            Ok(false) | Err(StoreError::NotFound(_)) => {
                return Err(UploadError::NotVerified {
                    key: key.into_string(),
                });
            }
            Err(e) => return Err(UploadError::Verify(e)),
        }

        info!(key = %key, bytes = payload.len(), "Log archived");
        ctx.phase = CommitPhase::Uploaded;
        Ok(key)
    }

    /// Issues the single compensating delete for this attempt.
    async fn step_rollback(&self, record_id: &RecordId) -> RollbackStatus {
        match self.records.delete_by_id(record_id).await {
            Ok(()) => {
                info!("Record rolled back");
                RollbackStatus::RolledBack
            }
            Err(source) => {
                error!(
                    record_id = %record_id,
                    error = %source,
                    "Rollback failed, record must be deleted manually"
                );
                RollbackStatus::Failed(RollbackError {
                    record_id: record_id.to_string(),
                    source,
                })
            }
        }
    }
}

/// Existence probe for the sequencer. Not-found and access-denied both
/// count as free; a denial is kept as a warning.
struct ArchiveProbe<'a> {
    archive: &'a dyn ArchiveStore,
    warnings: &'a mut Vec<PipelineWarning>,
}

#[async_trait]
impl<'a> KeyProbe for ArchiveProbe<'a> {
    async fn is_taken(&mut self, key: &ArchiveKey) -> Result<bool, StoreError> {
        match self.archive.exists(key.as_str()).await {
            Ok(taken) => Ok(taken),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(StoreError::AccessDenied { key, detail }) => {
                warn!(key = %key, detail = %detail, "Existence probe denied, assuming key is free");
                self.warnings
                    .push(PipelineWarning::ProbeAccessDenied { key, detail });
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
