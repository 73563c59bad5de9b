//! Renders a `CommitReport` into the message shown to the operator.

use crate::pipeline::{CommitReport, Counter, Outcome, RollbackStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub title: &'static str,
    pub body: String,
    pub severity: Severity,
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.title)?;
        write!(f, "{}", self.body)
    }
}

/// Process exit status for an outcome: 0 only for a full commit, 2 for the
/// partial success, 1 for everything else.
pub fn exit_code(outcome: &Outcome) -> u8 {
    match outcome {
        Outcome::Committed { .. } => 0,
        Outcome::SourceDeleteFailed { .. } => 2,
        _ => 1,
    }
}

pub fn render(report: &CommitReport) -> Message {
    let mut lines = Vec::new();

    let (title, severity) = match &report.outcome {
        Outcome::BelowThreshold { counter } => {
            let line = match counter {
                Counter::Programmed => {
                    "Condition not met: Programmed count is less than job quantity."
                }
                Counter::Verified => "Condition not met: Verified count is less than job quantity.",
            };
            lines.push(line.to_string());
            ("Condition Not Met", Severity::Warning)
        }
        Outcome::InsertFailed { error } => {
            lines.push(format!("Failed to post data to the database: {}", error));
            if error.is_integrity_violation() {
                lines.push(
                    "The database did not store the submitted values. Nothing was archived."
                        .to_string(),
                );
            }
            ("Error", Severity::Error)
        }
        Outcome::UploadFailed {
            record_id,
            cause,
            rollback,
        } => {
            lines.push(format!("Failed to archive the log file: {}", cause));
            if let Some(guidance) = cause.store_error().and_then(|e| e.guidance()) {
                lines.push(guidance);
            }
            match rollback {
                RollbackStatus::RolledBack => {
                    lines.push("The database record was rolled back.".to_string());
                }
                RollbackStatus::Failed(err) => lines.push(format!(
                    "ROLLBACK FAILED: database record {} still exists and must be deleted manually ({}).",
                    record_id, err.source
                )),
            }
            ("Error", Severity::Error)
        }
        Outcome::SourceDeleteFailed {
            record_id,
            archive_key,
            error,
        } => {
            lines.push(format!(
                "Data successfully posted to the database (record {}).",
                record_id
            ));
            lines.push(format!("Log archived as {}.", archive_key));
            lines.push(format!(
                "The log file could not be deleted: {}. Remove it manually.",
                error
            ));
            ("Partial Success", Severity::Warning)
        }
        Outcome::Committed {
            record_id,
            archive_key,
        } => {
            lines.push(format!(
                "Data successfully posted to the database (record {}).",
                record_id
            ));
            lines.push(format!("Log archived as {}.", archive_key));
            lines.push("The log file has been deleted successfully.".to_string());
            ("Success", Severity::Success)
        }
    };

    lines.extend(
        report
            .advisories
            .iter()
            .map(|advisory| format!("Advisory: {}", advisory)),
    );
    lines.extend(
        report
            .warnings
            .iter()
            .map(|warning| format!("Warning: {}", warning)),
    );

    let mut body = format!(
        "Job: {}\nJob Quantity: {}\nProgrammed: {}\nVerified: {}\n\n",
        report.metadata.job_id,
        report.metadata.quantity,
        report.metrics.programmed_count,
        report.metrics.verified_count,
    );
    for line in lines {
        body.push_str(&line);
        body.push('\n');
    }

    Message {
        title,
        body,
        severity,
    }
}
