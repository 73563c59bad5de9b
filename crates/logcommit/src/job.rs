//! Job metadata, the durable commit record, and form-input validation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::metrics::LogMetrics;

pub const JOB_MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Validated job metadata. The pipeline trusts these fields as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobMetadata {
    pub job_id: String,
    pub quantity: u64,
    pub device: String,
}

impl JobMetadata {
    pub fn new(job_id: impl Into<String>, quantity: u64, device: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            quantity,
            device: device.into(),
        }
    }

    /// Builds metadata from raw form fields: month, job number, quantity, device.
    ///
    /// The job id is `"<MONTH> <number>"`, e.g. `"JAN 1"`.
    pub fn from_form(
        month: &str,
        job_number: &str,
        quantity: &str,
        device: &str,
    ) -> Result<Self, ValidationError> {
        let month_upper = month.trim().to_ascii_uppercase();
        if !JOB_MONTHS.contains(&month_upper.as_str()) {
            return Err(ValidationError::InvalidMonth(month.to_string()));
        }

        let job_number = job_number.trim();
        if !is_ascii_number(job_number) {
            return Err(ValidationError::InvalidJobNumber(job_number.to_string()));
        }

        let quantity_str = quantity.trim();
        if !is_ascii_number(quantity_str) {
            return Err(ValidationError::InvalidQuantity(quantity_str.to_string()));
        }
        let quantity = quantity_str
            .parse::<u64>()
            .map_err(|_| ValidationError::InvalidQuantity(quantity_str.to_string()))?;

        // Device is free text and may be blank
        Ok(Self {
            job_id: format!("{} {}", month_upper, job_number),
            quantity,
            device: device.trim().to_string(),
        })
    }
}

fn is_ascii_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Store-assigned identifier of an inserted record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

/// The row submitted to the record store. Field names match the table columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    #[serde(rename = "job_order")]
    pub job_id: String,
    #[serde(rename = "job_quantity")]
    pub quantity: u64,
    #[serde(rename = "programmed")]
    pub programmed_count: u64,
    #[serde(rename = "verified")]
    pub verified_count: u64,
    pub device: String,
}

impl CommitRecord {
    pub fn new(metadata: &JobMetadata, metrics: &LogMetrics) -> Self {
        Self {
            job_id: metadata.job_id.clone(),
            quantity: metadata.quantity,
            programmed_count: metrics.programmed_count,
            verified_count: metrics.verified_count,
            device: metadata.device.clone(),
        }
    }
}
