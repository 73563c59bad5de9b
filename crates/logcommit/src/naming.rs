//! Collision-free archive key selection.
//!
//! Keys look like `logs/<YYYY-MM-DD>-<jobId>-<quantity>[-<sequence>].txt`.
//! Downstream tooling indexes archived logs by this exact layout.

use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::error::StoreError;

pub const KEY_PREFIX: &str = "logs/";
pub const KEY_EXTENSION: &str = "txt";
pub const DEFAULT_MAX_SEQUENCE: u32 = 5000;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArchiveKey(String);

impl ArchiveKey {
    /// Formats the key for a date/job/quantity triple. `None` is the unsequenced base key.
    pub fn format(date: NaiveDate, job_id: &str, quantity: u64, sequence: Option<u32>) -> Self {
        let date = date.format("%Y-%m-%d");
        let key = match sequence {
            Some(seq) => format!(
                "{}{}-{}-{}-{}.{}",
                KEY_PREFIX, date, job_id, quantity, seq, KEY_EXTENSION
            ),
            None => format!(
                "{}{}-{}-{}.{}",
                KEY_PREFIX, date, job_id, quantity, KEY_EXTENSION
            ),
        };
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ArchiveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    #[error("No free archive key after {attempts} probes")]
    Exhausted { attempts: u32 },

    #[error("Existence probe failed: {0}")]
    Probe(#[from] StoreError),
}

/// Answers "is this key already used?" for the sequencer.
#[async_trait]
pub trait KeyProbe: Send {
    async fn is_taken(&mut self, key: &ArchiveKey) -> Result<bool, StoreError>;
}

/// Returns the first unused key, starting from the unsequenced base key and
/// then trying `-1`, `-2`, ... up to `max_sequence`.
///
/// The probe is called exactly `sequence + 1` times for a key found at `sequence`.
pub async fn next_key<P>(
    date: NaiveDate,
    job_id: &str,
    quantity: u64,
    max_sequence: u32,
    probe: &mut P,
) -> Result<ArchiveKey, SequenceError>
where
    P: KeyProbe + ?Sized,
{
    let base = ArchiveKey::format(date, job_id, quantity, None);
    if !probe.is_taken(&base).await? {
        return Ok(base);
    }

    for sequence in 1..=max_sequence {
        let candidate = ArchiveKey::format(date, job_id, quantity, Some(sequence));
        if !probe.is_taken(&candidate).await? {
            return Ok(candidate);
        }
    }

    Err(SequenceError::Exhausted {
        attempts: max_sequence.saturating_add(1),
    })
}
