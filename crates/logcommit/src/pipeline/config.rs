use crate::config::Config;
use crate::naming::DEFAULT_MAX_SEQUENCE;

use super::policy::DEFAULT_VARIANCE_MARGIN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Highest numeric suffix the naming sequencer tries before giving up.
    pub max_sequence: u32,
    /// Both counters above `quantity + variance_margin` raise an advisory.
    pub variance_margin: u64,
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_sequence: config.commit.max_sequence,
            variance_margin: config.commit.variance_margin,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_sequence: DEFAULT_MAX_SEQUENCE,
            variance_margin: DEFAULT_VARIANCE_MARGIN,
        }
    }
}
