//! Threshold policy and the excessive-variance advisory.

use std::fmt;

use crate::metrics::LogMetrics;

pub const DEFAULT_VARIANCE_MARGIN: u64 = 10;

/// The counter that failed the threshold check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Programmed,
    Verified,
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Counter::Programmed => f.write_str("programmed"),
            Counter::Verified => f.write_str("verified"),
        }
    }
}

/// Commit proceeds only when both counters reach the job quantity.
/// Programmed is checked first.
pub fn check_threshold(metrics: &LogMetrics, quantity: u64) -> Result<(), Counter> {
    if metrics.programmed_count < quantity {
        return Err(Counter::Programmed);
    }
    if metrics.verified_count < quantity {
        return Err(Counter::Verified);
    }
    Ok(())
}

/// Non-blocking diagnostic attached to the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    ExcessiveVariance {
        programmed: u64,
        verified: u64,
        quantity: u64,
        margin: u64,
    },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::ExcessiveVariance {
                programmed,
                verified,
                quantity,
                margin,
            } => write!(
                f,
                "Variance over {}: programmed {} and verified {} against a job quantity of {}",
                margin, programmed, verified, quantity
            ),
        }
    }
}

pub fn variance_advisory(metrics: &LogMetrics, quantity: u64, margin: u64) -> Option<Advisory> {
    let limit = quantity.saturating_add(margin);
    if metrics.programmed_count > limit && metrics.verified_count > limit {
        Some(Advisory::ExcessiveVariance {
            programmed: metrics.programmed_count,
            verified: metrics.verified_count,
            quantity,
            margin,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_met_at_equality() {
        assert_eq!(check_threshold(&LogMetrics::new(5, 5), 5), Ok(()));
    }

    #[test]
    fn test_programmed_checked_first() {
        assert_eq!(
            check_threshold(&LogMetrics::new(4, 10), 5),
            Err(Counter::Programmed)
        );
        assert_eq!(
            check_threshold(&LogMetrics::new(4, 4), 5),
            Err(Counter::Programmed)
        );
    }

    #[test]
    fn test_verified_below_quantity() {
        assert_eq!(
            check_threshold(&LogMetrics::new(10, 4), 5),
            Err(Counter::Verified)
        );
    }

    #[test]
    fn test_zero_quantity_always_passes() {
        assert_eq!(check_threshold(&LogMetrics::default(), 0), Ok(()));
    }

    #[test]
    fn test_threshold_exhaustive_small_grid() {
        for programmed in 0..8 {
            for verified in 0..8 {
                for quantity in 0..8 {
                    let proceeds = check_threshold(&LogMetrics::new(programmed, verified), quantity)
                        .is_ok();
                    assert_eq!(proceeds, programmed >= quantity && verified >= quantity);
                }
            }
        }
    }

    #[test]
    fn test_variance_requires_both_counters_over_margin() {
        assert!(variance_advisory(&LogMetrics::new(21, 21), 10, 10).is_some());
        assert!(variance_advisory(&LogMetrics::new(20, 21), 10, 10).is_none());
        assert!(variance_advisory(&LogMetrics::new(21, 20), 10, 10).is_none());
        assert!(variance_advisory(&LogMetrics::new(12, 11), 10, 10).is_none());
    }

    #[test]
    fn test_variance_limit_saturates() {
        assert!(variance_advisory(&LogMetrics::new(u64::MAX, u64::MAX), u64::MAX, 10).is_none());
    }
}
