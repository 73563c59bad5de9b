//! Keyword counters extracted from a programming log.

use serde::Serialize;

pub const PROGRAMMED_TOKEN: &str = "programmed";
pub const VERIFIED_TOKEN: &str = "passed verification";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LogMetrics {
    pub programmed_count: u64,
    pub verified_count: u64,
}

impl LogMetrics {
    pub fn new(programmed_count: u64, verified_count: u64) -> Self {
        Self {
            programmed_count,
            verified_count,
        }
    }

    /// Counts non-overlapping, case-insensitive occurrences of both tokens.
    pub fn count(text: &str) -> Self {
        let lowered = text.to_lowercase();
        Self {
            programmed_count: lowered.matches(PROGRAMMED_TOKEN).count() as u64,
            verified_count: lowered.matches(VERIFIED_TOKEN).count() as u64,
        }
    }

    /// Lossy variant for raw log bytes that may not be valid UTF-8.
    pub fn count_bytes(bytes: &[u8]) -> Self {
        Self::count(&String::from_utf8_lossy(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text() {
        assert_eq!(LogMetrics::count(""), LogMetrics::new(0, 0));
    }

    #[test]
    fn test_counts_are_case_insensitive() {
        let text = "Card 1 PROGRAMMED\nCard 2 programmed\nCard 2 Passed Verification\n";
        assert_eq!(LogMetrics::count(text), LogMetrics::new(2, 1));
    }

    #[test]
    fn test_counts_occurrences_not_lines() {
        let text = "programmed programmed passed verification, passed verification";
        assert_eq!(LogMetrics::count(text), LogMetrics::new(2, 2));
    }

    #[test]
    fn test_absent_tokens_count_zero() {
        let text = "Card inserted\nCard failed\n";
        assert_eq!(LogMetrics::count(text), LogMetrics::new(0, 0));
    }

    #[test]
    fn test_token_embedded_in_other_words() {
        // "reprogrammed" still contains the literal token
        assert_eq!(LogMetrics::count("reprogrammed").programmed_count, 1);
        assert_eq!(LogMetrics::count("programme").programmed_count, 0);
    }

    #[test]
    fn test_counting_is_idempotent() {
        let text = "Programmed\nPassed Verification\nProgrammed\n";
        assert_eq!(LogMetrics::count(text), LogMetrics::count(text));
    }

    #[test]
    fn test_count_bytes_tolerates_invalid_utf8() {
        let mut bytes = b"Programmed ".to_vec();
        bytes.push(0xff);
        bytes.extend_from_slice(b" passed verification");
        assert_eq!(LogMetrics::count_bytes(&bytes), LogMetrics::new(1, 1));
    }
}
