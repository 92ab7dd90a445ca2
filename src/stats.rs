//! # Savings Accumulator Module
//!
//! Two counters mutated once per processed file and read only at the end of
//! the run: total original bytes seen and total bytes saved. Per-run counts
//! of accepted/rejected/skipped/errored files ride along for the summary.

use crate::files::format_size;
use crate::gatekeeper::Outcome;

/// Cumulative savings for one run
#[derive(Debug, Default)]
pub struct Savings {
    pub original_bytes: u64,
    pub saved_bytes: u64,
    pub files_processed: usize,
    pub files_accepted: usize,
    pub files_rejected: usize,
    pub files_skipped: usize,
    pub errors: usize,
}

impl Savings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one gatekeeper decision
    pub fn record(&mut self, outcome: &Outcome) {
        self.files_processed += 1;
        self.original_bytes += outcome.original();
        self.saved_bytes += outcome.saved();
        match outcome {
            Outcome::Accepted { .. } => self.files_accepted += 1,
            Outcome::Rejected { .. } => self.files_rejected += 1,
            Outcome::Skipped { .. } => self.files_skipped += 1,
        }
    }

    /// Record a per-file failure (file was skipped, batch continued)
    pub fn record_error(&mut self) {
        self.files_processed += 1;
        self.errors += 1;
    }

    /// Saved bytes as a percentage of the original total
    pub fn saved_percent(&self) -> f64 {
        if self.original_bytes > 0 {
            (self.saved_bytes as f64 / self.original_bytes as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} files | Accepted: {} | Rejected: {} | Skipped: {} | Errors: {} | Saved: {} ({:.2}%)",
            self.files_processed,
            self.files_accepted,
            self.files_rejected,
            self.files_skipped,
            self.errors,
            format_size(self.saved_bytes),
            self.saved_percent()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_outcomes() {
        let mut savings = Savings::new();
        savings.record(&Outcome::Accepted {
            original: 1000,
            compressed: 820,
        });
        savings.record(&Outcome::Rejected { original: 500 });
        savings.record(&Outcome::Skipped { original: 300 });
        savings.record_error();

        assert_eq!(savings.original_bytes, 1800);
        assert_eq!(savings.saved_bytes, 180);
        assert_eq!(savings.files_processed, 4);
        assert_eq!(savings.files_accepted, 1);
        assert_eq!(savings.files_rejected, 1);
        assert_eq!(savings.files_skipped, 1);
        assert_eq!(savings.errors, 1);
    }

    #[test]
    fn test_saved_percent() {
        let mut savings = Savings::new();
        assert_eq!(savings.saved_percent(), 0.0);

        savings.record(&Outcome::Accepted {
            original: 1000,
            compressed: 750,
        });
        assert!((savings.saved_percent() - 25.0).abs() < f64::EPSILON);
    }
}
