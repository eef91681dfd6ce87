//! Size-reduction reports for operators.

use std::fmt;
use serde::Serialize;
use crate::core::FileOutcome;

const KB: f64 = 1024.0;
const MB: f64 = KB * 1024.0;

/// Percentage saved going from `original` to `processed` bytes.
///
/// Negative when re-encoding grew the file; never clamped. An empty original
/// reports 0.
pub fn reduction_percent(original: u64, processed: u64) -> f64 {
    if original == 0 {
        0.0
    } else {
        (1.0 - processed as f64 / original as f64) * 100.0
    }
}

/// Per-file size comparison, emitted once per transcoded image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompressionReport {
    pub filename: String,
    pub original_size: u64,
    pub processed_size: u64,
}

impl CompressionReport {
    pub fn new(filename: impl Into<String>, original_size: u64, processed_size: u64) -> Self {
        Self {
            filename: filename.into(),
            original_size,
            processed_size,
        }
    }

    pub fn reduction_percent(&self) -> f64 {
        reduction_percent(self.original_size, self.processed_size)
    }
}

impl fmt::Display for CompressionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.2} KB -> {:.2} KB ({:.2}% reduction)",
            self.filename,
            self.original_size as f64 / KB,
            self.processed_size as f64 / KB,
            self.reduction_percent()
        )
    }
}

/// Aggregate of one `preprocess_all` run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
    pub total_original_bytes: u64,
    pub total_processed_bytes: u64,
    /// `(filename, error)` for every file that failed
    pub failed: Vec<(String, String)>,
    /// Set when a shutdown signal stopped the batch early
    pub cancelled: bool,
}

impl BatchSummary {
    /// Single-writer reduction over the collected per-file outcomes.
    ///
    /// Failed files count towards neither byte total.
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a FileOutcome>) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            match outcome {
                FileOutcome::Processed(report) => {
                    summary.processed += 1;
                    summary.total_original_bytes += report.original_size;
                    summary.total_processed_bytes += report.processed_size;
                }
                FileOutcome::Skipped { original_size, processed_size, .. } => {
                    summary.skipped += 1;
                    summary.total_original_bytes += original_size;
                    summary.total_processed_bytes += processed_size;
                }
                FileOutcome::Failed { filename, error } => {
                    summary.failed.push((filename.clone(), error.clone()));
                }
            }
        }
        summary
    }

    pub fn reduction_percent(&self) -> f64 {
        reduction_percent(self.total_original_bytes, self.total_processed_bytes)
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total original size  : {:.2} MB", self.total_original_bytes as f64 / MB)?;
        writeln!(f, "Total processed size : {:.2} MB", self.total_processed_bytes as f64 / MB)?;
        writeln!(f, "Total reduction      : {:.2}%", self.reduction_percent())?;
        write!(
            f,
            "Files: {} processed, {} already done, {} failed",
            self.processed,
            self.skipped,
            self.failed_count()
        )?;
        if self.cancelled {
            write!(f, " (cancelled)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduction_is_relative_to_original() {
        let report = CompressionReport::new("a.jpg", 1000, 600);
        assert!((report.reduction_percent() - 40.0).abs() < 1e-9);
        assert!(report.to_string().ends_with("(40.00% reduction)"));
    }

    #[test]
    fn growth_reports_negative_reduction() {
        let report = CompressionReport::new("a.png", 1000, 1200);
        assert!((report.reduction_percent() + 20.0).abs() < 1e-9);
        assert!(report.to_string().contains("-20.00%"));
    }

    #[test]
    fn empty_original_does_not_divide_by_zero() {
        assert_eq!(reduction_percent(0, 10), 0.0);
    }

    #[test]
    fn summary_excludes_failures_from_totals() {
        let outcomes = vec![
            FileOutcome::Processed(CompressionReport::new("a.jpg", 1000, 500)),
            FileOutcome::Skipped {
                filename: "b.png".into(),
                original_size: 1000,
                processed_size: 700,
            },
            FileOutcome::Failed {
                filename: "c.jpg".into(),
                error: "Decode error: bad header".into(),
            },
        ];

        let summary = BatchSummary::from_outcomes(&outcomes);
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed_count(), 1);
        assert_eq!(summary.total_original_bytes, 2000);
        assert_eq!(summary.total_processed_bytes, 1200);
        assert!((summary.reduction_percent() - 40.0).abs() < 1e-9);
    }
}
