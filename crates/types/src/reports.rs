//! Report type definitions for operations

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of one sync run
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SyncReport {
    /// Regular files found under the source directory, ignored ones excluded
    pub scanned: usize,
    /// Paths skipped because an ignore pattern matched
    pub ignored: usize,
    /// Files whose compressed copy was already current
    pub up_to_date: usize,
    /// Files compressed during this run (or that would be, in a dry run)
    pub compressed: Vec<CompressedFile>,
    /// Files that failed to compress
    pub failed: Vec<FailedFile>,
    /// Whether the run only planned work
    pub dry_run: bool,
    /// Total execution time
    pub duration_ms: u64,
}

impl SyncReport {
    /// Whether every stale file was compressed
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Bytes read from source files
    #[must_use]
    pub fn bytes_in(&self) -> u64 {
        self.compressed.iter().map(|f| f.bytes_in).sum()
    }

    /// Bytes written to destination files
    #[must_use]
    pub fn bytes_out(&self) -> u64 {
        self.compressed.iter().map(|f| f.bytes_out).sum()
    }
}

/// A file written to the destination directory
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressedFile {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

/// A file that could not be compressed
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FailedFile {
    pub source: PathBuf,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_totals() {
        let report = SyncReport {
            compressed: vec![
                CompressedFile {
                    source: "a.bsp".into(),
                    destination: "out/a.bsp.bz2".into(),
                    bytes_in: 100,
                    bytes_out: 40,
                },
                CompressedFile {
                    source: "b.wav".into(),
                    destination: "out/b.wav.bz2".into(),
                    bytes_in: 50,
                    bytes_out: 45,
                },
            ],
            ..SyncReport::default()
        };
        assert_eq!(report.bytes_in(), 150);
        assert_eq!(report.bytes_out(), 85);
        assert!(report.is_success());
    }
}
