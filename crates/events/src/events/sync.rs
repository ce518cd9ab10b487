use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::FailureContext;

/// Events emitted while mirroring a source directory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SyncEvent {
    /// Walking the source directory began
    ScanStarted {
        source: PathBuf,
        destination: PathBuf,
    },

    /// A path matched the ignore rules and was skipped
    FileIgnored { path: PathBuf },

    /// The compressed copy of a file is current
    FileUpToDate { path: PathBuf },

    /// Scanning finished and stale files are about to be compressed
    CompressionQueued {
        files: usize,
        jobs: usize,
        dry_run: bool,
    },

    /// A file was compressed into the destination directory
    FileCompressed {
        source: PathBuf,
        destination: PathBuf,
        bytes_in: u64,
        bytes_out: u64,
    },

    /// A file could not be compressed
    CompressionFailed {
        source: PathBuf,
        failure: FailureContext,
    },

    /// The state file was written
    StateSaved {
        path: PathBuf,
        records: usize,
        pruned: usize,
    },

    /// The run finished
    Completed {
        compressed: usize,
        failed: usize,
        up_to_date: usize,
        ignored: usize,
        duration_ms: u64,
    },
}
