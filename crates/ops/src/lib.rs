#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! High-level operations orchestration for bubz2
//!
//! This crate sits between the CLI and the specialized crates: it loads the
//! ignore rules and the state file, walks the source tree, and hands stale
//! files to the compressor, reporting progress through events.

mod context;
mod sync;

pub use context::{OpsContextBuilder, OpsCtx};
pub use sync::{sync, SyncRequest};

pub use bubz2_types::{CompressedFile, FailedFile, SyncReport};

use bubz2_errors::Error;

/// Operation result that can be serialized for CLI output
#[derive(Clone, Debug, serde::Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OperationResult {
    /// Outcome of a sync run
    SyncReport(SyncReport),
}

impl OperationResult {
    /// Convert to JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the result cannot be serialized.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(Error::from)
    }

    /// Check if this is a success result
    #[must_use]
    pub fn is_success(&self) -> bool {
        match self {
            OperationResult::SyncReport(report) => report.is_success(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_operation_result_json_shape() {
        let result = OperationResult::SyncReport(SyncReport {
            scanned: 2,
            failed: vec![FailedFile {
                source: PathBuf::from("src/a.bsp"),
                error: "boom".to_string(),
            }],
            ..SyncReport::default()
        });

        let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "SyncReport");
        assert_eq!(json["data"]["scanned"], 2);
        assert_eq!(json["data"]["failed"][0]["error"], "boom");
        assert!(!result.is_success());
    }

    #[test]
    fn test_clean_report_is_success() {
        let result = OperationResult::SyncReport(SyncReport {
            scanned: 1,
            up_to_date: 1,
            ..SyncReport::default()
        });
        assert!(result.is_success());
    }
}
