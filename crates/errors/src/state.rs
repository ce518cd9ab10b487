//! State file error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StateError {
    #[error("{path}:{line}: {message}")]
    MalformedRecord {
        path: String,
        line: usize,
        message: String,
    },

    #[error("failed to read state file {path}: {message}")]
    ReadFailed { path: String, message: String },

    #[error("failed to write state file {path}: {message}")]
    WriteFailed { path: String, message: String },
}

impl UserFacingError for StateError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::MalformedRecord { .. } => Some(
                "Delete the state file to recompress everything, or fix the line noted above.",
            ),
            Self::ReadFailed { .. } | Self::WriteFailed { .. } => {
                Some("Check that the state file location is readable and writable.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::MalformedRecord { .. } => "state.malformed_record",
            Self::ReadFailed { .. } => "state.read_failed",
            Self::WriteFailed { .. } => "state.write_failed",
        };
        Some(code)
    }
}
