//! Storage and filesystem-related error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("invalid path: {path}")]
    InvalidPath { path: String },

    #[error("atomic rename of {from} to {to} failed: {message}")]
    AtomicRenameFailed {
        from: String,
        to: String,
        message: String,
    },

    #[error("directory walk failed: {message}")]
    WalkFailed { message: String },

    #[error("cannot read {path}: {message}")]
    UnreadableEntry { path: String, message: String },
}

impl UserFacingError for StorageError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::WalkFailed { .. } => Some("Check for symlink loops under the source directory."),
            Self::UnreadableEntry { .. } => {
                Some("Fix or remove the broken entry; it is retried on the next run.")
            }
            Self::AtomicRenameFailed { .. } => {
                Some("Make sure nothing else occupies the destination path.")
            }
            Self::InvalidPath { .. } => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::AtomicRenameFailed { .. } | Self::UnreadableEntry { .. }
        )
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::InvalidPath { .. } => "storage.invalid_path",
            Self::AtomicRenameFailed { .. } => "storage.atomic_rename_failed",
            Self::WalkFailed { .. } => "storage.walk_failed",
            Self::UnreadableEntry { .. } => "storage.unreadable_entry",
        };
        Some(code)
    }
}
