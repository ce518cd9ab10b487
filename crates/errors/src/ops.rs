//! Operation orchestration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum OpsError {
    #[error("source directory not found: {path}")]
    SourceNotFound { path: String },

    #[error("source is not a directory: {path}")]
    SourceNotDirectory { path: String },

    #[error("{failed} of {total} files failed to compress")]
    PartialFailure { failed: usize, total: usize },

    #[error("component not found: {component}")]
    MissingComponent { component: String },

    #[error("task join error: {message}")]
    TaskJoinFailed { message: String },
}

impl UserFacingError for OpsError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::SourceNotFound { .. } | Self::SourceNotDirectory { .. } => {
                Some("Pass an existing directory with --from.")
            }
            Self::PartialFailure { .. } => {
                Some("Failed files were not recorded and will be retried on the next run.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::SourceNotFound { .. } => "ops.source_not_found",
            Self::SourceNotDirectory { .. } => "ops.source_not_directory",
            Self::PartialFailure { .. } => "ops.partial_failure",
            Self::MissingComponent { .. } => "ops.missing_component",
            Self::TaskJoinFailed { .. } => "ops.task_join_failed",
        };
        Some(code)
    }
}
