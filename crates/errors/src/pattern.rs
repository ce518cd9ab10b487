//! Ignore-file error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum PatternError {
    #[error("failed to read ignore file {path}: {message}")]
    ReadFailed { path: String, message: String },
}

impl UserFacingError for PatternError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        Some("Ignore files must be UTF-8 text with one pattern per line.")
    }

    fn user_code(&self) -> Option<&'static str> {
        Some("pattern.read_failed")
    }
}
