//! Compression error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CompressionError {
    #[error("invalid compression level '{value}': expected none, fast, best, or 0-9")]
    InvalidLevel { value: String },

    #[error("failed to compress {source_path} into {destination}: {message}")]
    EncodeFailed {
        source_path: String,
        destination: String,
        message: String,
    },
}

impl UserFacingError for CompressionError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::EncodeFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::InvalidLevel { .. } => "compression.invalid_level",
            Self::EncodeFailed { .. } => "compression.encode_failed",
        };
        Some(code)
    }
}
