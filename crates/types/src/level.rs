//! bzip2 compression levels

use bubz2_errors::CompressionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Compression level for the bzip2 encoder
///
/// bzip2 levels select the block size (100k to 900k). There is no stored
/// mode, so `None` and `Custom(0)` encode with the smallest block size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CompressionLevel {
    /// Least effort the encoder supports
    None,
    /// Optimized for encoding speed
    Fast,
    /// Optimized for output size
    #[default]
    Best,
    /// Numeric level, 0 through 9
    Custom(u8),
}

impl CompressionLevel {
    /// Block size setting handed to the encoder, always in `1..=9`
    #[must_use]
    pub fn bzip2_level(self) -> u32 {
        match self {
            Self::None | Self::Fast => 1,
            Self::Best => 9,
            Self::Custom(level) => u32::from(level).clamp(1, 9),
        }
    }

    /// Parse a level as accepted by `--level`
    ///
    /// # Errors
    ///
    /// Returns an error unless `s` is `none`, `fast`, `best` or a digit.
    pub fn parse(s: &str) -> Result<Self, CompressionError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "fast" => Ok(Self::Fast),
            "best" => Ok(Self::Best),
            other => match other.parse::<u8>() {
                Ok(level) if level <= 9 => Ok(Self::Custom(level)),
                _ => Err(CompressionError::InvalidLevel {
                    value: s.to_string(),
                }),
            },
        }
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Fast => write!(f, "fast"),
            Self::Best => write!(f, "best"),
            Self::Custom(level) => write!(f, "{level}"),
        }
    }
}

impl FromStr for CompressionLevel {
    type Err = CompressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CompressionLevel {
    type Error = CompressionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CompressionLevel> for String {
    fn from(level: CompressionLevel) -> Self {
        level.to_string()
    }
}
