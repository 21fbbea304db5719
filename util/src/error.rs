//! Error types for utility functions
//!
//! This module defines error types used by the fixture builders.

use std::fmt;

/// Error type for utility operations
#[derive(Debug)]
pub enum UtilError {
    /// I/O operation failed
    IoError(std::io::Error),
    /// Frame identifier has the wrong length for the tag version
    InvalidFrameId { id: String, version: u8 },
    /// Only ID3v2.2, 2.3 and 2.4 can be built
    UnsupportedVersion(u8),
    /// Tag or frame body does not fit in a 28-bit synchsafe size
    TooLarge(usize),
}

impl fmt::Display for UtilError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UtilError::IoError(err) => write!(f, "I/O error: {}", err),
            UtilError::InvalidFrameId { id, version } => {
                write!(f, "Invalid frame id {:?} for ID3v2.{}", id, version)
            }
            UtilError::UnsupportedVersion(version) => {
                write!(f, "Unsupported ID3v2 version 2.{}", version)
            }
            UtilError::TooLarge(size) => write!(f, "{} bytes exceed the synchsafe limit", size),
        }
    }
}

impl std::error::Error for UtilError {}

impl From<std::io::Error> for UtilError {
    fn from(err: std::io::Error) -> Self {
        UtilError::IoError(err)
    }
}

/// Result type for utility operations
pub type UtilResult<T> = std::result::Result<T, UtilError>;
