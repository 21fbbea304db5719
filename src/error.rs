//! Error types for the PTS probe
//!
//! This module defines all error types used throughout the probe,
//! split by the stage that produces them: tag reading, frame decoding
//! and command line configuration.

use thiserror::Error;

/// Main error type for a probe run
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Command line configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// ID3v2 tag reading errors
    #[error("Tag error: {0}")]
    Tag(#[from] TagError),

    /// Private frame decoding errors
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    /// Underlying I/O failures while opening or reading the input
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Diagnostics report could not be serialized
    #[error("Report error: {0}")]
    Report(String),
}

/// Part of a private frame payload that was found to be short
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSection {
    /// The fixed-width owner identifier
    Owner,
    /// The timestamp bytes following the owner and its separator
    Timestamp,
}

impl std::fmt::Display for PayloadSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadSection::Owner => write!(f, "owner identifier"),
            PayloadSection::Timestamp => write!(f, "timestamp"),
        }
    }
}

/// Private frame location and decoding errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Payload too short to hold the requested section
    #[error("Malformed frame: {section} needs {expected} bytes, only {actual} available")]
    MalformedFrame {
        section: PayloadSection,
        expected: usize,
        actual: usize,
    },

    /// The frame exists but is not exposed as raw bytes
    #[error("Frame {frame_id} holds {found} data, expected raw bytes")]
    TypeMismatch { frame_id: String, found: &'static str },
}

/// ID3v2 tag reading errors
#[derive(Debug, Error)]
pub enum TagError {
    /// Input does not start with an ID3v2 header
    #[error("No ID3v2 tag found")]
    NoTagFound,

    /// Input is a known container this probe does not read
    #[error("Unsupported container format: {0}")]
    UnsupportedFormat(String),

    /// ID3v2 major version outside 2..=4
    #[error("Unsupported ID3v2 version 2.{major}.{revision}")]
    UnsupportedVersion { major: u8, revision: u8 },

    /// A synchsafe integer had its high bit set
    #[error("Invalid synchsafe integer at offset {offset}")]
    InvalidSynchsafe { offset: usize },

    /// Input ended before the declared tag size
    #[error("Truncated tag: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// A frame's declared size runs past the end of the tag
    #[error("Frame {frame_id} at offset {offset} declares {size} bytes, only {available} remain")]
    FrameOverrun {
        frame_id: String,
        offset: usize,
        size: usize,
        available: usize,
    },

    /// I/O error while reading the tag
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Command line configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No input file was given
    #[error("Missing required option -filename")]
    MissingFilename,

    /// An option that takes a value was last on the command line
    #[error("Option {0} requires a value")]
    MissingValue(String),

    /// Unrecognised option
    #[error("Unknown option: {0}")]
    UnknownOption(String),

    /// Input file does not exist
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// `-h` was given; the caller prints usage
    #[error("Help requested")]
    HelpRequested,
}

/// Specialized result types for different modules
pub type FrameResult<T> = std::result::Result<T, FrameError>;
pub type TagResult<T> = std::result::Result<T, TagError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
pub type ProbeResult<T> = std::result::Result<T, ProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_frame_message() {
        let err = FrameError::MalformedFrame {
            section: PayloadSection::Timestamp,
            expected: 8,
            actual: 7,
        };
        assert_eq!(
            err.to_string(),
            "Malformed frame: timestamp needs 8 bytes, only 7 available"
        );
    }

    #[test]
    fn test_frame_error_converts_to_probe_error() {
        let err: ProbeError = FrameError::TypeMismatch {
            frame_id: "PRIV".to_string(),
            found: "text",
        }
        .into();
        assert!(matches!(err, ProbeError::Frame(FrameError::TypeMismatch { .. })));
        assert_eq!(
            err.to_string(),
            "Frame error: Frame PRIV holds text data, expected raw bytes"
        );
    }
}
