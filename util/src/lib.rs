//! Test fixture utilities for the PTS probe
//!
//! This crate builds synthetic ID3v2 tags and HLS-style audio segments
//! used by the probe's integration tests and benchmarks.

pub mod error;
pub mod tag_builder;

// Re-export commonly used functions and types
pub use error::*;
pub use tag_builder::*;
