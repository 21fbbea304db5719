//! # PTS Probe
//!
//! Reads the start presentation timestamp that HLS packagers store in an
//! ID3v2 `PRIV` frame owned by `com.apple.streaming.transportStreamTimestamp`
//! at the head of packed audio segments.
//!

pub mod config;
pub mod decoder;
pub mod error;
pub mod locator;
pub mod probe;
pub mod tag;
pub mod types;

#[cfg(feature = "diagnostics")]
pub mod diagnostics;

#[cfg(test)]
mod tests;

pub use config::ProbeConfig;
pub use decoder::{decode, TimestampFields};
pub use error::{
    ConfigError, FrameError, FrameResult, PayloadSection, ProbeError, ProbeResult, TagError,
};
pub use locator::{locate, private_frames};
pub use probe::{find_timestamp, probe_file, probe_frames, probe_reader, TimestampMatch};
pub use tag::{detect_format, read_frames, Tag, TagFormat};
pub use types::{DecodedTimestamp, FrameMap, FrameValue, StartPts, APPLE_OWNER};

#[cfg(feature = "diagnostics")]
pub use diagnostics::ProbeReport;
