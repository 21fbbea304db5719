//! Probe report collection
//!
//! Captures what a probe run saw in the tag (frame identifiers, private
//! frame owners, the raw timestamp bytes) and saves it to JSON for later
//! inspection.
//!
//! This module is only available when the "diagnostics" feature is enabled.

use crate::error::{ProbeError, ProbeResult};
use crate::locator::private_frames;
use crate::probe::{owner_of, TimestampMatch};
use crate::tag::Tag;
use crate::types::DecodedTimestamp;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Summary of one private frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivFrameData {
    pub owner: String,
    pub size: usize,
}

/// The decoded Apple timestamp frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampData {
    /// Position among the tag's PRIV frames
    pub priv_index: usize,
    /// The 8 bytes after the owner and separator
    pub bytes: Vec<u8>,
    pub high_bit: u8,
    pub start_pts: DecodedTimestamp,
}

/// Everything recorded about one probed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeReport {
    pub file: String,
    pub format: String,
    pub revision: u8,
    /// Frame identifiers in tag order
    pub frame_ids: Vec<String>,
    pub priv_frames: Vec<PrivFrameData>,
    pub timestamp: Option<TimestampData>,
    pub collected_at: String,
}

impl ProbeReport {
    /// Build a report from a parsed tag and the probe outcome
    pub fn new(file: &Path, tag: &Tag, found: Option<&TimestampMatch>) -> Self {
        let priv_frames = private_frames(&tag.frames)
            .filter_map(Result::ok)
            .map(|payload| PrivFrameData {
                owner: owner_of(payload),
                size: payload.len(),
            })
            .collect();

        Self {
            file: file.display().to_string(),
            format: tag.format.to_string(),
            revision: tag.revision,
            frame_ids: tag.frames.iter().map(|(id, _)| id.to_string()).collect(),
            priv_frames,
            timestamp: found.map(|found| TimestampData {
                priv_index: found.priv_index,
                bytes: found.fields.bytes.to_vec(),
                high_bit: found.fields.high_bit(),
                start_pts: found.start_pts,
            }),
            collected_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Save the report as pretty-printed JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> ProbeResult<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ProbeError::Report(e.to_string()))?;
        let mut file = File::create(path.as_ref())?;
        file.write_all(json.as_bytes())?;
        log::info!("Probe report saved to: {}", path.as_ref().display());
        Ok(())
    }

    /// Load a report saved by [`ProbeReport::save_to_file`]
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ProbeResult<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| ProbeError::Report(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::find_timestamp;
    use crate::tag::TagFormat;
    use crate::types::{FrameMap, FrameValue, APPLE_OWNER};

    #[test]
    fn test_report_records_priv_frames() {
        let mut apple = APPLE_OWNER.to_vec();
        apple.push(0);
        apple.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 0]);
        let mut other = b"other\x00".to_vec();
        other.resize(50, 0x11);
        let frames: FrameMap = vec![
            ("TIT2", FrameValue::Text("x".into())),
            ("PRIV", FrameValue::Binary(other)),
            ("PRIV", FrameValue::Binary(apple)),
        ]
        .into_iter()
        .collect();
        let tag = Tag {
            format: TagFormat::Id3v24,
            revision: 0,
            frames,
        };
        let found = find_timestamp(&tag.frames).unwrap();

        let report = ProbeReport::new(Path::new("seg.aac"), &tag, found.as_ref());
        assert_eq!(report.format, "ID3v2.4");
        assert_eq!(report.frame_ids, vec!["TIT2", "PRIV", "PRIV"]);
        assert_eq!(report.priv_frames[0].owner, "other");
        assert_eq!(report.priv_frames[0].size, 50);
        assert_eq!(report.priv_frames[1].size, 53);
        let timestamp = report.timestamp.unwrap();
        assert_eq!(timestamp.priv_index, 1);
        assert_eq!(timestamp.high_bit, 1);
        assert_eq!(timestamp.start_pts, 1 << 31);
    }
}
