//! Start timestamp probe
//!
//! Ties the tag reader, the PRIV frame lookup and the timestamp decoder
//! together. Unrelated private frames are skipped whatever their size;
//! the first Apple timestamp frame in tag order wins.

use crate::decoder::{owner_matches, TimestampFields};
use crate::error::{FrameResult, ProbeResult};
use crate::locator::private_frames;
use crate::tag::{read_frames, Tag};
use crate::types::{DecodedTimestamp, FrameMap, APPLE_OWNER, OWNER_LEN};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// The Apple timestamp frame found in a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampMatch {
    /// Position among the tag's PRIV frames
    pub priv_index: usize,
    pub fields: TimestampFields,
    pub start_pts: DecodedTimestamp,
}

/// Find and decode the Apple timestamp frame
///
/// A PRIV payload is only an error when it could still be the Apple frame:
/// its leading bytes agree with the owner but the payload ends early.
pub fn find_timestamp(frames: &FrameMap) -> FrameResult<Option<TimestampMatch>> {
    for (priv_index, payload) in private_frames(frames).enumerate() {
        let payload = payload?;
        let window = &payload[..payload.len().min(OWNER_LEN)];
        if !APPLE_OWNER.starts_with(window) || !owner_matches(payload)? {
            log::debug!("Skipping PRIV frame owned by {:?}", owner_of(payload));
            continue;
        }

        let fields = TimestampFields::parse(payload)?;
        let start_pts = fields.reconstruct();
        log::info!("Found apple PRIV tag");
        log::info!("Bytes found: {:?}", fields.bytes);
        log::info!("Uppermost bit: {}", fields.high_bit());
        return Ok(Some(TimestampMatch {
            priv_index,
            fields,
            start_pts,
        }));
    }
    Ok(None)
}

/// Decoded start timestamp of a frame set, if it carries one
pub fn probe_frames(frames: &FrameMap) -> FrameResult<Option<DecodedTimestamp>> {
    Ok(find_timestamp(frames)?.map(|found| found.start_pts))
}

/// Read the ID3v2 tag of a file
pub fn read_tag_file<P: AsRef<Path>>(path: P) -> ProbeResult<Tag> {
    let path = path.as_ref();
    log::info!("Trying to open {}", path.display());
    let mut reader = BufReader::new(File::open(path)?);
    let tag = read_frames(&mut reader)?;
    log::info!("Detected format: {}", tag.format);
    Ok(tag)
}

/// Probe a stream positioned at its ID3v2 tag
pub fn probe_reader<R: Read>(reader: &mut R) -> ProbeResult<Option<DecodedTimestamp>> {
    let tag = read_frames(reader)?;
    log::info!("Detected format: {}", tag.format);
    Ok(probe_frames(&tag.frames)?)
}

/// Probe a file for its start timestamp
pub fn probe_file<P: AsRef<Path>>(path: P) -> ProbeResult<Option<DecodedTimestamp>> {
    let tag = read_tag_file(path)?;
    Ok(probe_frames(&tag.frames)?)
}

/// Owner string of a PRIV payload, up to its NUL terminator
pub fn owner_of(payload: &[u8]) -> String {
    let owner = payload.split(|&b| b == 0).next().unwrap_or_default();
    String::from_utf8_lossy(owner).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FrameError, PayloadSection};
    use crate::types::{FrameValue, APPLE_OWNER};

    fn apple_priv(timestamp: [u8; 8]) -> FrameValue {
        let mut payload = APPLE_OWNER.to_vec();
        payload.push(0);
        payload.extend_from_slice(&timestamp);
        FrameValue::Binary(payload)
    }

    fn foreign_priv(owner: &str) -> FrameValue {
        let mut payload = owner.as_bytes().to_vec();
        payload.push(0);
        payload.resize(64, 0xAB);
        FrameValue::Binary(payload)
    }

    #[test]
    fn test_unrelated_owner_yields_nothing() {
        let frames: FrameMap = vec![("PRIV", foreign_priv("com.example.some.other.vendor.private.frame"))]
            .into_iter()
            .collect();
        assert_eq!(probe_frames(&frames), Ok(None));
    }

    #[test]
    fn test_no_priv_frame_yields_nothing() {
        let frames: FrameMap = vec![("TIT2", FrameValue::Text("x".into()))].into_iter().collect();
        assert_eq!(probe_frames(&frames), Ok(None));
    }

    #[test]
    fn test_skips_foreign_priv_before_apple() {
        let frames: FrameMap = vec![
            ("PRIV", foreign_priv("www.example.com/a-very-long-owner-identifier")),
            ("PRIV", apple_priv([0, 0, 0, 0, 0x82, 0x13, 0x9e, 0xf8])),
        ]
        .into_iter()
        .collect();
        let found = find_timestamp(&frames).unwrap().unwrap();
        assert_eq!(found.priv_index, 1);
        assert_eq!(found.start_pts, 2_182_324_208);
        assert_eq!(found.fields.high_bit(), 0);
    }

    #[test]
    fn test_first_apple_frame_wins() {
        let frames: FrameMap = vec![
            ("PRIV", apple_priv([0, 0, 0, 0, 0, 0, 0, 5])),
            ("PRIV", apple_priv([0, 0, 0, 0, 0, 0, 0, 9])),
        ]
        .into_iter()
        .collect();
        assert_eq!(probe_frames(&frames), Ok(Some(10)));
    }

    #[test]
    fn test_short_foreign_priv_is_skipped() {
        let frames: FrameMap = vec![
            ("PRIV", FrameValue::Binary(b"com.foo\x00\x01\x02\x03".to_vec())),
            ("PRIV", FrameValue::Binary(b"tiny".to_vec())),
            ("PRIV", apple_priv([0, 0, 0, 0, 0x82, 0x13, 0x9e, 0xf8])),
        ]
        .into_iter()
        .collect();
        let found = find_timestamp(&frames).unwrap().unwrap();
        assert_eq!(found.priv_index, 2);
        assert_eq!(found.start_pts, 2_182_324_208);
    }

    #[test]
    fn test_truncated_apple_owner_is_an_error() {
        let frames: FrameMap = vec![("PRIV", FrameValue::Binary(APPLE_OWNER[..20].to_vec()))]
            .into_iter()
            .collect();
        assert_eq!(
            probe_frames(&frames),
            Err(FrameError::MalformedFrame {
                section: PayloadSection::Owner,
                expected: 44,
                actual: 20,
            })
        );
    }

    #[test]
    fn test_truncated_apple_timestamp_is_an_error() {
        let mut payload = APPLE_OWNER.to_vec();
        payload.extend_from_slice(&[0, 0, 0, 0]);
        let frames: FrameMap = vec![("PRIV", FrameValue::Binary(payload))].into_iter().collect();
        assert_eq!(
            probe_frames(&frames),
            Err(FrameError::MalformedFrame {
                section: PayloadSection::Timestamp,
                expected: 8,
                actual: 3,
            })
        );
    }

    #[test]
    fn test_owner_of() {
        assert_eq!(owner_of(b"com.example\x00\x01\x02"), "com.example");
        assert_eq!(owner_of(b"no-terminator"), "no-terminator");
        assert_eq!(owner_of(b""), "");
    }
}
