//! Synthetic ID3v2 tag construction
//!
//! Builds tags the way HLS packagers lay them out: a header, a handful of
//! frames, optional padding, followed by ADTS audio frames.

use crate::error::{UtilError, UtilResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Owner identifier of the Apple transport-stream timestamp frame
pub const APPLE_TIMESTAMP_OWNER: &str = "com.apple.streaming.transportStreamTimestamp";

const MAX_SYNCHSAFE: usize = 0x0FFF_FFFF;

/// One silent ADTS AAC frame (mono, 44.1 kHz), enough for format sniffers
pub const ADTS_SILENCE: [u8; 9] = [0xFF, 0xF1, 0x50, 0x40, 0x01, 0x3F, 0xFC, 0x21, 0x00];

/// Builder for an ID3v2 tag
#[derive(Debug, Clone)]
pub struct TagBuilder {
    version: u8,
    flags: u8,
    frames: Vec<u8>,
    padding: usize,
}

impl TagBuilder {
    /// Start a tag of major version 2, 3 or 4
    pub fn new(version: u8) -> UtilResult<Self> {
        if !(2..=4).contains(&version) {
            return Err(UtilError::UnsupportedVersion(version));
        }
        Ok(Self {
            version,
            flags: 0,
            frames: Vec::new(),
            padding: 0,
        })
    }

    /// Set the raw header flags byte
    pub fn flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    /// Zero bytes appended after the last frame
    pub fn padding(mut self, padding: usize) -> Self {
        self.padding = padding;
        self
    }

    /// Append a frame with an arbitrary body
    pub fn raw_frame(mut self, id: &str, body: &[u8]) -> UtilResult<Self> {
        let id_len = if self.version == 2 { 3 } else { 4 };
        if id.len() != id_len || !id.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(UtilError::InvalidFrameId {
                id: id.to_string(),
                version: self.version,
            });
        }
        if body.len() > MAX_SYNCHSAFE {
            return Err(UtilError::TooLarge(body.len()));
        }

        self.frames.extend_from_slice(id.as_bytes());
        match self.version {
            2 => self.frames.extend_from_slice(&(body.len() as u32).to_be_bytes()[1..]),
            3 => self.frames.extend_from_slice(&(body.len() as u32).to_be_bytes()),
            _ => self.frames.extend_from_slice(&synchsafe_bytes(body.len())),
        }
        if self.version != 2 {
            self.frames.extend_from_slice(&[0, 0]);
        }
        self.frames.extend_from_slice(body);
        Ok(self)
    }

    /// Append an ISO-8859-1 text frame
    pub fn text_frame(self, id: &str, text: &str) -> UtilResult<Self> {
        let mut body = vec![0u8];
        body.extend_from_slice(text.as_bytes());
        self.raw_frame(id, &body)
    }

    /// Append a PRIV frame: owner, NUL, data
    pub fn priv_frame(self, owner: &str, data: &[u8]) -> UtilResult<Self> {
        self.raw_frame("PRIV", &priv_payload(owner, data))
    }

    /// Append the Apple timestamp PRIV frame carrying `timestamp`
    pub fn apple_timestamp(self, timestamp: [u8; 8]) -> UtilResult<Self> {
        self.priv_frame(APPLE_TIMESTAMP_OWNER, &timestamp)
    }

    /// Serialize header, frames and padding
    pub fn build(&self) -> UtilResult<Vec<u8>> {
        let size = self.frames.len() + self.padding;
        if size > MAX_SYNCHSAFE {
            return Err(UtilError::TooLarge(size));
        }
        let mut tag = vec![b'I', b'D', b'3', self.version, 0, self.flags];
        tag.extend_from_slice(&synchsafe_bytes(size));
        tag.extend_from_slice(&self.frames);
        tag.resize(tag.len() + self.padding, 0);
        Ok(tag)
    }

    /// Tag followed by a few silent ADTS frames, like a packed audio segment
    pub fn build_segment(&self) -> UtilResult<Vec<u8>> {
        let mut segment = self.build()?;
        for _ in 0..4 {
            segment.extend_from_slice(&ADTS_SILENCE);
        }
        Ok(segment)
    }
}

/// PRIV frame body: owner, NUL separator, data
pub fn priv_payload(owner: &str, data: &[u8]) -> Vec<u8> {
    let mut payload = owner.as_bytes().to_vec();
    payload.push(0);
    payload.extend_from_slice(data);
    payload
}

/// 28-bit value as four 7-bit bytes
pub fn synchsafe_bytes(value: usize) -> [u8; 4] {
    [
        ((value >> 21) & 0x7F) as u8,
        ((value >> 14) & 0x7F) as u8,
        ((value >> 7) & 0x7F) as u8,
        (value & 0x7F) as u8,
    ]
}

/// Unique path in the system temp directory
pub fn temp_path(name: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!("pts-probe-{}-{}-{}", std::process::id(), n, name))
}

/// Write `data` to a fresh temp file and return its path
pub fn write_temp(name: &str, data: &[u8]) -> UtilResult<PathBuf> {
    let path = temp_path(name);
    fs::write(&path, data)?;
    Ok(path)
}

/// Remove a fixture file, ignoring files that are already gone
pub fn remove_temp(path: &Path) {
    let _ = fs::remove_file(path);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v24_header_and_frame_layout() {
        let tag = TagBuilder::new(4)
            .unwrap()
            .priv_frame("a", &[1, 2])
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(&tag[..6], b"ID3\x04\x00\x00");
        assert_eq!(&tag[6..10], &[0, 0, 0, 14]);
        assert_eq!(&tag[10..14], b"PRIV");
        assert_eq!(&tag[14..18], &[0, 0, 0, 4]);
        assert_eq!(&tag[20..], &[b'a', 0, 1, 2]);
    }

    #[test]
    fn test_rejects_bad_ids() {
        let builder = TagBuilder::new(3).unwrap();
        assert!(builder.clone().raw_frame("PRV", &[]).is_err());
        assert!(builder.raw_frame("PR\0V", &[]).is_err());
        assert!(TagBuilder::new(5).is_err());
    }

    #[test]
    fn test_synchsafe_bytes() {
        assert_eq!(synchsafe_bytes(257), [0, 0, 2, 1]);
        assert_eq!(synchsafe_bytes(MAX_SYNCHSAFE), [0x7F; 4]);
    }
}
