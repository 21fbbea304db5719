//! Transport-stream timestamp decoding
//!
//! The Apple PRIV frame payload is laid out as:
//!
//! ```text
//! [0..44)  owner identifier "com.apple.streaming.transportStreamTimestamp"
//! [44]     NUL separator
//! [45..53) 8-byte timestamp, upper 31 bits zero
//! ```
//!
//! The packager stores the 33-bit PTS with the bit above the low 32 moved
//! into bit 0 of the fourth timestamp byte. The remaining four bytes are
//! weighted as the 90 kHz PES timestamp fields were before their marker
//! bits were stripped, so they cannot be read as a plain big-endian word.

use crate::error::{FrameError, FrameResult, PayloadSection};
use crate::types::{DecodedTimestamp, APPLE_OWNER, OWNER_LEN, TIMESTAMP_LEN, TIMESTAMP_OFFSET};

/// Byte weights for timestamp bytes 4..8
const BYTE_WEIGHTS: [u64; 4] = [1 << 23, 1 << 15, 1 << 7, 1];
/// Added when the relocated high bit is set
const HIGH_BIT_CARRY: u64 = 1 << 31;

/// Decode an Apple PRIV payload
///
/// Returns `Ok(None)` when the owner identifier belongs to someone else.
pub fn decode(payload: &[u8]) -> FrameResult<Option<DecodedTimestamp>> {
    if !owner_matches(payload)? {
        return Ok(None);
    }
    let fields = TimestampFields::parse(payload)?;
    Ok(Some(fields.reconstruct()))
}

/// Compare the first 44 bytes against the Apple owner identifier
pub fn owner_matches(payload: &[u8]) -> FrameResult<bool> {
    let owner = payload.get(..OWNER_LEN).ok_or(FrameError::MalformedFrame {
        section: PayloadSection::Owner,
        expected: OWNER_LEN,
        actual: payload.len(),
    })?;
    Ok(owner == APPLE_OWNER)
}

/// The 8 timestamp bytes following the owner and separator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampFields {
    pub bytes: [u8; TIMESTAMP_LEN],
}

impl TimestampFields {
    /// Pull the timestamp bytes out of a full PRIV payload
    ///
    /// The owner is not checked here; bytes past the eighth are ignored.
    pub fn parse(payload: &[u8]) -> FrameResult<Self> {
        let available = payload.len().saturating_sub(TIMESTAMP_OFFSET);
        let bytes = payload
            .get(TIMESTAMP_OFFSET..TIMESTAMP_OFFSET + TIMESTAMP_LEN)
            .and_then(|slice| <[u8; TIMESTAMP_LEN]>::try_from(slice).ok())
            .ok_or(FrameError::MalformedFrame {
                section: PayloadSection::Timestamp,
                expected: TIMESTAMP_LEN,
                actual: available,
            })?;
        Ok(Self { bytes })
    }

    /// Bit 33 of the PTS, relocated into byte 3
    pub fn high_bit(&self) -> u8 {
        self.bytes[3] & 0x01
    }

    /// Rebuild the PTS from the weighted low bytes and the high bit
    pub fn reconstruct(&self) -> DecodedTimestamp {
        let mut value: u64 = self.bytes[4..]
            .iter()
            .zip(BYTE_WEIGHTS)
            .map(|(&byte, weight)| u64::from(byte) * weight)
            .sum();
        value *= 2;
        if self.high_bit() == 1 {
            value += HIGH_BIT_CARRY;
        }
        value as DecodedTimestamp
    }
}
