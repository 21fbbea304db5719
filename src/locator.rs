//! Private frame lookup
//!
//! Finds `PRIV` frames among the frames exposed by the tag reader.
//! A missing frame is not an error; a `PRIV` frame that is not raw bytes is.

use crate::error::{FrameError, FrameResult};
use crate::types::{FrameMap, FrameValue, PRIV_FRAME_ID};

/// Payload of the first private-data frame, if the tag has one
pub fn locate(frames: &FrameMap) -> FrameResult<Option<&[u8]>> {
    frames.get(PRIV_FRAME_ID).map(priv_payload).transpose()
}

/// Payloads of every private-data frame, in tag order
pub fn private_frames(frames: &FrameMap) -> impl Iterator<Item = FrameResult<&[u8]>> {
    frames.get_all(PRIV_FRAME_ID).map(priv_payload)
}

fn priv_payload(value: &FrameValue) -> FrameResult<&[u8]> {
    value.as_bytes().ok_or_else(|| FrameError::TypeMismatch {
        frame_id: PRIV_FRAME_ID.to_string(),
        found: value.kind(),
    })
}
