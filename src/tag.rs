//! Minimal ID3v2 tag reader
//!
//! Reads the ID3v2 tag at the start of an audio stream (HLS packed audio
//! segments carry one in front of the first ADTS frame) and exposes every
//! frame by identifier. Only reading is supported; frames the probe has no
//! use for are kept as raw bytes without interpretation.

use crate::error::{TagError, TagResult};
use crate::types::{FrameMap, FrameValue};
use std::fmt;
use std::io::Read;

/// Size of the ID3v2 tag header
pub const HEADER_LEN: usize = 10;

const FLAG_UNSYNCHRONISATION: u8 = 0x80;
const FLAG_EXTENDED_HEADER: u8 = 0x40;

/// Container formats recognised from the first bytes of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagFormat {
    Id3v22,
    Id3v23,
    Id3v24,
    Flac,
    Ogg,
    Mp4,
    /// Bare MPEG audio or ADTS sync word with no tag in front
    Mpeg,
}

impl TagFormat {
    fn from_major(major: u8) -> Option<Self> {
        match major {
            2 => Some(TagFormat::Id3v22),
            3 => Some(TagFormat::Id3v23),
            4 => Some(TagFormat::Id3v24),
            _ => None,
        }
    }
}

impl fmt::Display for TagFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TagFormat::Id3v22 => "ID3v2.2",
            TagFormat::Id3v23 => "ID3v2.3",
            TagFormat::Id3v24 => "ID3v2.4",
            TagFormat::Flac => "FLAC",
            TagFormat::Ogg => "Ogg",
            TagFormat::Mp4 => "MP4",
            TagFormat::Mpeg => "MPEG audio",
        };
        f.write_str(name)
    }
}

/// Detect the container format from the first bytes of a file
///
/// Pass at least [`HEADER_LEN`] bytes for reliable detection.
pub fn detect_format(header: &[u8]) -> Option<TagFormat> {
    if header.len() >= 4 && &header[..3] == b"ID3" {
        return TagFormat::from_major(header[3]);
    }
    if header.len() >= 4 && &header[..4] == b"fLaC" {
        return Some(TagFormat::Flac);
    }
    if header.len() >= 4 && &header[..4] == b"OggS" {
        return Some(TagFormat::Ogg);
    }
    if header.len() >= 8 && &header[4..8] == b"ftyp" {
        return Some(TagFormat::Mp4);
    }
    if header.len() >= 2 && header[0] == 0xFF && (header[1] & 0xE0) == 0xE0 {
        return Some(TagFormat::Mpeg);
    }
    None
}

/// A parsed ID3v2 tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub format: TagFormat,
    pub revision: u8,
    pub frames: FrameMap,
}

/// Read the ID3v2 tag at the current position of `reader`
///
/// Only the header and the declared tag body are consumed.
pub fn read_frames<R: Read>(reader: &mut R) -> TagResult<Tag> {
    let mut header = Vec::with_capacity(HEADER_LEN);
    reader.by_ref().take(HEADER_LEN as u64).read_to_end(&mut header)?;

    if header.len() < 3 || &header[..3] != b"ID3" {
        return Err(match detect_format(&header) {
            Some(format) => TagError::UnsupportedFormat(format.to_string()),
            None => TagError::NoTagFound,
        });
    }
    if header.len() < HEADER_LEN {
        return Err(TagError::Truncated {
            expected: HEADER_LEN,
            actual: header.len(),
        });
    }

    let (major, revision, flags) = (header[3], header[4], header[5]);
    let format = TagFormat::from_major(major)
        .ok_or(TagError::UnsupportedVersion { major, revision })?;
    let size = synchsafe(&header[6..10]).ok_or(TagError::InvalidSynchsafe { offset: 6 })? as usize;

    log::debug!("{} tag, flags 0x{:02X}, {} bytes", format, flags, size);

    // size comes from the file; let the buffer grow with what is actually read
    let mut body = Vec::new();
    reader.take(size as u64).read_to_end(&mut body)?;
    if body.len() < size {
        return Err(TagError::Truncated {
            expected: HEADER_LEN + size,
            actual: HEADER_LEN + body.len(),
        });
    }

    let frames = parse_body(format, flags, body)?;
    Ok(Tag {
        format,
        revision,
        frames,
    })
}

/// Parse a complete tag held in memory
pub fn parse_tag(data: &[u8]) -> TagResult<Tag> {
    let mut cursor = data;
    read_frames(&mut cursor)
}

fn parse_body(format: TagFormat, flags: u8, mut body: Vec<u8>) -> TagResult<FrameMap> {
    // v2.4 moved unsynchronisation to the frame level
    if flags & FLAG_UNSYNCHRONISATION != 0 && format != TagFormat::Id3v24 {
        body = remove_unsynchronisation(&body);
    }

    let mut pos = 0;
    if flags & FLAG_EXTENDED_HEADER != 0 {
        match format {
            // v2.2 uses this bit for whole-tag compression, which was never specified
            TagFormat::Id3v22 => {
                log::warn!("Compressed ID3v2.2 tag, frames skipped");
                return Ok(FrameMap::new());
            }
            TagFormat::Id3v23 => pos = 4 + read_be(body_slice(&body, 0, 4)?) as usize,
            _ => {
                pos = synchsafe(body_slice(&body, 0, 4)?)
                    .ok_or(TagError::InvalidSynchsafe { offset: HEADER_LEN })?
                    as usize
            }
        }
        if pos > body.len() {
            return Err(TagError::Truncated {
                expected: pos,
                actual: body.len(),
            });
        }
    }

    let header_len = if format == TagFormat::Id3v22 { 6 } else { 10 };
    let id_len = if format == TagFormat::Id3v22 { 3 } else { 4 };
    let mut frames = FrameMap::new();

    while pos + header_len <= body.len() {
        let frame_header = &body[pos..pos + header_len];
        if frame_header[0] == 0 {
            break; // padding
        }
        let id = String::from_utf8_lossy(&frame_header[..id_len]).into_owned();
        let size_bytes = &frame_header[id_len..id_len + id_len];
        let size = match format {
            TagFormat::Id3v24 => synchsafe(size_bytes).unwrap_or_else(|| read_be(size_bytes)),
            _ => read_be(size_bytes),
        } as usize;
        let format_flags = if format == TagFormat::Id3v22 { 0 } else { frame_header[9] };

        let start = pos + header_len;
        let available = body.len() - start;
        if size > available {
            return Err(TagError::FrameOverrun {
                frame_id: id,
                offset: HEADER_LEN + pos,
                size,
                available,
            });
        }
        let data = &body[start..start + size];
        pos = start + size;

        log::debug!("Frame {} ({} bytes)", id, size);
        let value = frame_value(format, &id, format_flags, data);
        frames.insert(id, value);
    }

    Ok(frames)
}

fn frame_value(format: TagFormat, id: &str, format_flags: u8, data: &[u8]) -> FrameValue {
    let (encoded, data) = match format {
        TagFormat::Id3v23 => strip_v23_frame_fields(format_flags, data),
        TagFormat::Id3v24 => strip_v24_frame_fields(format_flags, data),
        _ => (false, data.to_vec()),
    };
    if encoded {
        log::warn!("Frame {} is compressed or encrypted, kept as raw bytes", id);
        return FrameValue::Binary(data);
    }
    if id.starts_with('T') && id != "TXXX" && id != "TXX" {
        if let Some(text) = decode_text(&data) {
            return FrameValue::Text(text);
        }
    }
    FrameValue::Binary(data)
}

/// Drop the optional v2.3 frame header extensions; reports compression/encryption
fn strip_v23_frame_fields(flags: u8, data: &[u8]) -> (bool, Vec<u8>) {
    let compressed = flags & 0x80 != 0;
    let encrypted = flags & 0x40 != 0;
    let grouped = flags & 0x20 != 0;
    let skip = 4 * usize::from(compressed) + usize::from(encrypted) + usize::from(grouped);
    let data = data.get(skip..).unwrap_or_default();
    (compressed || encrypted, data.to_vec())
}

/// Drop the optional v2.4 frame header extensions and undo unsynchronisation
fn strip_v24_frame_fields(flags: u8, data: &[u8]) -> (bool, Vec<u8>) {
    let grouped = flags & 0x40 != 0;
    let compressed = flags & 0x08 != 0;
    let encrypted = flags & 0x04 != 0;
    let unsynchronised = flags & 0x02 != 0;
    let data_length = flags & 0x01 != 0;
    let skip = usize::from(grouped) + usize::from(encrypted) + 4 * usize::from(data_length);
    let data = data.get(skip..).unwrap_or_default();
    let data = if unsynchronised {
        remove_unsynchronisation(data)
    } else {
        data.to_vec()
    };
    (compressed || encrypted, data)
}

/// Decode a text frame body according to its leading encoding byte
fn decode_text(data: &[u8]) -> Option<String> {
    let (&encoding, text) = data.split_first()?;
    let decoded: String = match encoding {
        0 => text.iter().map(|&b| char::from(b)).collect(),
        1 => match text {
            [0xFF, 0xFE, rest @ ..] => utf16(rest, u16::from_le_bytes),
            [0xFE, 0xFF, rest @ ..] => utf16(rest, u16::from_be_bytes),
            _ => utf16(text, u16::from_le_bytes),
        },
        2 => utf16(text, u16::from_be_bytes),
        3 => String::from_utf8_lossy(text).into_owned(),
        _ => return None,
    };
    Some(decoded.trim_end_matches('\0').to_string())
}

fn utf16(data: &[u8], to_unit: fn([u8; 2]) -> u16) -> String {
    let units: Vec<u16> = data
        .chunks_exact(2)
        .map(|pair| to_unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// Reverse the `FF 00` escaping applied by unsynchronisation
pub fn remove_unsynchronisation(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        out.push(data[i]);
        if data[i] == 0xFF && data.get(i + 1) == Some(&0x00) {
            i += 1;
        }
        i += 1;
    }
    out
}

/// 28-bit integer stored 7 bits per byte; `None` if a high bit is set
pub fn synchsafe(bytes: &[u8]) -> Option<u32> {
    bytes.iter().try_fold(0u32, |acc, &b| {
        if b & 0x80 != 0 {
            None
        } else {
            Some((acc << 7) | u32::from(b))
        }
    })
}

fn read_be(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
}

fn body_slice(body: &[u8], start: usize, len: usize) -> TagResult<&[u8]> {
    body.get(start..start + len).ok_or(TagError::Truncated {
        expected: HEADER_LEN + start + len,
        actual: HEADER_LEN + body.len(),
    })
}
