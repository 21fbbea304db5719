//! Type definitions for the PTS probe
//!
//! Constants describing the Apple transport-stream timestamp PRIV frame,
//! plus the frame containers handed from the tag reader to the decoder.

use std::fmt;

/// Owner identifier written by HLS packagers in front of the timestamp
pub const APPLE_OWNER: &[u8; OWNER_LEN] = b"com.apple.streaming.transportStreamTimestamp";
pub const OWNER_LEN: usize = 44;
/// NUL terminator between the owner identifier and the timestamp bytes
pub const SEPARATOR_LEN: usize = 1;
pub const TIMESTAMP_OFFSET: usize = OWNER_LEN + SEPARATOR_LEN;
pub const TIMESTAMP_LEN: usize = 8;
/// Smallest payload that can decode successfully
pub const MIN_PAYLOAD_LEN: usize = TIMESTAMP_OFFSET + TIMESTAMP_LEN;

/// Frame identifier of the ID3v2 private-data frame
pub const PRIV_FRAME_ID: &str = "PRIV";

/// Reconstructed transport-stream timestamp
pub type DecodedTimestamp = i64;

/// Value of one metadata frame as exposed by the tag reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameValue {
    /// Opaque frame body
    Binary(Vec<u8>),
    /// Text frame decoded from its declared encoding
    Text(String),
}

impl FrameValue {
    /// Raw bytes, if this value is opaque
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            FrameValue::Binary(data) => Some(data),
            FrameValue::Text(_) => None,
        }
    }

    /// Short name of the representation, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            FrameValue::Binary(_) => "binary",
            FrameValue::Text(_) => "text",
        }
    }
}

/// Frames of one tag in the order they were read
///
/// ID3v2 allows an identifier to repeat (several `PRIV` frames from
/// different owners are common), so lookups return the first entry and
/// [`FrameMap::get_all`] walks every entry for an identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameMap {
    entries: Vec<(String, FrameValue)>,
}

impl FrameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame, keeping earlier frames with the same identifier
    pub fn insert(&mut self, id: impl Into<String>, value: FrameValue) {
        self.entries.push((id.into(), value));
    }

    /// First frame with the given identifier
    pub fn get(&self, id: &str) -> Option<&FrameValue> {
        self.entries
            .iter()
            .find(|(frame_id, _)| frame_id == id)
            .map(|(_, value)| value)
    }

    /// Every frame with the given identifier, in tag order
    pub fn get_all<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a FrameValue> + 'a {
        self.entries
            .iter()
            .filter(move |(frame_id, _)| frame_id == id)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FrameValue)> {
        self.entries.iter().map(|(id, value)| (id.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, FrameValue)> for FrameMap {
    fn from_iter<I: IntoIterator<Item = (S, FrameValue)>>(iter: I) -> Self {
        let mut map = FrameMap::new();
        for (id, value) in iter {
            map.insert(id, value);
        }
        map
    }
}

/// Output line for a decoded timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartPts(pub DecodedTimestamp);

impl fmt::Display for StartPts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ \"start_pts\":{} }}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_constants() {
        assert_eq!(APPLE_OWNER.len(), OWNER_LEN);
        assert_eq!(TIMESTAMP_OFFSET, 45);
        assert_eq!(MIN_PAYLOAD_LEN, 53);
    }

    #[test]
    fn test_frame_map_keeps_repeated_ids_in_order() {
        let map: FrameMap = vec![
            ("PRIV", FrameValue::Binary(vec![1])),
            ("TIT2", FrameValue::Text("title".to_string())),
            ("PRIV", FrameValue::Binary(vec![2])),
        ]
        .into_iter()
        .collect();

        assert_eq!(map.len(), 3);
        assert_eq!(map.get("PRIV"), Some(&FrameValue::Binary(vec![1])));
        let privs: Vec<_> = map.get_all("PRIV").collect();
        assert_eq!(privs, vec![&FrameValue::Binary(vec![1]), &FrameValue::Binary(vec![2])]);
        assert!(map.get("APIC").is_none());
    }

    #[test]
    fn test_get_outlives_lookup_key() {
        let map: FrameMap = vec![("PRIV", FrameValue::Binary(vec![9]))].into_iter().collect();
        let found = {
            let id = String::from("PRIV");
            map.get(&id)
        };
        assert_eq!(found, Some(&FrameValue::Binary(vec![9])));
    }

    #[test]
    fn test_start_pts_format() {
        assert_eq!(StartPts(2182324208).to_string(), "{ \"start_pts\":2182324208 }");
        assert_eq!(StartPts(0).to_string(), "{ \"start_pts\":0 }");
    }

    #[test]
    fn test_frame_value_accessors() {
        assert_eq!(FrameValue::Binary(vec![7]).as_bytes(), Some(&[7u8][..]));
        assert_eq!(FrameValue::Text("x".into()).as_bytes(), None);
        assert_eq!(FrameValue::Text("x".into()).kind(), "text");
    }
}
