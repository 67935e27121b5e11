//! The segment: unit of work carried from caller to relay.
//!
//! # Wire Format
//!
//! ```text
//! {
//!   "segment":        "1011...",   bit-string payload
//!   "segment_number": 3,           sequence number
//!   "send_time":      "...",       sender timestamp, opaque
//!   "total_segments": 10,          segment count of the whole message
//!   "username":       "alice"      owner identifier
//! }
//! ```
//!
//! Every field defaults to zero / empty when absent or `null`, a `null`
//! body is an empty segment, and bytes after the first JSON value are
//! ignored. The relay receives the same shape with `segment` replaced by
//! the corrected bit-string.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Textual bit-string payload
    #[serde(default, deserialize_with = "null_as_default")]
    pub segment: String,

    /// Position of this segment within its message
    #[serde(default, deserialize_with = "null_as_default")]
    pub segment_number: i64,

    /// Sender timestamp, passed through untouched
    #[serde(default, deserialize_with = "null_as_default")]
    pub send_time: String,

    /// Number of segments in the message
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_segments: i64,

    /// Owner identifier
    #[serde(default, rename = "username", deserialize_with = "null_as_default")]
    pub user_id: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Segment {
    /// Create a segment carrying `payload` with empty metadata.
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            segment: payload.into(),
            segment_number: 0,
            send_time: String::new(),
            total_segments: 0,
            user_id: String::new(),
        }
    }

    /// Parse a request body.
    ///
    /// Only the first JSON value is read; anything after it is ignored.
    ///
    /// # Errors
    /// Returns `Error::MalformedInput` if the body is empty or its first
    /// value is not a JSON segment.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        match serde_json::Deserializer::from_slice(body).into_iter::<Option<Segment>>().next() {
            Some(Ok(segment)) => Ok(segment.unwrap_or_default()),
            Some(Err(e)) => Err(Error::MalformedInput(e.to_string())),
            None => Err(Error::MalformedInput("empty body".to_string())),
        }
    }

    /// Payload length in bits (one per character).
    pub fn bit_len(&self) -> usize {
        self.segment.chars().count()
    }
}
