//! Uevent wire codec
//!
//! A uevent datagram is a run of ASCII segments separated by NUL bytes.
//! Each segment is either `KEY=VALUE` or a bare token such as the kernel's
//! `add@/devices/...` header. There is no length prefix, checksum or version;
//! the datagram boundary is the only framing.

use crate::classify::classify;
use crate::types::{DecodedEvent, Uevent};

/// Receive buffer size used when none is configured
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Multicast group the kernel publishes uevents on
pub const UEVENT_GROUP: u32 = 1;

/// Non-empty segments of a raw message, in wire order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRecord<'a> {
    segments: Vec<&'a [u8]>,
}

impl<'a> FieldRecord<'a> {
    /// Split a raw message on NUL boundaries, dropping empty segments
    pub fn split(raw: &'a [u8]) -> Self {
        let segments = raw
            .split(|&b| b == 0)
            .filter(|segment| !segment.is_empty())
            .collect();
        Self { segments }
    }

    pub fn segments(&self) -> &[&'a [u8]] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Build the key/value mapping from the `KEY=VALUE` segments
    pub fn decode(&self) -> DecodedEvent {
        let mut event = DecodedEvent::default();
        for segment in &self.segments {
            if let Some((key, value)) = split_pair(segment) {
                event.insert(key, value);
            }
        }
        event
    }
}

/// Split a segment at its first `=`
fn split_pair(segment: &[u8]) -> Option<(String, String)> {
    let eq = segment.iter().position(|&b| b == b'=')?;
    let key = String::from_utf8_lossy(&segment[..eq]).into_owned();
    let value = String::from_utf8_lossy(&segment[eq + 1..]).into_owned();
    Some((key, value))
}

/// Decode a raw message into its attribute mapping
///
/// Never fails: malformed input only yields fewer attributes.
pub fn decode(raw: &[u8]) -> DecodedEvent {
    FieldRecord::split(raw).decode()
}

/// Decode and classify a raw message in one pass over its segments
pub fn parse(raw: &[u8]) -> Uevent {
    let record = FieldRecord::split(raw);
    Uevent {
        classification: classify(&record),
        fields: record.decode(),
    }
}

/// Encode key/value pairs in wire form, each segment NUL-terminated
pub fn encode<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Vec<u8>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut buf = Vec::new();
    for (key, value) in pairs {
        buf.extend_from_slice(key.as_ref().as_bytes());
        buf.push(b'=');
        buf.extend_from_slice(value.as_ref().as_bytes());
        buf.push(0);
    }
    buf
}
