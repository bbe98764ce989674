use std::fmt::{Display, Formatter};

use bytes::Bytes;

/// Which kind of media track produced a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Video,
    Audio,
}

/// The unit delivered downstream: one encoded payload chunk with its
/// sequencing and fragment-relative timing attached.
#[derive(Debug, Clone)]
pub struct FrameRecord {
    pub track_id: u32,
    /// Strictly increasing from 0, one per delivered payload chunk.
    /// Codec config blobs do not consume an index.
    pub sequence_index: u64,
    /// `1 + (capture time - fragment start)` in milliseconds. Always >= 1
    /// under a non-decreasing clock; 0 is reserved for "fragment not yet
    /// started". A non-positive value means the clock went backward and is
    /// delivered as-is for the consumer to reject.
    pub fragment_relative_ts_ms: i64,
    pub is_key_frame: bool,
    pub media_type: MediaType,
    pub payload: Bytes,
}

impl Display for FrameRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(
            f,
            "FrameRecord track: {}, index: {}, ts: {}ms, key: {}, type: {:?}, payload_len: {}",
            self.track_id,
            self.sequence_index,
            self.fragment_relative_ts_ms,
            self.is_key_frame,
            self.media_type,
            self.payload.len()
        )
    }
}

/// Planar raw video input, e.g. YUV420 as three planes.
#[derive(Debug, Clone, Default)]
pub struct RawImage {
    pub planes: Vec<Bytes>,
    pub width: u32,
    pub height: u32,
}

impl RawImage {
    pub fn new(planes: Vec<Bytes>, width: u32, height: u32) -> Self {
        Self {
            planes,
            width,
            height,
        }
    }

    /// Packs the planes into one contiguous buffer in plane order, the
    /// input layout block encoders expect for planar formats.
    pub fn packed(&self) -> Vec<u8> {
        let total = self.planes.iter().map(|p| p.len()).sum();
        let mut out = Vec::with_capacity(total);
        for plane in &self.planes {
            out.extend_from_slice(plane);
        }
        out
    }
}
