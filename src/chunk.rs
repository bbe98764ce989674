use bytes::Bytes;

use crate::encoder::{BufferInfo, ChunkFlags};

/// One drained encoder output buffer. The valid subrange is copied out of
/// the encoder-owned memory up front, so a chunk never aliases a buffer
/// that has been released back to the pool.
#[derive(Debug, Clone)]
pub struct EncodedChunk {
    data: Bytes,
    flags: ChunkFlags,
}

impl EncodedChunk {
    /// Copies the `[offset, offset + size)` subrange described by `info`
    /// out of `buffer`. Returns `None` when the subrange does not fit in
    /// the buffer view.
    pub fn copy_from(buffer: &[u8], info: &BufferInfo) -> Option<Self> {
        let end = info.offset.checked_add(info.size)?;
        let data = buffer.get(info.offset..end)?;
        Some(Self {
            data: Bytes::copy_from_slice(data),
            flags: info.flags,
        })
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn into_data(self) -> Bytes {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn flags(&self) -> ChunkFlags {
        self.flags
    }

    pub fn is_key_frame(&self) -> bool {
        self.flags.contains(ChunkFlags::KEY_FRAME)
    }

    pub fn is_codec_config(&self) -> bool {
        self.flags.contains(ChunkFlags::CODEC_CONFIG)
    }

    pub fn is_end_of_stream(&self) -> bool {
        self.flags.contains(ChunkFlags::END_OF_STREAM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_subrange_only() {
        let buffer = [0xEEu8, 0x01, 0x02, 0x03, 0xEE];
        let info = BufferInfo {
            offset: 1,
            size: 3,
            flags: ChunkFlags::KEY_FRAME,
        };
        let chunk = EncodedChunk::copy_from(&buffer, &info).unwrap();
        assert_eq!(chunk.data().as_ref(), &[0x01, 0x02, 0x03]);
        assert!(chunk.is_key_frame());
        assert!(!chunk.is_codec_config());
    }

    #[test]
    fn rejects_subrange_past_end() {
        let buffer = [0u8; 4];
        let info = BufferInfo {
            offset: 2,
            size: 3,
            flags: ChunkFlags::empty(),
        };
        assert!(EncodedChunk::copy_from(&buffer, &info).is_none());
    }

    #[test]
    fn rejects_overflowing_subrange() {
        let buffer = [0u8; 4];
        let info = BufferInfo {
            offset: usize::MAX,
            size: 2,
            flags: ChunkFlags::empty(),
        };
        assert!(EncodedChunk::copy_from(&buffer, &info).is_none());
    }
}
