use std::time::Duration;

use crate::error::EncoderError;

bitflags::bitflags! {
    /// Flags the encoder attaches to an output buffer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ChunkFlags: u32 {
        /// Independently decodable frame.
        const KEY_FRAME = 1;
        /// Codec initialization data, not media.
        const CODEC_CONFIG = 2;
        /// Last buffer of the stream.
        const END_OF_STREAM = 4;
    }
}

/// Valid subrange and classification of one output buffer. Output buffers
/// can be larger than their payload, so `offset`/`size` pick out the part
/// that is actually encoded data.
#[derive(Debug, Clone, Copy)]
pub struct BufferInfo {
    pub offset: usize,
    pub size: usize,
    pub flags: ChunkFlags,
}

/// Result of one poll against the encoder output queue.
#[derive(Debug, Clone, Copy)]
pub enum OutputEvent {
    /// Nothing completed within the poll timeout.
    NoneReady,
    /// The encoder renegotiated its output format. Carries no data.
    FormatChanged,
    /// A completed output buffer. Misbehaving devices can report ids that
    /// were never handed out (typically negative); callers must check.
    Buffer { id: i32, info: BufferInfo },
}

/// A block-oriented media encoder: raw input buffers are queued in,
/// completed output buffers are polled out and must be released back to
/// the pool exactly once each.
///
/// The bridge receives the encoder already configured and started and owns
/// it exclusively from then on. Construction and format negotiation are
/// the caller's problem.
pub trait BlockEncoder {
    fn start(&mut self);
    fn stop(&mut self);
    fn release(&mut self);

    /// Queue one input buffer. `presentation_time_us` is a hint for the
    /// encoder's rate control, not a delivery timestamp. `end_of_stream`
    /// marks this input as the last one.
    fn enqueue_input(
        &mut self,
        data: &[u8],
        presentation_time_us: i64,
        end_of_stream: bool,
    ) -> Result<(), EncoderError>;

    /// Poll for one completed output buffer, waiting at most `timeout`.
    fn poll_output(&mut self, timeout: Duration) -> OutputEvent;

    /// Map the backing data of a polled buffer id. `None` means the id is
    /// unknown to the encoder, which is a broken invariant on a valid id.
    fn output_buffer(&mut self, id: i32) -> Option<&[u8]>;

    /// Return a polled buffer to the pool. Exactly once per
    /// [`OutputEvent::Buffer`]; the data view is invalid afterwards.
    fn release_output_buffer(&mut self, id: i32, render: bool);
}
