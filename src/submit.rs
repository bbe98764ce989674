use std::time::Instant;

use crate::encoder::BlockEncoder;
use crate::error::EncoderError;
use crate::frame::RawImage;

/// Presentation-time hints for submitted input: microseconds elapsed since
/// the first submission, so the first input is hinted at (close to) 0.
#[derive(Debug, Default)]
struct InputClock {
    origin: Option<Instant>,
}

impl InputClock {
    fn next_hint_us(&mut self) -> i64 {
        let origin = *self.origin.get_or_insert_with(Instant::now);
        origin.elapsed().as_micros() as i64
    }
}

/// Submits raw video frames to the encoder input queue.
#[derive(Debug, Default)]
pub struct FrameSubmitter {
    clock: InputClock,
}

impl FrameSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit<E: BlockEncoder>(
        &mut self,
        encoder: &mut E,
        image: &RawImage,
        end_of_stream: bool,
    ) -> Result<(), EncoderError> {
        let data = image.packed();
        let hint = self.clock.next_hint_us();
        encoder.enqueue_input(&data, hint, end_of_stream)
    }
}

/// Submits raw audio samples to the encoder input queue. `read_bytes` is
/// how much of the buffer the transport actually filled (see
/// [`crate::protocol::ReadResult`]); anything past it is stale and is not
/// submitted.
#[derive(Debug, Default)]
pub struct SampleSubmitter {
    clock: InputClock,
}

impl SampleSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit<E: BlockEncoder>(
        &mut self,
        encoder: &mut E,
        buf: &[u8],
        read_bytes: usize,
        end_of_stream: bool,
    ) -> Result<(), EncoderError> {
        let len = read_bytes.min(buf.len());
        let hint = self.clock.next_hint_us();
        encoder.enqueue_input(&buf[..len], hint, end_of_stream)
    }
}
