use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::chunk::EncodedChunk;
use crate::encoder::{BlockEncoder, BufferInfo, ChunkFlags, OutputEvent};
use crate::error::BridgeError;
use crate::frame::{FrameRecord, MediaType, RawImage};
use crate::signal::StartSignal;
use crate::sink::StreamSink;
use crate::submit::{FrameSubmitter, SampleSubmitter};

/// How long one poll against the encoder may wait for output.
const POLL_TIMEOUT: Duration = Duration::from_millis(10);
/// Idle sleep between polls while awaiting the end-of-stream marker, to
/// avoid a tight loop against an encoder that is still flushing.
const EOS_IDLE_WAIT: Duration = Duration::from_millis(15);
/// Upper bound on buffers drained in one pass: an encoder producing output
/// faster than it is drained must not pin the calling thread.
const MAX_CHUNKS_PER_DRAIN: usize = 64;

/// Static description of the track this bridge feeds.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub track_id: u32,
    pub media_type: MediaType,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            track_id: 1,
            media_type: MediaType::Video,
        }
    }
}

/// Drives a started [`BlockEncoder`] and forwards its output to a
/// [`StreamSink`].
///
/// Everything runs on the caller's thread: a submission enqueues the input
/// and then synchronously drains whatever output the encoder has ready.
/// There is no worker thread and no reordering, so payload frames reach
/// the sink in encoder emission order with sequence indices 0, 1, 2, ...
///
/// One bridge covers one fragment's timestamp scope; restarting a stream
/// means building a new bridge.
pub struct EncoderBridge<E, S> {
    encoder: E,
    sink: S,
    config: BridgeConfig,
    frames: FrameSubmitter,
    samples: SampleSubmitter,
    stopped: AtomicBool,
    start_signal: Option<StartSignal>,
    sequence_index: u64,
    fragment_start_ms: i64,
    last_frame_ms: i64,
}

impl<E: BlockEncoder, S: StreamSink> EncoderBridge<E, S> {
    /// Takes exclusive ownership of an already configured and started
    /// encoder.
    pub fn new(encoder: E, sink: S, config: BridgeConfig) -> Self {
        Self {
            encoder,
            sink,
            config,
            frames: FrameSubmitter::new(),
            samples: SampleSubmitter::new(),
            stopped: AtomicBool::new(false),
            start_signal: None,
            sequence_index: 0,
            fragment_start_ms: 0,
            last_frame_ms: 0,
        }
    }

    /// Registers a gate to fire when the first payload frame is produced.
    pub fn with_start_signal(mut self, signal: StartSignal) -> Self {
        self.start_signal = Some(signal);
        self
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    /// Encode one raw video frame, then drain the encoder output. Ignored
    /// once stopped; stopping with frames still in flight is normal.
    pub fn encode_image(
        &mut self,
        image: &RawImage,
        end_of_stream: bool,
    ) -> Result<(), BridgeError> {
        if self.is_stopped() {
            log::warn!("received a frame to encode after already stopped, ignoring");
            return Ok(());
        }

        self.frames.submit(&mut self.encoder, image, end_of_stream)?;
        self.drain(end_of_stream)
    }

    /// Encode raw audio samples, then drain the encoder output.
    /// `read_bytes` is how much of `buf` the transport filled. Ignored
    /// once stopped.
    pub fn encode_samples(
        &mut self,
        buf: &[u8],
        read_bytes: usize,
        end_of_stream: bool,
    ) -> Result<(), BridgeError> {
        if self.is_stopped() {
            log::warn!("received samples to encode after already stopped, ignoring");
            return Ok(());
        }

        self.samples
            .submit(&mut self.encoder, buf, read_bytes, end_of_stream)?;
        self.drain(end_of_stream)
    }

    /// One extra drain pass awaiting the end-of-stream marker, for callers
    /// whose marker did not surface during the final submission's pass.
    pub fn finish(&mut self) -> Result<(), BridgeError> {
        if self.is_stopped() {
            return Ok(());
        }
        self.drain(true)
    }

    /// Stops and releases the encoder. Idempotent; submissions afterwards
    /// are ignored. Does not interrupt a drain pass already underway.
    pub fn stop(&mut self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        log::debug!("stopping encoder");
        self.encoder.stop();
        self.encoder.release();
    }

    /// One drain pass: poll until the encoder runs dry, the end-of-stream
    /// marker arrives, or the per-pass bound is hit.
    fn drain(&mut self, await_end_of_stream: bool) -> Result<(), BridgeError> {
        let mut drained = 0usize;
        loop {
            if drained >= MAX_CHUNKS_PER_DRAIN {
                log::warn!(
                    "drained {} buffers in one pass, yielding to caller",
                    drained
                );
                return Ok(());
            }
            match self.encoder.poll_output(POLL_TIMEOUT) {
                OutputEvent::NoneReady => {
                    if await_end_of_stream {
                        log::debug!("no output available, await end of stream");
                        std::thread::sleep(EOS_IDLE_WAIT);
                    }
                    return Ok(());
                }
                OutputEvent::FormatChanged => {}
                OutputEvent::Buffer { id, info } => {
                    if id < 0 {
                        log::warn!("unexpected encoder output buffer id: {}", id);
                        continue;
                    }

                    self.consume_output_buffer(id, &info)?;
                    drained += 1;

                    if info.flags.contains(ChunkFlags::END_OF_STREAM) {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Copies the buffer out, releases it, then classifies and delivers.
    /// The release happens on every path, anomalies included, so the
    /// encoder pool never leaks a drained id.
    fn consume_output_buffer(&mut self, id: i32, info: &BufferInfo) -> Result<(), BridgeError> {
        if info.size == 0 {
            log::warn!("empty buffer {}", id);
            self.encoder.release_output_buffer(id, false);
            return Ok(());
        }

        // Copy out first; the release below invalidates the view.
        let copied = self
            .encoder
            .output_buffer(id)
            .map(|buffer| (EncodedChunk::copy_from(buffer, info), buffer.len()));
        self.encoder.release_output_buffer(id, false);

        match copied {
            None => Err(BridgeError::LostOutputBuffer { id }),
            Some((None, len)) => Err(BridgeError::ChunkOutOfBounds {
                id,
                offset: info.offset,
                size: info.size,
                len,
            }),
            Some((Some(chunk), _)) => self.deliver(chunk),
        }
    }

    fn deliver(&mut self, chunk: EncodedChunk) -> Result<(), BridgeError> {
        if chunk.is_codec_config() {
            log::debug!("got codec private data, {} bytes", chunk.len());
            if let Err(e) = self
                .sink
                .on_codec_private_data(chunk.into_data(), self.config.track_id)
            {
                // The stream can still start without cached private data.
                log::error!("error updating sink with codec private data: {}", e);
            }
            return Ok(());
        }

        if chunk.is_end_of_stream() {
            log::debug!("end of stream reached");
            return Ok(());
        }

        self.send_frame(chunk)
    }

    fn send_frame(&mut self, chunk: EncodedChunk) -> Result<(), BridgeError> {
        let current_time = now_ms();
        log::debug!(
            "time between frames: {}ms",
            current_time - self.last_frame_ms
        );
        self.last_frame_ms = current_time;

        if self.fragment_start_ms == 0 {
            self.fragment_start_ms = current_time;
            if let Some(signal) = &self.start_signal {
                signal.notify();
            }
        }

        let sequence_index = self.sequence_index;
        self.sequence_index += 1;

        let frame = FrameRecord {
            track_id: self.config.track_id,
            sequence_index,
            fragment_relative_ts_ms: 1 + current_time - self.fragment_start_ms,
            is_key_frame: chunk.is_key_frame(),
            media_type: self.config.media_type,
            payload: chunk.into_data(),
        };

        self.sink
            .on_frame_data_available(frame)
            .map_err(BridgeError::FrameDelivery)
    }
}

/// Milliseconds since the Unix epoch. The timestamp math assumes this
/// never goes backward; a regression shows up downstream as a non-positive
/// fragment-relative timestamp and must be rejected there, not coerced.
fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "bridge_test.rs"]
mod bridge_test;
