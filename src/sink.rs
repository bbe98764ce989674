use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;

use crate::error::SinkError;
use crate::frame::FrameRecord;

/// Downstream consumer of the bridge's output. One sink per bridge; frames
/// and codec private data always go to the same destination.
///
/// The bridge treats the two deliveries differently: a frame failure is
/// fatal (the encoded bytes are gone once the encoder buffer is released),
/// a codec-private-data failure is logged and the stream continues.
pub trait StreamSink {
    fn on_frame_data_available(&mut self, frame: FrameRecord) -> Result<(), SinkError>;
    fn on_codec_private_data(&mut self, data: Bytes, track_id: u32) -> Result<(), SinkError>;
}

/// Fire-and-forget listener mode: two callbacks and no failure channel, so
/// every delivery trivially succeeds.
pub struct CallbackSink {
    on_frame: Box<dyn FnMut(FrameRecord) + Send>,
    on_codec_private_data: Box<dyn FnMut(Bytes, u32) + Send>,
}

impl CallbackSink {
    pub fn new(
        on_frame: impl FnMut(FrameRecord) + Send + 'static,
        on_codec_private_data: impl FnMut(Bytes, u32) + Send + 'static,
    ) -> Self {
        Self {
            on_frame: Box::new(on_frame),
            on_codec_private_data: Box::new(on_codec_private_data),
        }
    }
}

impl StreamSink for CallbackSink {
    fn on_frame_data_available(&mut self, frame: FrameRecord) -> Result<(), SinkError> {
        (self.on_frame)(frame);
        Ok(())
    }

    fn on_codec_private_data(&mut self, data: Bytes, track_id: u32) -> Result<(), SinkError> {
        (self.on_codec_private_data)(data, track_id);
        Ok(())
    }
}

/// One event pushed through a channel-backed sink.
#[derive(Debug, Clone)]
pub enum SinkEvent {
    Frame(FrameRecord),
    CodecPrivateData { data: Bytes, track_id: u32 },
}

/// Bounded channel between the bridge (writer side) and an async consumer
/// (reader side). `sink()` hands out the writer as a [`StreamSink`]; the
/// pipe itself is the reader and implements `Stream`.
pub struct SinkPipe {
    pub writer: tokio::sync::mpsc::Sender<SinkEvent>,
    inner: Mutex<tokio::sync::mpsc::Receiver<SinkEvent>>,
}

impl SinkPipe {
    pub fn new() -> Self {
        Self::with_capacity(32)
    }

    pub fn with_capacity(buffer_size: usize) -> Self {
        let (writer, receiver) = tokio::sync::mpsc::channel(buffer_size);
        Self {
            writer,
            inner: Mutex::new(receiver),
        }
    }

    pub fn sink(&self) -> ChannelSink {
        ChannelSink {
            writer: self.writer.clone(),
        }
    }

    pub fn stream(&self) -> SinkEventStream<'_> {
        SinkEventStream { source: self }
    }
}

impl Default for SinkPipe {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SinkEventStream<'a> {
    source: &'a SinkPipe,
}

impl Stream for SinkEventStream<'_> {
    type Item = SinkEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut guard = self.source.inner.lock().unwrap();
        guard.poll_recv(cx)
    }
}

impl Stream for SinkPipe {
    type Item = SinkEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut guard = self.get_mut().inner.lock().unwrap();
        guard.poll_recv(cx)
    }
}

/// Wrapper to use `Arc<SinkPipe>` as Stream (orphan rule workaround).
pub struct SinkPipeStream(pub Arc<SinkPipe>);

impl Stream for SinkPipeStream {
    type Item = SinkEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut guard = self.0.inner.lock().unwrap();
        guard.poll_recv(cx)
    }
}

impl SinkPipe {
    /// Returns a stream that yields sink events. Use this when you have
    /// `Arc<SinkPipe>`.
    pub fn as_stream(this: Arc<Self>) -> SinkPipeStream {
        SinkPipeStream(this)
    }
}

/// Writer half of a [`SinkPipe`]. Non-blocking by design: a full channel
/// is surfaced as [`SinkError::Full`] instead of waiting, so the
/// synchronous drain loop never stalls on a slow consumer.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    writer: tokio::sync::mpsc::Sender<SinkEvent>,
}

impl ChannelSink {
    fn push(&self, event: SinkEvent) -> Result<(), SinkError> {
        use tokio::sync::mpsc::error::TrySendError;

        self.writer.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => SinkError::Full,
            TrySendError::Closed(_) => SinkError::Closed,
        })
    }
}

impl StreamSink for ChannelSink {
    fn on_frame_data_available(&mut self, frame: FrameRecord) -> Result<(), SinkError> {
        self.push(SinkEvent::Frame(frame))
    }

    fn on_codec_private_data(&mut self, data: Bytes, track_id: u32) -> Result<(), SinkError> {
        self.push(SinkEvent::CodecPrivateData { data, track_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::MediaType;

    #[test]
    fn callback_sink_never_fails() {
        let seen = Arc::new(Mutex::new((0usize, 0usize)));
        let frames = Arc::clone(&seen);
        let configs = Arc::clone(&seen);
        let mut sink = CallbackSink::new(
            move |_frame| frames.lock().unwrap().0 += 1,
            move |_data, _track_id| configs.lock().unwrap().1 += 1,
        );

        let frame = FrameRecord {
            track_id: 1,
            sequence_index: 0,
            fragment_relative_ts_ms: 1,
            is_key_frame: true,
            media_type: MediaType::Video,
            payload: Bytes::from_static(&[0x01]),
        };
        sink.on_frame_data_available(frame).unwrap();
        sink.on_codec_private_data(Bytes::from_static(&[0xC0]), 1)
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), (1, 1));
    }
}
