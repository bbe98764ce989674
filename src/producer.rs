use bytes::Bytes;

use crate::error::SinkError;
use crate::frame::FrameRecord;
use crate::sink::StreamSink;

/// A downstream producer stream: the component that groups delivered
/// frames into fragments and uploads them. Consumed through this seam
/// only; the bridge never sees fragments or upload state.
pub trait ProducerStream {
    fn put_frame(&mut self, frame: FrameRecord) -> Result<(), SinkError>;

    /// Codec private data changed (or became known) for a track.
    fn format_changed(&mut self, data: Bytes, track_id: u32) -> Result<(), SinkError>;

    /// Attach a metadata item to the current fragment. `persistent`
    /// metadata is repeated on every following fragment.
    fn put_fragment_metadata(
        &mut self,
        name: &str,
        value: &str,
        persistent: bool,
    ) -> Result<(), SinkError>;
}

/// Adapts a [`ProducerStream`] to the bridge's [`StreamSink`] seam: frames
/// go to `put_frame`, codec private data to `format_changed`.
pub struct ProducerStreamSink<P> {
    stream: P,
}

impl<P: ProducerStream> ProducerStreamSink<P> {
    pub fn new(stream: P) -> Self {
        Self { stream }
    }

    pub fn fragment_metadata(
        &mut self,
        name: &str,
        value: &str,
        persistent: bool,
    ) -> Result<(), SinkError> {
        self.stream.put_fragment_metadata(name, value, persistent)
    }

    pub fn get_ref(&self) -> &P {
        &self.stream
    }

    pub fn into_inner(self) -> P {
        self.stream
    }
}

impl<P: ProducerStream> StreamSink for ProducerStreamSink<P> {
    fn on_frame_data_available(&mut self, frame: FrameRecord) -> Result<(), SinkError> {
        self.stream.put_frame(frame)
    }

    fn on_codec_private_data(&mut self, data: Bytes, track_id: u32) -> Result<(), SinkError> {
        self.stream.format_changed(data, track_id)
    }
}
