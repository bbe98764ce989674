/// Failures raised by the encoder capability itself.
#[derive(Debug, thiserror::Error)]
pub enum EncoderError {
    #[error("encoder rejected input: {0}")]
    InputRejected(String),
    #[error("encoder device error: {0}")]
    Device(String),
}

/// Failures raised by a downstream sink while accepting a delivery.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SinkError {
    #[error("sink closed")]
    Closed,
    #[error("sink full, event dropped")]
    Full,
    #[error("sink rejected event: {0}")]
    Rejected(String),
}

/// What unwinds out of the bridge's public entry points. The caller decides
/// whether to stop the bridge; the drain loop itself never retries.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error(transparent)]
    Encoder(#[from] EncoderError),
    /// The encoder handed out a buffer id it could not map. The buffer was
    /// still released; the bridge instance is broken.
    #[error("output buffer {id} has no backing data")]
    LostOutputBuffer { id: i32 },
    /// The buffer metadata described a subrange outside the mapped buffer.
    #[error("output buffer {id} subrange {offset}+{size} out of bounds of {len} bytes")]
    ChunkOutOfBounds {
        id: i32,
        offset: usize,
        size: usize,
        len: usize,
    },
    /// A payload frame could not be delivered. Fatal: the backing encoder
    /// buffer is already released, the frame cannot be re-read.
    #[error("frame delivery failed: {0}")]
    FrameDelivery(#[source] SinkError),
}
