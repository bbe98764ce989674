use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use encoder_bus::bridge::{BridgeConfig, EncoderBridge};
use encoder_bus::encoder::{BlockEncoder, BufferInfo, ChunkFlags, OutputEvent};
use encoder_bus::error::EncoderError;
use encoder_bus::frame::RawImage;
use encoder_bus::signal::StartSignal;
use encoder_bus::sink::{SinkEvent, SinkPipe};
use futures::StreamExt;

/// Toy in-process encoder: emits a codec config blob first, then echoes
/// every input back as one "encoded" output buffer. Stands in for a real
/// device so the demo runs anywhere.
struct LoopbackEncoder {
    pending: VecDeque<(BufferInfo, Vec<u8>)>,
    current: Option<Vec<u8>>,
    sent_config: bool,
    inputs: u64,
}

impl LoopbackEncoder {
    fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            current: None,
            sent_config: false,
            inputs: 0,
        }
    }
}

impl BlockEncoder for LoopbackEncoder {
    fn start(&mut self) {}

    fn stop(&mut self) {}

    fn release(&mut self) {
        self.pending.clear();
        self.current = None;
    }

    fn enqueue_input(
        &mut self,
        data: &[u8],
        _presentation_time_us: i64,
        end_of_stream: bool,
    ) -> Result<(), EncoderError> {
        if !self.sent_config {
            self.sent_config = true;
            self.pending.push_back((
                BufferInfo {
                    offset: 0,
                    size: 4,
                    flags: ChunkFlags::CODEC_CONFIG,
                },
                vec![0x00, 0x00, 0x00, 0x01],
            ));
        }

        let flags = if self.inputs % 5 == 0 {
            ChunkFlags::KEY_FRAME
        } else {
            ChunkFlags::empty()
        };
        self.inputs += 1;
        self.pending.push_back((
            BufferInfo {
                offset: 0,
                size: data.len(),
                flags,
            },
            data.to_vec(),
        ));

        if end_of_stream {
            self.pending.push_back((
                BufferInfo {
                    offset: 0,
                    size: 0,
                    flags: ChunkFlags::END_OF_STREAM,
                },
                Vec::new(),
            ));
        }
        Ok(())
    }

    fn poll_output(&mut self, _timeout: Duration) -> OutputEvent {
        match self.pending.pop_front() {
            Some((info, data)) => {
                self.current = Some(data);
                OutputEvent::Buffer { id: 0, info }
            }
            None => OutputEvent::NoneReady,
        }
    }

    fn output_buffer(&mut self, _id: i32) -> Option<&[u8]> {
        self.current.as_deref()
    }

    fn release_output_buffer(&mut self, _id: i32, _render: bool) {
        self.current = None;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Debug)
        .init();

    let pipe = Arc::new(SinkPipe::new());
    let started = StartSignal::new();

    let mut events = SinkPipe::as_stream(Arc::clone(&pipe));
    let consumer = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            match event {
                SinkEvent::Frame(frame) => println!("{}", frame),
                SinkEvent::CodecPrivateData { data, track_id } => {
                    println!(
                        "codec private data: {} bytes for track {}",
                        data.len(),
                        track_id
                    )
                }
            }
        }
    });

    let sink = pipe.sink();
    let signal = started.clone();
    let bridge_task = tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        let mut encoder = LoopbackEncoder::new();
        encoder.start();

        let mut bridge =
            EncoderBridge::new(encoder, sink, BridgeConfig::default()).with_start_signal(signal);

        for i in 0..20u8 {
            let plane = Bytes::from(vec![i; 16]);
            let image = RawImage::new(vec![plane.clone(), plane.clone(), plane], 4, 4);
            bridge.encode_image(&image, i == 19)?;
        }
        bridge.finish()?;
        bridge.stop();
        Ok(())
    });

    started.wait().await;
    println!("first frame produced");

    bridge_task.await??;

    // Let the consumer print the tail before shutting it down.
    tokio::time::sleep(Duration::from_millis(100)).await;
    consumer.abort();

    Ok(())
}
