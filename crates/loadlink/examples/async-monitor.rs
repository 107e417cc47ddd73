//! Async telemetry monitor using `LinkCodec` over a tokio Unix socket.
//!
//! Run with (start `controller-sim` first):
//!   cargo run --example async-monitor --features async -- /tmp/loadlink-sim.sock

use bytes::BytesMut;
use loadlink::frame::{decode, LinkCodec, OutboundCommand, SendCommand};
use loadlink::telemetry::{apply, TelemetrySnapshot};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio_util::codec::{Decoder, Encoder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/tmp/loadlink-sim.sock".to_string());
    let mut stream = UnixStream::connect(&path).await?;
    eprintln!("Connected to {path}");

    let mut codec = LinkCodec::new();
    let mut out = BytesMut::new();
    codec.encode(OutboundCommand::bare(SendCommand::ClearWholeLoad), &mut out)?;
    stream.write_all(&out).await?;

    let mut snapshot = TelemetrySnapshot::default();
    let mut buf = BytesMut::with_capacity(256);
    loop {
        if stream.read_buf(&mut buf).await? == 0 {
            eprintln!("Controller closed the link");
            break;
        }
        while let Some(frame) = codec.decode(&mut buf)? {
            match decode(&frame) {
                Ok(reading) => {
                    if let Some(event) = apply(&reading, &mut snapshot) {
                        eprintln!("{event:?}");
                    }
                }
                Err(e) => eprintln!("Dropped {frame}: {e}"),
            }
        }
        println!(
            "load={:.1} kg cab={:.1} deg current={:.1} kg",
            snapshot.load_weight, snapshot.cab_angle, snapshot.current_weight
        );
    }

    let stats = codec.stats();
    eprintln!(
        "frames={} discarded_bytes={} recoveries={}",
        stats.frames, stats.discarded_bytes, stats.recoveries
    );
    Ok(())
}
