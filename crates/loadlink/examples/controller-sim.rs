//! Controller simulator on a Unix socket.
//!
//! Streams telemetry the way the sensor controller does (fragmented writes,
//! the odd burst of line noise) and prints every command it receives.
//!
//! Run with:
//!   cargo run --example controller-sim -- /tmp/loadlink-sim.sock
//!
//! In another terminal:
//!   cargo run --features cli -- monitor --socket /tmp/loadlink-sim.sock --format pretty
//!   cargo run --features cli -- send --socket /tmp/loadlink-sim.sock SetTareWeight --data 120

use std::fs;
use std::io::Write;
use std::os::unix::net::UnixListener;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use loadlink::frame::{FrameError, FrameReader, SendCommand};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sock_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("loadlink-sim.sock"));
    let _ = fs::remove_file(&sock_path);

    let listener = UnixListener::bind(&sock_path)?;
    eprintln!("Controller listening on {}", sock_path.display());

    for stream in listener.incoming() {
        let stream = stream?;
        eprintln!("Host connected");

        let telemetry = stream.try_clone()?;
        let talker = thread::spawn(move || stream_telemetry(telemetry));

        let mut reader = FrameReader::new(stream);
        loop {
            match reader.read_frame() {
                Ok(frame) => {
                    let text = frame.to_string();
                    let body = text.trim_start_matches('<').trim_end_matches('>');
                    let split = body.char_indices().nth(4).map_or(body.len(), |(i, _)| i);
                    let (code, data) = body.split_at(split);
                    match code.parse::<SendCommand>() {
                        Ok(cmd) => eprintln!("Command {} data={data:?}", cmd.name()),
                        Err(_) => eprintln!("Unknown command frame {frame}"),
                    }
                }
                Err(FrameError::ConnectionClosed) => break,
                Err(e) => {
                    eprintln!("Read failed: {e}");
                    break;
                }
            }
        }
        eprintln!("Host disconnected");
        let _ = talker.join();
    }

    Ok(())
}

fn stream_telemetry(mut out: std::os::unix::net::UnixStream) {
    let mut load: i32 = 0;
    for tick in 0u32.. {
        load = (load + 37) % 4000;
        let burst = format!(
            "<AD00{}><AD11{}><AD14{}><AD15{}>",
            u8::from(tick % 50 == 49),
            150 + (tick % 20) as i32,
            load,
            load / 2,
        );
        let bytes = burst.as_bytes();

        // Split the burst the way a USB serial adapter does.
        let split = (tick as usize * 7) % bytes.len();
        for part in [&bytes[..split], &bytes[split..]] {
            if out.write_all(part).is_err() {
                return;
            }
            thread::sleep(Duration::from_millis(20));
        }
        if tick % 25 == 24 && out.write_all(b"~#>").is_err() {
            return;
        }
        thread::sleep(Duration::from_millis(200));
    }
}
