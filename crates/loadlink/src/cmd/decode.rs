use std::fs;
use std::io::Read;

use loadlink_frame::{decode, AssemblerStats, FrameAssembler, DEFAULT_MAX_PENDING};
use loadlink_telemetry::{apply, TelemetrySnapshot};
use serde::Serialize;
use tracing::warn;

use crate::cmd::DecodeArgs;
use crate::exit::{io_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_event, print_json, print_reading, print_snapshot, OutputFormat};

#[derive(Serialize)]
struct DecodeSummary<'a> {
    kind: &'static str,
    frames: u64,
    rejected: usize,
    discarded_bytes: u64,
    recoveries: u64,
    snapshot: &'a TelemetrySnapshot,
}

/// Run captured bytes through assembly, decoding and dispatch.
///
/// Exits with `DATA_INVALID` when any assembled frame failed to decode.
pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let input = read_input(&args)?;
    let chunk_size = match args.chunk_size {
        Some(0) => return Err(CliError::usage("--chunk-size must be greater than zero")),
        Some(n) => n,
        None => input.len().max(1),
    };

    let mut assembler =
        FrameAssembler::with_max_pending(args.max_pending.unwrap_or(DEFAULT_MAX_PENDING));
    let mut snapshot = TelemetrySnapshot::default();
    let mut rejected = 0usize;

    for chunk in input.chunks(chunk_size) {
        for frame in assembler.process(chunk) {
            match decode(&frame) {
                Ok(reading) => {
                    if let Some(event) = apply(&reading, &mut snapshot) {
                        print_event(&event, format);
                    }
                    print_reading(&reading, format);
                }
                Err(err) => {
                    warn!(frame = %frame, error = %err, "dropping undecodable frame");
                    rejected += 1;
                }
            }
        }
    }

    print_summary(assembler.stats(), rejected, &snapshot, format);
    Ok(if rejected > 0 { DATA_INVALID } else { SUCCESS })
}

fn read_input(args: &DecodeArgs) -> CliResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    let mut buf = Vec::new();
    std::io::stdin()
        .read_to_end(&mut buf)
        .map_err(|err| io_error("failed reading stdin", err))?;
    Ok(buf)
}

fn print_summary(
    stats: AssemblerStats,
    rejected: usize,
    snapshot: &TelemetrySnapshot,
    format: OutputFormat,
) {
    match format {
        OutputFormat::Json => print_json(&DecodeSummary {
            kind: "summary",
            frames: stats.frames,
            rejected,
            discarded_bytes: stats.discarded_bytes,
            recoveries: stats.recoveries,
            snapshot,
        }),
        OutputFormat::Raw => {}
        _ => {
            print_snapshot(snapshot, format);
            println!(
                "frames={} rejected={} discarded_bytes={} recoveries={}",
                stats.frames, rejected, stats.discarded_bytes, stats.recoveries
            );
        }
    }
}
