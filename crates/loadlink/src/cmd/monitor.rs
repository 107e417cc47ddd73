use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::{Duration, Instant};

use loadlink_frame::Reading;
use loadlink_telemetry::{Link, ProcessReport, StatusEvent};
use loadlink_transport::Connector;
use tracing::info;

use crate::cmd::{parse_duration, MonitorArgs};
use crate::exit::{link_error, CliError, CliResult, INTERNAL, SUCCESS, TIMEOUT};
use crate::output::{print_event, print_reading, print_snapshot, OutputFormat};

// How often the loop wakes to check Ctrl-C and the idle deadline.
const TICK: Duration = Duration::from_millis(100);

pub fn run(args: MonitorArgs, format: OutputFormat) -> CliResult<i32> {
    let idle_timeout = args
        .idle_timeout
        .as_deref()
        .map(parse_duration)
        .transpose()?;
    let target = args.link.target()?;
    let config = args.link.link_config()?;

    let mut link = Link::with_config(target, config);
    link.connect()
        .map_err(|err| link_error("connect failed", err))?;
    let mut pump = link
        .start_pump()
        .map_err(|err| link_error("reader failed", err))?;
    info!(target = %link.connector().describe(), "monitoring");

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;
    let mut last_data = Instant::now();
    let result = loop {
        if !running.load(Ordering::SeqCst) {
            break Ok(SUCCESS);
        }

        let event = match pump.recv_timeout(TICK) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => {
                if idle_timeout.is_some_and(|limit| last_data.elapsed() >= limit) {
                    let target = link.connector().describe();
                    break Err(CliError::new(
                        TIMEOUT,
                        format!("no data from {target} within the idle timeout"),
                    ));
                }
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => break Ok(SUCCESS),
        };
        last_data = Instant::now();

        let report = match link.handle(event) {
            Ok(report) => report,
            Err(err) => break Err(link_error("link lost", err)),
        };
        for (event, reading) in report_lines(&report) {
            if let Some(event) = event {
                print_event(event, format);
            }
            print_reading(reading, format);
            printed = printed.saturating_add(1);
            if args.count.is_some_and(|count| printed >= count) {
                break;
            }
        }
        if args.count.is_some_and(|count| printed >= count) {
            break Ok(SUCCESS);
        }
    };

    pump.stop();
    if args.snapshot {
        print_snapshot(link.snapshot(), format);
    }
    link.disconnect();
    result
}

/// Readings in arrival order, each with the fault event it raised.
///
/// Only a status word with its fault bit set raises an event, so events pair
/// up with those readings in order.
fn report_lines(report: &ProcessReport) -> Vec<(Option<&StatusEvent>, &Reading)> {
    let mut events = report.events.iter();
    report
        .readings
        .iter()
        .map(|reading| {
            let faulted = reading.status().is_some_and(|flags| flags.fault());
            (faulted.then(|| events.next()).flatten(), reading)
        })
        .collect()
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
