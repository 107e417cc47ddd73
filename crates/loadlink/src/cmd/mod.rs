use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use loadlink_telemetry::LinkConfig;
use loadlink_transport::{LinkTarget, SerialConfig, DEFAULT_BAUD_RATE};

use crate::exit::{config_error, CliError, CliResult};
use crate::output::OutputFormat;

pub mod codes;
pub mod decode;
pub mod monitor;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect to the controller and print readings as they arrive.
    Monitor(MonitorArgs),
    /// Send a single command.
    Send(SendArgs),
    /// Decode captured link bytes offline.
    Decode(DecodeArgs),
    /// List receive codes and send commands.
    Codes(CodesArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Monitor(args) => monitor::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Codes(args) => codes::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Where the controller is and how to talk to it.
#[derive(Args, Debug, Clone, Default)]
pub struct LinkArgs {
    /// Serial device of the controller (e.g. /dev/ttyUSB0).
    #[arg(long, env = "LOADLINK_PORT", value_name = "DEVICE")]
    pub port: Option<String>,
    /// Serial baud rate.
    #[arg(long, env = "LOADLINK_BAUD", default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// Unix socket of a controller simulator. Takes precedence over --port.
    #[arg(long, env = "LOADLINK_SOCKET", value_name = "PATH")]
    pub socket: Option<PathBuf>,
    /// JSON file with link tunables.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl LinkArgs {
    pub fn target(&self) -> CliResult<LinkTarget> {
        #[cfg(unix)]
        if let Some(path) = &self.socket {
            return Ok(LinkTarget::Unix(path.clone()));
        }
        #[cfg(not(unix))]
        if self.socket.is_some() {
            return Err(CliError::usage("--socket requires a Unix platform"));
        }

        match &self.port {
            Some(port) => Ok(LinkTarget::Serial(
                SerialConfig::new(port.as_str()).with_baud_rate(self.baud),
            )),
            None => Err(CliError::usage(
                "no controller link given: pass --port or --socket",
            )),
        }
    }

    pub fn link_config(&self) -> CliResult<LinkConfig> {
        match &self.config {
            Some(path) => LinkConfig::load(path).map_err(config_error),
            None => Ok(LinkConfig::default()),
        }
    }
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Exit after printing N readings.
    #[arg(long)]
    pub count: Option<usize>,
    /// Give up when nothing arrives for this long (e.g. 5s, 500ms).
    #[arg(long, value_name = "DURATION")]
    pub idle_timeout: Option<String>,
    /// Print the telemetry snapshot before exiting.
    #[arg(long)]
    pub snapshot: bool,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Wire code (e.g. ASTW) or command name (e.g. SetTareWeight).
    pub command: String,
    /// Command payload.
    #[arg(long, short = 'd', default_value = "")]
    pub data: String,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Captured bytes as text.
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,
    /// Read captured bytes from file. Default: stdin.
    #[arg(long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
    /// Feed the input in chunks of this many bytes.
    #[arg(long, value_name = "BYTES")]
    pub chunk_size: Option<usize>,
    /// Pending bytes kept before discarding them.
    #[arg(long, value_name = "BYTES")]
    pub max_pending: Option<usize>,
}

#[derive(Args, Debug, Default)]
pub struct CodesArgs {
    /// Look up one code or name instead of listing both tables
    pub code: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::usage("duration must not be empty"));
    }

    let (number, millis) = match input.strip_suffix("ms") {
        Some(num) => (num, true),
        None => (input.strip_suffix('s').unwrap_or(input), false),
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::usage(format!("invalid duration value: {input}")))?;
    if value == 0 {
        return Err(CliError::usage("duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
