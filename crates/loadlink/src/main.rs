mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "loadlink",
    version,
    about = "Talk to the loader-scale sensor controller"
)]
struct Cli {
    /// Output format. Default: table on a terminal, JSON otherwise.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "info",
        env = "LOADLINK_LOG_LEVEL",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    match cmd::run(cli.command, format) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "loadlink",
            "send",
            "--socket",
            "/tmp/sim.sock",
            "SetTareWeight",
            "--data",
            "100",
        ])
        .expect("send args should parse");

        match cli.command {
            Command::Send(args) => {
                assert_eq!(args.command, "SetTareWeight");
                assert_eq!(args.data, "100");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_conflicting_decode_inputs() {
        let err = Cli::try_parse_from([
            "loadlink",
            "decode",
            "--data",
            "<AD1550>",
            "--file",
            "capture.bin",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn parses_monitor_subcommand() {
        let cli = Cli::try_parse_from([
            "loadlink",
            "--format",
            "pretty",
            "monitor",
            "--port",
            "/dev/ttyUSB0",
            "--baud",
            "19200",
            "--count",
            "5",
        ])
        .expect("monitor args should parse");

        assert!(matches!(cli.format, Some(OutputFormat::Pretty)));
        match cli.command {
            Command::Monitor(args) => {
                assert_eq!(args.count, Some(5));
                assert_eq!(args.link.baud, 19_200);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
