use loadlink_frame::SendCommand;
use loadlink_telemetry::Link;
use loadlink_transport::Connector;

use crate::cmd::SendArgs;
use crate::exit::{link_error, CliError, CliResult, SUCCESS};
use crate::output::{print_sent, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let command = parse_command(&args.command)?;
    let target = args.link.target()?;
    let config = args.link.link_config()?;

    let mut link = Link::with_config(target, config);
    link.connect()
        .map_err(|err| link_error("connect failed", err))?;
    let sent = link.send(command, &args.data);
    let describe = link.connector().describe();
    link.disconnect();
    sent.map_err(|err| link_error("send failed", err))?;

    print_sent(command, &args.data, &describe, format);
    Ok(SUCCESS)
}

fn parse_command(input: &str) -> CliResult<SendCommand> {
    input.parse().map_err(|err| {
        CliError::usage(format!(
            "{err}; run `loadlink codes` for the list of commands"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_and_names() {
        assert_eq!(parse_command("astw").unwrap(), SendCommand::SetTareWeight);
        assert_eq!(
            parse_command("StartCalibrationX1").unwrap(),
            SendCommand::StartCalibrationX1
        );
        assert_eq!(
            parse_command("CA29").unwrap(),
            SendCommand::StartMedDynFactorCalibration
        );
    }

    #[test]
    fn unknown_command_is_usage_error() {
        let err = parse_command("XXXX").unwrap_err();
        assert_eq!(err.code, crate::exit::USAGE);
        assert!(err.message.contains("XXXX"));
    }
}
