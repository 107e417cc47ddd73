use loadlink_frame::{ReceiveCode, SendCommand};

use crate::cmd::CodesArgs;
use crate::exit::{CliError, CliResult, SUCCESS};
use crate::output::{print_codes, OutputFormat};

pub fn run(args: CodesArgs, format: OutputFormat) -> CliResult<i32> {
    let Some(needle) = args.code else {
        print_codes(&ReceiveCode::ALL, &SendCommand::ALL, format);
        return Ok(SUCCESS);
    };

    let (receive, send) = lookup(&needle)?;
    print_codes(&receive, &send, format);
    Ok(SUCCESS)
}

/// Resolve a wire code or name against both tables.
///
/// Receive and send codes never collide, so at most one side matches.
fn lookup(needle: &str) -> CliResult<(Vec<ReceiveCode>, Vec<SendCommand>)> {
    if let Ok(code) = needle.parse::<ReceiveCode>() {
        return Ok((vec![code], Vec::new()));
    }
    needle
        .parse::<SendCommand>()
        .map(|cmd| (Vec::new(), vec![cmd]))
        .map_err(|err| CliError::usage(format!("{err}; run `loadlink codes` for the full list")))
}
