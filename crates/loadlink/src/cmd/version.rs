use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("loadlink {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: loadlink");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("LOADLINK_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "build_profile: {}",
        option_env!("LOADLINK_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "features: telemetry={}, async={}, cli=true",
        cfg!(feature = "telemetry"),
        cfg!(feature = "async")
    );
    println!(
        "link_defaults: {} 8N1, write timeout {} ms",
        loadlink_transport::DEFAULT_BAUD_RATE,
        loadlink_frame::DEFAULT_WRITE_TIMEOUT.as_millis()
    );

    Ok(SUCCESS)
}
