use std::process::ExitCode;

use anyhow::Error;
use clap::Parser;
use log::{error, info};

use patemon::{
    cli::{Cli, Commands},
    install,
    prompt::ConsolePrompter,
    vminstall, writesd, PATEMON_VERSION,
};
use patemon_api::error::ExitKind;

fn run_patemon(args: &Cli) -> Result<ExitKind, Error> {
    info!("patemon version: {PATEMON_VERSION}");

    match &args.command {
        Commands::WriteSd {
            mode,
            device,
            ddns,
            no_ddns,
            no_keys,
            asset_dir,
        } => writesd::execute(
            &writesd::Request {
                mode: *mode,
                device: device.clone(),
                ddns: *ddns,
                no_ddns: *no_ddns,
                no_keys: *no_keys,
                asset_dir: asset_dir.clone(),
            },
            &mut ConsolePrompter,
        ),

        Commands::Install { check } => install::execute(*check),

        Commands::VmInstall => vminstall::execute(),
    }
}

fn setup_logging(args: &Cli) {
    env_logger::builder()
        .format_timestamp(None)
        .filter_level(args.verbosity)
        .init();
}

fn main() -> ExitCode {
    let args = Cli::parse();

    setup_logging(&args);

    match run_patemon(&args) {
        Ok(ExitKind::Done) => ExitCode::SUCCESS,
        Ok(ExitKind::Aborted) => {
            println!("Exiting...");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("'{}' command failed: {e:?}", args.command);
            ExitCode::from(1)
        }
    }
}
