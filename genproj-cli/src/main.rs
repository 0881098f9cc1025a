use anyhow::Context;
use clap::Parser;
use genproj_cli::Reporter;
use genproj_cli::commands::{BootstrapArgs, handle_bootstrap_command};
use genproj_cli::logging;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = BootstrapArgs::parse();
    let reporter = Reporter::new();

    let config = match args
        .resolve_home()
        .and_then(|home| args.load_config(&home).context("Failed to load configuration"))
    {
        Ok(config) => config,
        Err(e) => {
            reporter.unexpected(&e);
            return ExitCode::FAILURE;
        }
    };

    let log = match logging::init(config.log_file(), config.verbose()) {
        Ok(log) => log,
        Err(e) => {
            reporter.unexpected(&e);
            return ExitCode::FAILURE;
        }
    };

    // Dropping the run future restores the working directory and kills premake
    let code = tokio::select! {
        result = handle_bootstrap_command(config, reporter) => match result {
            Ok(true) => ExitCode::SUCCESS,
            Ok(false) => ExitCode::FAILURE,
            Err(e) => {
                reporter.unexpected(&e);
                ExitCode::FAILURE
            }
        },
        Ok(()) = tokio::signal::ctrl_c() => {
            reporter.canceled();
            ExitCode::FAILURE
        }
    };

    if let Err(e) = log.flush() {
        eprintln!("Failed to flush {}: {e}", log.path().display());
    }
    code
}
