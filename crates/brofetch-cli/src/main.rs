//! brofetch - browser-style HTTP requests from the command line.
//!
//! Main entry point for the `brofetch` binary.

use std::process::ExitCode;

use brofetch_log::spans::record_error;
use brofetch_log::{LogConfig, LogLevel};
use clap::Parser;

mod cli;
mod error;

use cli::Cli;
use error::CliError;

/// Application exit codes
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Success = 0,
    GeneralError = 1,
    ConfigError = 2,
    NetworkError = 4,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(&cli);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("failed to start async runtime: {e}");
            return Exit::GeneralError.into();
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => Exit::Success.into(),
        Err(e) => {
            record_error(&e);
            if !matches!(e, CliError::Network { .. }) {
                eprintln!("error: {e}");
            }
            e.exit().into()
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    brofetch_config::Environment::init()?;

    let options = cli.load_options()?;

    cli.execute(options).await
}

/// Verbosity flags win over `BROFETCH_LOG_LEVEL`.
fn init_logging(cli: &Cli) {
    let mut config = LogConfig::from_env();
    if cli.quiet {
        config.level = LogLevel::Error;
    } else if cli.verbose > 0 {
        config.level = LogLevel::from_verbosity(cli.verbose);
    }

    if let Err(e) = brofetch_log::init(config) {
        eprintln!("warning: {e}");
    }
}
