//! CLI error handling with user-friendly messages.
//!
//! Every failure funnels into [`CliError`], which prints a message (plus a
//! hint for the common cases) and exits with status 1.

use std::fmt;
use std::io;
use std::process;

use glad_clusters::config::ConfigFileError;
use glad_clusters::dispatch::DispatchError;
use glad_clusters::worker::WorkerError;
use glad_clusters::RunError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Bad command-line value
    InvalidArgument(String),
    /// Config file could not be loaded
    ConfigFile(ConfigFileError),
    /// The run could not be set up
    Run(RunError),
    /// Writing results to stdout failed
    Output(io::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Run(RunError::WorkerSetup(WorkerError::Setup(_))) => {
                eprintln!();
                eprintln!("Set the worker endpoint with --endpoint <URL> or in the");
                eprintln!("[worker] section of the config file (endpoint = https://...).");
            }
            CliError::Run(RunError::Configuration(_)) => {
                eprintln!();
                eprintln!("Choose one location: --tile-bounds X1,Y1,X2,Y2, --bounds LON1,LAT1,LON2,LAT2,");
                eprintln!("--lon/--lat, or --x/--y.");
            }
            CliError::Run(RunError::Dispatch(DispatchError::TooManyTiles { .. })) => {
                eprintln!();
                eprintln!("Narrow the location or lower --zoom, or raise the limit with");
                eprintln!("--max-tiles or max_tiles in the [dispatch] section.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Run(e) => write!(f, "{}", e),
            CliError::Output(e) => write!(f, "Failed to write results: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Run(e) => Some(e),
            CliError::Output(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<RunError> for CliError {
    fn from(e: RunError) -> Self {
        CliError::Run(e)
    }
}
