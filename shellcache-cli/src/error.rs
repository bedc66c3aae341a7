//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use shellcache::cache::{CacheError, InstallError};
use shellcache::config::ConfigFileError;
use shellcache::router::FetchError;
use shellcache::worker::WorkerError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to start the async runtime
    Runtime(std::io::Error),
    /// Failed to assemble the worker
    Worker(WorkerError),
    /// Install aborted
    Install(InstallError),
    /// Cache store error
    Cache(CacheError),
    /// Request could not be answered
    Fetch(FetchError),
    /// Failed to write output file
    FileWrite { path: String, error: std::io::Error },
    /// Failed to encode command output
    Output(String),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Install(InstallError::StaticAsset { .. }) => {
                eprintln!();
                eprintln!("Every path in [assets] must be reachable for install to succeed.");
                eprintln!("Check base_url and paths in the config file, then retry.");
            }
            CliError::Cache(CacheError::NotInstalled(_)) => {
                eprintln!();
                eprintln!("Run 'shellcache install' before activating.");
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
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Worker(e) => write!(f, "Failed to start worker: {}", e),
            CliError::Install(e) => write!(f, "Install failed: {}", e),
            CliError::Cache(e) => write!(f, "Cache error: {}", e),
            CliError::Fetch(e) => write!(f, "Fetch failed: {}", e),
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path, error)
            }
            CliError::Output(msg) => write!(f, "Failed to encode output: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Runtime(e) => Some(e),
            CliError::Worker(e) => Some(e),
            CliError::Install(e) => Some(e),
            CliError::Cache(e) => Some(e),
            CliError::Fetch(e) => Some(e),
            CliError::FileWrite { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<WorkerError> for CliError {
    fn from(e: WorkerError) -> Self {
        CliError::Worker(e)
    }
}

impl From<InstallError> for CliError {
    fn from(e: InstallError) -> Self {
        CliError::Install(e)
    }
}

impl From<CacheError> for CliError {
    fn from(e: CacheError) -> Self {
        CliError::Cache(e)
    }
}

impl From<FetchError> for CliError {
    fn from(e: FetchError) -> Self {
        CliError::Fetch(e)
    }
}
