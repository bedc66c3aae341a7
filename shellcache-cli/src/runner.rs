//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization and the async runtime
//! so command handlers stay small.

use std::future::Future;
use std::path::{Path, PathBuf};

use tracing::info;

use shellcache::config::{config_file_path, ConfigFile};
use shellcache::logging::{init_logging, LoggingGuard};
use shellcache::network::AsyncReqwestClient;
use shellcache::worker::ServiceWorker;

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    config: ConfigFile,
    config_path: PathBuf,
    runtime: tokio::runtime::Runtime,
}

impl CliRunner {
    /// Load the config (defaults if the file is absent), start logging and
    /// build a multi-threaded runtime.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Config file override; `~/.shellcache/config.ini` if `None`
    /// * `verbose` - When true, logs at debug level unless RUST_LOG is set
    pub fn new(config_path: Option<PathBuf>, verbose: bool) -> Result<Self, CliError> {
        let config_path = config_path.unwrap_or_else(config_file_path);
        let config = ConfigFile::load_from(&config_path)?;

        let level = if verbose { "debug" } else { "info" };
        let logging_guard = init_logging(&config.logging.file, level)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)?;

        Ok(Self {
            logging_guard,
            config,
            config_path,
            runtime,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!(
            version = shellcache::version(),
            command,
            config = %self.config_path.display(),
            "shellcache starting"
        );
    }

    /// Run a future to completion on the runner's runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Build the worker described by the loaded config.
    pub fn worker(&self) -> Result<ServiceWorker<AsyncReqwestClient>, CliError> {
        Ok(self.block_on(ServiceWorker::from_config(&self.config))?)
    }
}
