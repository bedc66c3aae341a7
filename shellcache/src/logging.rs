//! Logging infrastructure.
//!
//! Provides structured logging with file output and console output:
//! - Writes to the configured log file (cleared on session start)
//! - Also prints to stderr, keeping stdout free for command output
//! - Configurable via RUST_LOG environment variable

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard will flush and close the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize logging system.
///
/// Creates the log directory if needed, clears the previous log file, and
/// sets up dual output to the file and stderr.
///
/// # Arguments
///
/// * `log_file` - Log file path
/// * `default_level` - Filter used when `RUST_LOG` is not set (e.g. "info")
///
/// # Errors
///
/// Returns error if the log directory cannot be created or the log file
/// cannot be cleared.
pub fn init_logging(log_file: &Path, default_level: &str) -> Result<LoggingGuard, io::Error> {
    let (log_dir, file_name) = prepare_log_file(log_file)?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .compact();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Creates the parent directory and truncates the log file.
fn prepare_log_file(log_file: &Path) -> Result<(PathBuf, OsString), io::Error> {
    let file_name = log_file
        .file_name()
        .map(|name| name.to_os_string())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("log path has no file name: {}", log_file.display()),
            )
        })?;

    let log_dir = match log_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    fs::create_dir_all(&log_dir)?;
    fs::write(log_file, "")?;

    Ok((log_dir, file_name))
}
