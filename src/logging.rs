//! Logging setup.
//!
//! Structured tracing with optional file output:
//! - Compact single-line stdout output for interactive runs
//! - Pretty multi-line file output under the configured directory
//! - Filterable via the RUST_LOG environment variable (default `info`)
//!
//! The file is truncated at session start, so each log covers exactly
//! one run.

use crate::config::LoggingSettings;
use std::fs;
use std::io;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping it flushes and closes the log file writer.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initializes the global tracing subscriber.
///
/// With a logging directory configured, output goes to both stdout and a
/// truncated session log file; without one, stdout only.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or the log
/// file cannot be truncated. Must be called at most once per process;
/// the global subscriber cannot be replaced.
pub fn init_logging(settings: &LoggingSettings) -> Result<LoggingGuard, io::Error> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_ansi(true)
        .compact();

    let file_guard = match &settings.directory {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            // Truncate the previous session's log.
            fs::write(dir.join(&settings.file_name), "")?;

            let file_appender = tracing_appender::rolling::never(dir, &settings.file_name);
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking_file)
                .with_ansi(false)
                .pretty();

            tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .with(file_layer)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .init();
            None
        }
    };

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}
