//! Logging setup for the idb-manager binary
//!
//! Logs go to a file so they never mix with command output on stdout.
//! The level is taken from `RUST_LOG` and defaults to `info`; the format is
//! plain text or JSON lines.

use std::fs;
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Default filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard flushes and closes the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize file logging at `log_path`, creating its directory if needed
///
/// With `json`, every event is written as one JSON object per line.
pub fn init_logging(log_path: &Path, json: bool) -> Result<LoggingGuard, io::Error> {
    let log_dir = log_path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(log_dir)?;

    let file_name = log_path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "log path has no file name"))?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let (json_writer, text_writer) = if json {
        (Some(non_blocking_file), None)
    } else {
        (None, Some(non_blocking_file))
    };

    let json_layer = json_writer.map(|writer| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .with_ansi(false)
    });
    let text_layer = text_writer.map(|writer| {
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(env_filter())
        .with(json_layer)
        .with(text_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}
