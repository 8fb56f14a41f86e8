//! Tracing setup: console on stderr plus a non-blocking file appender.
//!
//! Stdout stays reserved for command output (`get-next` is consumed by an
//! external workflow driver), so the console layer writes to stderr.

use reel_inventory::Layout;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{AppError, Result};

/// Keeps the file appender's worker alive; drop flushes buffered records.
pub struct LogGuard {
    _file_guard: WorkerGuard,
}

pub fn init(layout: &Layout, verbose: bool, quiet: bool) -> Result<LogGuard> {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    std::fs::create_dir_all(layout.logs_dir())?;
    let log_path = layout.log_path();
    let file_name = log_path
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new("pipeline.log"));
    let file_appender = tracing_appender::rolling::never(layout.logs_dir(), file_name);
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .try_init()
        .map_err(|err| AppError::Logging(err.to_string()))?;

    Ok(LogGuard {
        _file_guard: file_guard,
    })
}
