// Log output for the daemon
//
// Every event goes to stdout and, when it can be opened, to an append-only
// log file. Both sinks use the same line shape:
//
//   2024-05-01 12:00:00.123  INFO IP address unchanged, no update needed ...

use anyhow::Result;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing::level_filters::LevelFilter;
use tracing::warn;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::format::{DefaultFields, Format, Full};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::prelude::*;
use v6ddns_core::LogConfig;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Map a level name to a filter
///
/// Matching is case-insensitive; unknown names yield `None`.
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    match name.to_lowercase().as_str() {
        "trace" => Some(LevelFilter::TRACE),
        "debug" => Some(LevelFilter::DEBUG),
        "info" => Some(LevelFilter::INFO),
        "warn" | "warning" => Some(LevelFilter::WARN),
        "error" => Some(LevelFilter::ERROR),
        _ => None,
    }
}

/// Open `path` for appending, creating it if needed
pub fn open_log_file(path: impl AsRef<Path>) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Formatting layer for the log file
pub type FileLayer<S> = fmt::Layer<S, DefaultFields, Format<Full, ChronoLocal>, Mutex<File>>;

/// Formatting layer writing plain (uncoloured) lines to `file`
pub fn file_layer<S>(file: File) -> FileLayer<S> {
    fmt::layer()
        .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
}

/// Install the global subscriber
///
/// Problems with the requested level or the log file are not fatal: they
/// are reported as warnings once stdout logging is up.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let level = parse_level(&config.level);

    let stdout_layer = fmt::layer()
        .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
        .with_target(false);

    let (file_sink, file_error) = match open_log_file(&config.file) {
        Ok(file) => (Some(file_layer(file)), None),
        Err(e) => (None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(level.unwrap_or(LevelFilter::INFO))
        .with(stdout_layer)
        .with(file_sink)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    if level.is_none() {
        warn!(
            "Unknown log level '{}', falling back to info. \
            Valid levels: trace, debug, info, warn, error",
            config.level
        );
    }

    if let Some(e) = file_error {
        warn!(
            "Cannot open log file {}: {}. Logging to stdout only",
            config.file, e
        );
    }

    Ok(())
}
