#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Logging setup for the stubgen binaries.
//!
//! Library crates only emit `tracing` events. Binaries call [`init`] once to
//! install a subscriber; `RUST_LOG` overrides the configured level.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The configured level is not one of off/error/warn/info/debug/trace
    #[error("invalid log level {0:?}")]
    InvalidLevel(String),
    /// The log file could not be opened
    #[error("failed to open log file: {0}")]
    Io(#[from] std::io::Error),
    /// A global subscriber is already installed
    #[error("logging is already initialized")]
    AlreadyInitialized,
}

/// Result type for logging setup.
pub type Result<T> = std::result::Result<T, LoggingError>;

/// Parse a level name (case-insensitive).
pub fn parse_level(level: &str) -> Result<LevelFilter> {
    level.trim().parse().map_err(|_| LoggingError::InvalidLevel(level.to_string()))
}

/// Build the filter: `RUST_LOG` directives when set, otherwise `level`.
pub fn env_filter(level: &str) -> Result<EnvFilter> {
    let default = parse_level(level)?;
    Ok(EnvFilter::builder().with_default_directive(default.into()).from_env_lossy())
}

/// Install the global subscriber, writing to `file` (appending) or stderr.
pub fn init(level: &str, file: Option<&Path>) -> Result<()> {
    let filter = env_filter(level)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let installed = match file {
        Some(path) => {
            let log_file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(log_file)).try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    installed.map_err(|_| LoggingError::AlreadyInitialized)
}
