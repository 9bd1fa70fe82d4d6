#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
//! Collection of utilities for the stubgen command-line front end.

use std::path::PathBuf;

use codegen::UnitKind;
use thiserror::Error;

/// Errors that can occur while running a stubgen command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The configuration could not be loaded or saved.
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    /// The logging subscriber could not be installed.
    #[error(transparent)]
    Logging(#[from] logging::LoggingError),
    /// Generation failed.
    #[error(transparent)]
    Pipeline(#[from] pipeline::PipelineError),
    /// `init-config` would overwrite an existing file.
    #[error("{} already exists (use --force to overwrite)", .0.display())]
    AlreadyExists(PathBuf),
    /// I/O error outside the pipeline.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Short label of a unit kind, as listed by `generate --dry-run`.
pub fn kind_label(kind: UnitKind) -> &'static str {
    match kind {
        UnitKind::Document => "document",
        UnitKind::Protection => "protection",
        UnitKind::IdlCopy => "idl-copy",
    }
}

/// Every error in the `source()` chain of `error`, outermost first.
pub fn error_chain(error: &dyn std::error::Error) -> Vec<String> {
    let mut chain = vec![error.to_string()];
    let mut source = error.source();
    while let Some(cause) = source {
        let message = cause.to_string();
        // Pipeline errors already embed their source in the message
        if !chain.last().is_some_and(|outer| outer.ends_with(&message)) {
            chain.push(message);
        }
        source = cause.source();
    }
    chain
}
