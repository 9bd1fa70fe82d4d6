#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Generation pipeline for the stub patcher.
//!
//! Walks a parsed document forest, resolves each document's scope, plans its
//! output files and renders the patch source, collecting the result as an
//! ordered list of [`OutputUnit`]s. Writing them to storage is left to the
//! caller.
//!
//! ## Module Organization
//!
//! - `options` - Run-wide settings, built from the TOML configuration
//! - `scope` - The per-document scope resolver seam and its namespace-based implementation
//! - `output_plan` - Output file naming and per-directory protection files
//! - `patcher` - The generation driver
//! - `orchestration` - Load a forest from disk, run the driver, persist the units

use std::path::PathBuf;

pub use codegen::{OutputUnit, UnitKind};
use thiserror::Error;

/// Boxed error raised by a [`ScopeResolver`](scope::ScopeResolver).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Convenient result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while running the generation pipeline.
///
/// Every per-document failure carries the filename of the document being
/// processed and aborts the whole run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Namespace, package or output path could not be computed.
    #[error("{filename}: cannot resolve scope: {source}")]
    ScopeResolution {
        /// Offending document
        filename: String,
        /// Resolver error
        #[source]
        source: BoxError,
    },
    /// The document's import set could not be computed.
    #[error("{filename}: cannot resolve imports: {source}")]
    ImportResolution {
        /// Offending document
        filename: String,
        /// Resolver error
        #[source]
        source: BoxError,
    },
    /// A fixed-width or binary/string predicate failed.
    #[error("{filename}: cannot classify types: {source}")]
    TypeClassification {
        /// Offending document
        filename: String,
        /// Classification error
        #[source]
        source: semantics::SemanticError,
    },
    /// Template execution failed.
    #[error("{filename}: render failed: {source}")]
    Render {
        /// Offending document
        filename: String,
        /// Template error
        #[source]
        source: codegen::CodegenError,
    },
    /// The IDL source could not be read for verbatim copy.
    #[error("{filename}: cannot read source: {source}")]
    SourceRead {
        /// Offending document
        filename: String,
        /// Read error
        #[source]
        source: std::io::Error,
    },
    /// Two documents were planned onto the same output file.
    #[error("{second}: output {} already produced for {first}", .path.display())]
    DuplicateOutput {
        /// Contested output path
        path: PathBuf,
        /// Document that claimed the path first
        first: String,
        /// Document that collided with it
        second: String,
    },
    /// The document forest could not be loaded.
    #[error(transparent)]
    Tree(#[from] ir::IrError),
    /// I/O error while writing generated files.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub mod options;
pub mod orchestration;
pub mod output_plan;
pub mod patcher;
pub mod scope;

pub use options::PatchOptions;
pub use orchestration::{generate_from_file, write_output};
pub use output_plan::{OutputPlanner, PlannedOutput};
pub use patcher::Patcher;
pub use scope::{NamespaceResolver, NamespaceScope, ScopeError, ScopeResolver};
