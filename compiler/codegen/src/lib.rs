#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Code generation for the stub patcher.
//!
//! This crate turns one parsed IDL document plus its resolved scope into the
//! text of a generated Go source file. It focuses solely on rendering:
//! filtering the import set, exposing helper operations to templates, and the
//! built-in templates themselves.
//!
//! Traversal, output naming and error attribution reside in the pipeline crate.

pub mod helpers;
pub mod imports;
pub mod output;
pub mod packages;
pub mod protection;
pub mod templates;
pub mod utils;

use thiserror::Error;

pub use helpers::{type_id_to_go_type, TemplateHelpers};
pub use imports::{ImportFilter, GENERATOR_SUPPORT_PREFIX, LEGACY_RUNTIME_IMPORT};
pub use output::{clean_generated_source, write_units, OutputUnit, UnitKind};
pub use packages::{GoPackage, PackageTable};
pub use protection::ProtectionSymbol;
pub use templates::{FileData, GoTemplates, RenderContext, TemplateEngine};

/// Error type for code generation operations in this crate.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Underlying I/O error while writing generated files.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Formatting error when building generated source.
    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),
    /// A type predicate failed while a template was being rendered.
    #[error(transparent)]
    Classification(#[from] semantics::SemanticError),
    /// No template is registered under the requested name.
    #[error("no template named {0:?}")]
    UnknownTemplate(String),
    /// A template was rendered without the data it needs.
    #[error("template {template:?}: missing {what}")]
    MissingData {
        /// Template being rendered
        template: String,
        /// Description of the missing input
        what: String,
    },
}

/// Convenient result type for codegen functions in this crate.
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Version string stamped into generated files.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
