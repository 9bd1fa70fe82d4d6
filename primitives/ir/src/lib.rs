#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Stubgen Intermediate Representation (IR)
//!
//! This crate defines the parsed IDL document tree that the code generator
//! consumes. The IR is produced by an external parser/type-checker: every
//! document, record and field is read-only once it reaches this crate, and
//! type references have already been resolved to the document declaring them.

pub mod idl;
pub mod tree;

use thiserror::Error;

// Re-export the main IR types for convenience
pub use idl::*;
pub use tree::{DepthFirst, DocumentTree};

/// Errors raised while loading or walking a document tree.
#[derive(Debug, Error)]
pub enum IrError {
    /// An include edge names a document that is not part of the tree.
    #[error("document {from:?} includes unknown document {missing:?}")]
    UnknownDocument {
        /// Filename of the including document.
        from: String,
        /// Filename that could not be found.
        missing: String,
    },
    /// A root names a document that is not part of the tree.
    #[error("unknown root document {0:?}")]
    UnknownRoot(String),
    /// Two documents share the same filename.
    #[error("duplicate document {0:?}")]
    DuplicateDocument(String),
    /// Underlying I/O error while reading or writing a tree file.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// JSON serialization/deserialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Convenient result type for IR operations.
pub type Result<T> = std::result::Result<T, IrError>;
