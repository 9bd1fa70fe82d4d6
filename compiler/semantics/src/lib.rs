#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Semantic helpers over parsed IDL records.
//!
//! Classifies fields by encoding width, reorders record fields so that
//! statically-sized fields come first, and recognises request/response
//! envelope fields. Everything here is a pure function of the IR and a
//! [`TypeOracle`].

/// Encoding-width classification of fields
pub mod classifier;
/// Request/response envelope recognition
pub mod envelope;
/// Type predicates supplied by the parser
pub mod oracle;
/// Stable fixed-width-first field ordering
pub mod reorder;

pub use classifier::{classify, EncodingClass};
pub use envelope::{
    extract_envelopes, EnvelopeHit, EnvelopeMatch, EnvelopeRole, EnvelopeRule, DEFAULT_RULES,
};
pub use oracle::{unexport, StructuralOracle, TypeOracle};
pub use reorder::reorder_struct_fields;

/// Errors that can occur while classifying types.
#[derive(Debug, thiserror::Error)]
pub enum SemanticError {
    /// A named type does not resolve to any declaration.
    #[error("unresolved type {0:?}")]
    UnresolvedType(String),
    /// The type graph refers back to itself through by-value members.
    #[error("cyclic type graph through {0:?}")]
    CyclicType(String),
    /// A container type is missing its element or key type.
    #[error("malformed type {0:?}: {1}")]
    MalformedType(String, String),
}

/// Result type for semantic operations.
pub type Result<T> = std::result::Result<T, SemanticError>;
