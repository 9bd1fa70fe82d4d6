//! Encoding-width classification.

use ir::Field;

use crate::oracle::TypeOracle;
use crate::Result;

/// Whether a field's encoded size is known before its value is seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodingClass {
    /// Encoded length is determined by the declared type alone
    FixedWidth,
    /// Encoded length depends on the runtime value
    VariableWidth,
}

impl EncodingClass {
    /// Whether this is [`EncodingClass::FixedWidth`].
    pub fn is_fixed(self) -> bool { self == EncodingClass::FixedWidth }
}

/// Classify `field` using the oracle's fixed-length predicate.
///
/// Oracle errors are returned unchanged.
pub fn classify(field: &Field, oracle: &dyn TypeOracle) -> Result<EncodingClass> {
    if oracle.is_fixed_length(&field.field_type)? {
        Ok(EncodingClass::FixedWidth)
    } else {
        Ok(EncodingClass::VariableWidth)
    }
}
