//! Field reordering for the fast codec path.
//!
//! Fixed-width fields are written first so their offsets are predictable;
//! within each class the declaration order is kept.

use ir::Field;
use tracing::trace;

use crate::classifier::{classify, EncodingClass};
use crate::oracle::TypeOracle;
use crate::Result;

/// Stable partition of `fields`: fixed-width first, then variable-width.
///
/// Every field is classified before anything is returned, so a
/// classification failure on any field fails the whole record.
pub fn reorder_struct_fields<'f>(
    fields: &'f [Field],
    oracle: &dyn TypeOracle,
) -> Result<Vec<&'f Field>> {
    let classes = fields
        .iter()
        .map(|field| classify(field, oracle))
        .collect::<Result<Vec<EncodingClass>>>()?;

    let (fixed, variable): (Vec<_>, Vec<_>) =
        fields.iter().zip(&classes).partition(|(_, class)| class.is_fixed());

    trace!(fixed = fixed.len(), variable = variable.len(), "reordered record fields");

    Ok(fixed.into_iter().chain(variable).map(|(field, _)| field).collect())
}
