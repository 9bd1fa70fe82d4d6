//! Helper operations exposed to templates.
//!
//! Templates never classify types themselves; they go through
//! [`TemplateHelpers`], which wraps the parser's [`TypeOracle`] and the
//! run-wide toggles.

use std::collections::BTreeMap;

use ir::{Document, Field, FieldType};
use semantics::{extract_envelopes, EnvelopeMatch, EnvelopeRule, TypeOracle, DEFAULT_RULES};

use crate::packages::{PackageTable, UNBOUND};
use crate::{Result, VERSION};

/// Canonical Go primitive for a scalar type identifier.
///
/// Unknown identifiers map to the empty string.
pub fn type_id_to_go_type(type_id: &str) -> &'static str {
    match type_id {
        "Bool" => "bool",
        "Byte" => "int8",
        "I16" => "int16",
        "I32" => "int32",
        "I64" => "int64",
        "Double" => "float64",
        "String" => "string",
        "Binary" => "[]byte",
        _ => "",
    }
}

/// Local package names under which `imports` are visible, sorted.
///
/// An explicit alias wins; otherwise the lower-cased last path segment.
pub fn to_package_names(imports: &BTreeMap<String, String>) -> Vec<String> {
    let mut names: Vec<String> = imports
        .iter()
        .map(|(path, alias)| {
            if alias.is_empty() {
                path.rsplit('/').next().unwrap_or(path).to_lowercase()
            } else {
                alias.clone()
            }
        })
        .collect();
    names.sort();
    names
}

/// Helper functions bound to one generation run.
#[derive(Clone, Copy)]
pub struct TemplateHelpers<'a> {
    oracle: &'a dyn TypeOracle,
    envelope_rules: &'a [EnvelopeRule],
    packages: &'a PackageTable,
    fast_api: bool,
}

impl<'a> TemplateHelpers<'a> {
    /// Create helpers answering type questions through `oracle`.
    pub fn new(oracle: &'a dyn TypeOracle, fast_api: bool) -> Self {
        Self { oracle, envelope_rules: DEFAULT_RULES, packages: &UNBOUND, fast_api }
    }

    /// Replace the envelope rule table.
    pub fn with_envelope_rules(mut self, rules: &'a [EnvelopeRule]) -> Self {
        self.envelope_rules = rules;
        self
    }

    /// Qualify declared types through the include packages of the document
    /// being rendered.
    pub fn with_packages(mut self, packages: &'a PackageTable) -> Self {
        self.packages = packages;
        self
    }

    /// Include packages of the document being rendered.
    pub fn packages(&self) -> &'a PackageTable { self.packages }

    /// Go expression naming the declared type `ty`.
    pub fn go_type_name(&self, ty: &FieldType) -> Result<String> { self.packages.type_name(ty) }

    /// Constructor expression of the record type `ty`.
    pub fn go_constructor(&self, ty: &FieldType) -> Result<String> {
        self.packages.constructor(ty)
    }

    /// Fields of a record, fixed-width first (stable).
    pub fn reorder_struct_fields<'f>(&self, fields: &'f [Field]) -> Result<Vec<&'f Field>> {
        Ok(semantics::reorder_struct_fields(fields, self.oracle)?)
    }

    /// Records of `doc` carrying request/response envelopes.
    pub fn filter_base<'d>(&self, doc: &'d Document) -> EnvelopeMatch<'d> {
        extract_envelopes(doc.struct_like(), self.envelope_rules, self.oracle)
    }

    /// Whether `ty` is a binary or string scalar.
    pub fn is_binary_or_string_type(&self, ty: &FieldType) -> Result<bool> {
        Ok(self.oracle.is_binary_or_string(ty)?)
    }

    /// Whether `ty` has a statically known encoded length.
    pub fn is_fixed_length(&self, ty: &FieldType) -> Result<bool> {
        Ok(self.oracle.is_fixed_length(ty)?)
    }

    /// The non-alias type behind `ty`.
    pub fn resolve_alias(&self, ty: &FieldType) -> Result<FieldType> {
        Ok(self.oracle.resolve_alias(ty)?)
    }

    /// Whether the high-performance codec path is emitted.
    pub fn generate_fast_apis(&self) -> bool { self.fast_api }

    /// Generator version string.
    pub fn version(&self) -> &'static str { VERSION }

    /// See [`type_id_to_go_type`].
    pub fn type_id_to_go_type(&self, type_id: &str) -> &'static str { type_id_to_go_type(type_id) }

    /// See [`to_package_names`].
    pub fn to_package_names(&self, imports: &BTreeMap<String, String>) -> Vec<String> {
        to_package_names(imports)
    }
}
