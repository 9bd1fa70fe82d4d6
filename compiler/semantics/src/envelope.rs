//! Request/response envelope recognition.
//!
//! A record is an envelope carrier when one of its fields matches a rule by
//! unexported field name and exact declared type name. The match is purely
//! conventional: projects that spell the envelope differently get no match.

use ir::{Field, StructLike};
use tracing::trace;

use crate::oracle::TypeOracle;

/// Role an envelope field plays in an RPC exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvelopeRole {
    /// Request metadata (`base: base.Base`)
    Request,
    /// Response metadata (`baseResp: base.BaseResp`)
    Response,
}

/// `{field name, exact type name} -> role`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeRule {
    /// Role assigned on match
    pub role: EnvelopeRole,
    /// Field name after unexporting, compared case-sensitively
    pub field_name: &'static str,
    /// Fully qualified declared type name, compared exactly
    pub type_name: &'static str,
}

/// The conventional request and response envelopes.
pub const DEFAULT_RULES: &[EnvelopeRule] = &[
    EnvelopeRule { role: EnvelopeRole::Request, field_name: "base", type_name: "base.Base" },
    EnvelopeRule {
        role: EnvelopeRole::Response,
        field_name: "baseResp",
        type_name: "base.BaseResp",
    },
];

/// A record carrying an envelope, with the field that matched.
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeHit<'a> {
    /// Record containing the envelope field
    pub record: &'a StructLike,
    /// First field of the record matching the rule
    pub field: &'a Field,
}

/// Envelope carriers of one document, in record declaration order.
#[derive(Debug, Clone, Default)]
pub struct EnvelopeMatch<'a> {
    /// Records with a request envelope field
    pub requests: Vec<EnvelopeHit<'a>>,
    /// Records with a response envelope field
    pub responses: Vec<EnvelopeHit<'a>>,
}

impl EnvelopeRule {
    /// Whether `field` matches this rule.
    pub fn matches(&self, field: &Field, oracle: &dyn TypeOracle) -> bool {
        field.field_type.name == self.type_name && oracle.unexport(&field.name) == self.field_name
    }
}

impl<'a> EnvelopeMatch<'a> {
    /// Whether no record matched any rule.
    pub fn is_empty(&self) -> bool { self.requests.is_empty() && self.responses.is_empty() }

    fn hits_mut(&mut self, role: EnvelopeRole) -> &mut Vec<EnvelopeHit<'a>> {
        match role {
            EnvelopeRole::Request => &mut self.requests,
            EnvelopeRole::Response => &mut self.responses,
        }
    }
}

/// Scan `records` for envelope fields.
///
/// A record is listed at most once per role, even when several of its
/// fields match the same rule.
pub fn extract_envelopes<'a>(
    records: &'a [StructLike],
    rules: &[EnvelopeRule],
    oracle: &dyn TypeOracle,
) -> EnvelopeMatch<'a> {
    let mut found = EnvelopeMatch::default();
    for record in records {
        for rule in rules {
            let hits = found.hits_mut(rule.role);
            if hits.iter().any(|hit| std::ptr::eq(hit.record, record)) {
                continue;
            }
            if let Some(field) = record.fields.iter().find(|f| rule.matches(f, oracle)) {
                trace!(record = %record.name, field = %field.name, role = ?rule.role, "envelope");
                hits.push(EnvelopeHit { record, field });
            }
        }
    }
    found
}
