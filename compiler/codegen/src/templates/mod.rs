//! Template engine seam and render context.
//!
//! A [`TemplateEngine`] renders named templates against a [`RenderContext`].
//! The context bundles the per-document [`FileData`] with the run's
//! [`TemplateHelpers`]; sub-templates that work on one record receive a
//! context narrowed with [`RenderContext::with_record`].

mod codec;
mod go;

use std::collections::BTreeMap;

use ir::{Document, StructLike};

pub use go::GoTemplates;

use crate::helpers::TemplateHelpers;
use crate::protection::ProtectionSymbol;
use crate::Result;

/// Per-document data handed to the `file` template.
#[derive(Debug, Clone)]
pub struct FileData<'a> {
    /// Document being rendered
    pub document: &'a Document,
    /// Target package name
    pub pkg_name: String,
    /// Filtered imports, `path -> alias`
    pub imports: BTreeMap<String, String>,
    /// Package protection symbol
    pub protection: ProtectionSymbol,
}

impl<'a> FileData<'a> {
    /// Create file data with the default protection symbol.
    pub fn new(
        document: &'a Document,
        pkg_name: impl Into<String>,
        imports: BTreeMap<String, String>,
    ) -> Self {
        Self {
            document,
            pkg_name: pkg_name.into(),
            imports,
            protection: ProtectionSymbol::default(),
        }
    }

    /// Use `protection` as the package protection symbol.
    pub fn with_protection(mut self, protection: ProtectionSymbol) -> Self {
        self.protection = protection;
        self
    }
}

/// Everything a template can see.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    /// Per-document data
    pub data: &'a FileData<'a>,
    /// Helper operations
    pub helpers: TemplateHelpers<'a>,
    /// Record in focus, for record-level sub-templates
    pub record: Option<&'a StructLike>,
}

impl<'a> RenderContext<'a> {
    /// Create a document-level context.
    pub fn new(data: &'a FileData<'a>, helpers: TemplateHelpers<'a>) -> Self {
        Self { data, helpers, record: None }
    }

    /// The same context focused on `record`.
    pub fn with_record(&self, record: &'a StructLike) -> Self {
        Self { record: Some(record), ..*self }
    }
}

/// A render engine accepting a template name and a context.
pub trait TemplateEngine {
    /// Render template `name` into `out`.
    fn render(&self, name: &str, ctx: &RenderContext<'_>, out: &mut String) -> Result<()>;

    /// Render template `name` into a fresh string.
    fn render_to_string(&self, name: &str, ctx: &RenderContext<'_>) -> Result<String> {
        let mut out = String::new();
        self.render(name, ctx, &mut out)?;
        Ok(out)
    }
}
