//! Import-set filtering.
//!
//! The scope resolver produces every import a document could need. Some of
//! those must not appear in the patch file: the generated body either refers
//! to them through a hard-coded alias, or never uses them at all.

use std::collections::BTreeMap;

use tracing::trace;

/// Legacy runtime package. The templates import it under a fixed alias.
pub const LEGACY_RUNTIME_IMPORT: &str = "github.com/apache/thrift/lib/go/thrift";

/// Namespace of the IDL compiler's own generator-support packages.
pub const GENERATOR_SUPPORT_PREFIX: &str = "github.com/cloudwego/thriftgo";

/// Prunes a resolved import mapping (`path -> alias`).
#[derive(Debug, Clone, Default)]
pub struct ImportFilter {
    module: String,
}

impl ImportFilter {
    /// Create a filter for the generation's own module root (may be empty).
    pub fn new(module: impl Into<String>) -> Self {
        Self { module: module.into().trim_end_matches('/').to_string() }
    }

    /// The configured module root.
    pub fn module(&self) -> &str { &self.module }

    /// Whether `path` must be dropped from the generated import block.
    ///
    /// Dropped: paths inside the module root, the legacy runtime, anything
    /// under the generator-support namespace, and paths without a dot
    /// (standard library).
    pub fn is_excluded(&self, path: &str) -> bool {
        self.is_local(path)
            || path == LEGACY_RUNTIME_IMPORT
            || path.starts_with(GENERATOR_SUPPORT_PREFIX)
            || !path.contains('.')
    }

    /// Return a copy of `imports` without the excluded entries.
    pub fn filter(&self, imports: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        imports
            .iter()
            .filter(|(path, _)| {
                let excluded = self.is_excluded(path);
                if excluded {
                    trace!(import = %path, "dropping import");
                }
                !excluded
            })
            .map(|(path, alias)| (path.clone(), alias.clone()))
            .collect()
    }

    fn is_local(&self, path: &str) -> bool {
        if self.module.is_empty() {
            return false;
        }
        path == self.module
            || path.strip_prefix(self.module.as_str()).is_some_and(|rest| rest.starts_with('/'))
    }
}
