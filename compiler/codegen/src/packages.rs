//! Go packages of a document's includes.
//!
//! Types declared in an included document are referenced from the generated
//! body through that document's Go package. Those imports are part of the
//! body itself, like the runtime imports, so they bypass the
//! [`ImportFilter`](crate::ImportFilter).

use std::collections::BTreeMap;

use ir::FieldType;

use crate::utils::{go_identifier, go_type_name};
use crate::{CodegenError, Result};

/// Go package generated for one included document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoPackage {
    /// Import path; empty when the include shares the document's package
    pub path: String,
    /// Package name used as the qualifier
    pub name: String,
}

impl GoPackage {
    /// A package imported from `path`.
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self { path: path.into(), name: name.into() }
    }

    /// An include generated into the document's own package.
    pub fn local(name: impl Into<String>) -> Self { Self::new(String::new(), name) }

    /// Whether referencing this package needs an import.
    pub fn is_imported(&self) -> bool { !self.path.is_empty() }

    /// Alias to import the package under, empty when the name matches the
    /// last path segment.
    pub fn alias(&self) -> &str {
        let last = self.path.rsplit('/').next().unwrap_or_default();
        if last == self.name {
            ""
        } else {
            self.name.as_str()
        }
    }
}

/// Include packages of the document being rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageTable {
    document: String,
    includes: BTreeMap<String, GoPackage>,
}

/// Table used when the caller has no document context.
pub(crate) static UNBOUND: PackageTable =
    PackageTable { document: String::new(), includes: BTreeMap::new() };

impl PackageTable {
    /// Table for `document`, keyed by included filename.
    pub fn new(document: impl Into<String>, includes: BTreeMap<String, GoPackage>) -> Self {
        Self { document: document.into(), includes }
    }

    /// Packages the generated body must import, sorted by path.
    pub fn imports(&self) -> Vec<&GoPackage> {
        let mut imported: Vec<&GoPackage> =
            self.includes.values().filter(|pkg| pkg.is_imported()).collect();
        imported.sort_by(|a, b| a.path.cmp(&b.path));
        imported.dedup_by(|a, b| a.path == b.path);
        imported
    }

    /// Go expression naming the declared type `ty`, qualified by its
    /// package when it lives in another one.
    ///
    /// Types without a resolved declaring document keep their IDL spelling.
    pub fn type_name(&self, ty: &FieldType) -> Result<String> {
        match self.qualifier(ty)? {
            Some(Some(pkg)) => Ok(format!("{}.{}", pkg, local_identifier(ty))),
            Some(None) => Ok(local_identifier(ty)),
            None => Ok(go_type_name(&ty.name)),
        }
    }

    /// Constructor expression of the record type `ty`.
    pub fn constructor(&self, ty: &FieldType) -> Result<String> {
        match self.qualifier(ty)? {
            Some(Some(pkg)) => Ok(format!("{}.New{}", pkg, local_identifier(ty))),
            Some(None) => Ok(format!("New{}", local_identifier(ty))),
            None => Ok(crate::utils::go_constructor(&ty.name)),
        }
    }

    /// `None`: no document context. `Some(None)`: same package.
    fn qualifier(&self, ty: &FieldType) -> Result<Option<Option<&str>>> {
        let Some(reference) = ty.reference.as_ref() else {
            return Ok(None);
        };
        if self.document.is_empty() {
            return Ok(None);
        }
        if reference.document == self.document {
            return Ok(Some(None));
        }
        let pkg = self.includes.get(&reference.document).ok_or_else(|| {
            CodegenError::MissingData {
                template: "imports".into(),
                what: format!("package of included document {:?}", reference.document),
            }
        })?;
        Ok(Some(pkg.is_imported().then_some(pkg.name.as_str())))
    }
}

fn local_identifier(ty: &FieldType) -> String {
    go_identifier(ty.name.rsplit('.').next().unwrap_or(&ty.name))
}
