//! Per-document scope resolution.
//!
//! The driver never derives names itself. A [`ScopeResolver`] turns a
//! document into a scope, and the scope answers for its package name, its
//! output path and its import set. [`NamespaceResolver`] derives all three
//! from the document's declared namespace.

use std::collections::BTreeMap;
use std::path::PathBuf;

use codegen::{GoPackage, LEGACY_RUNTIME_IMPORT};
use ir::{Document, DocumentTree};
use regex::Regex;
use thiserror::Error;

/// Scope resolution collaborator.
pub trait ScopeResolver {
    /// Per-document scope
    type Scope;
    /// Resolution failure
    type Error: std::error::Error + Send + Sync + 'static;

    /// Build the scope of `document`.
    fn build_scope(&self, document: &Document) -> Result<Self::Scope, Self::Error>;

    /// Target package name of the scope.
    fn package_name(&self, scope: &Self::Scope) -> Result<String, Self::Error>;

    /// Output path of the scope's generated file, relative to the output root.
    fn file_path(&self, scope: &Self::Scope) -> Result<PathBuf, Self::Error>;

    /// Every import the scope's generated file could need, `path -> alias`.
    fn resolve_imports(&self, scope: &Self::Scope)
        -> Result<BTreeMap<String, String>, Self::Error>;

    /// Go package of every document the scope includes, keyed by filename.
    ///
    /// Types declared in an include are qualified through these packages.
    /// Without them, declared types keep their IDL spelling.
    fn include_packages(
        &self,
        _scope: &Self::Scope,
    ) -> Result<BTreeMap<String, GoPackage>, Self::Error> {
        Ok(BTreeMap::new())
    }
}

/// Errors raised by [`NamespaceResolver`].
#[derive(Debug, Error)]
pub enum ScopeError {
    /// A namespace segment is empty or has no identifier characters.
    #[error("namespace {0:?} cannot be mapped to a package")]
    InvalidNamespace(String),
    /// An include names a document outside the tree.
    #[error("include {0:?} is not part of the document tree")]
    UnknownInclude(String),
    /// The identifier pattern failed to compile.
    #[error(transparent)]
    Pattern(#[from] regex::Error),
}

/// Scope derived from a document's namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceScope {
    /// Document filename
    pub filename: String,
    /// Output directory segments, one per namespace segment
    pub directory: Vec<String>,
    /// Go package name
    pub package: String,
    /// File stem of the document
    pub stem: String,
    /// Filenames of the included documents
    pub includes: Vec<String>,
}

/// [`ScopeResolver`] mapping namespaces onto directories and packages.
///
/// `namespace go example.user` in `idl/user.thrift` yields package `user`
/// and output path `example/user/user.go`. Documents without a namespace
/// for the target language use their file stem.
pub struct NamespaceResolver<'t> {
    tree: &'t DocumentTree,
    module: String,
    language: String,
    path_unsafe: Regex,
    non_identifier: Regex,
}

impl<'t> NamespaceResolver<'t> {
    /// Create a resolver rooting include imports at `module` (may be empty).
    pub fn new(
        tree: &'t DocumentTree,
        module: impl Into<String>,
        language: impl Into<String>,
    ) -> Result<Self, ScopeError> {
        Ok(Self {
            tree,
            module: module.into().trim_end_matches('/').to_string(),
            language: language.into(),
            path_unsafe: Regex::new(r"[^A-Za-z0-9_\-]")?,
            non_identifier: Regex::new(r"[^a-z0-9_]")?,
        })
    }

    fn scope_of(&self, document: &Document) -> Result<NamespaceScope, ScopeError> {
        let namespace = document.namespace_or_reference_name(&self.language);
        let directory = namespace
            .split('.')
            .map(|segment| self.path_unsafe.replace_all(segment, "_").into_owned())
            .collect::<Vec<_>>();
        if directory.iter().any(|segment| segment.trim_matches('_').is_empty()) {
            return Err(ScopeError::InvalidNamespace(namespace.to_string()));
        }

        let last = directory.last().map(String::as_str).unwrap_or_default();
        Ok(NamespaceScope {
            filename: document.filename.clone(),
            package: self.package_identifier(last),
            directory,
            stem: document.reference_name().to_string(),
            includes: document.includes.clone(),
        })
    }

    fn package_identifier(&self, segment: &str) -> String {
        let lowered = segment.to_lowercase();
        let ident = self.non_identifier.replace_all(&lowered, "_").into_owned();
        if ident.starts_with(|c: char| c.is_ascii_digit()) {
            format!("_{}", ident)
        } else {
            ident
        }
    }

    fn import_path(&self, directory: &[String]) -> String {
        let relative = directory.join("/");
        if self.module.is_empty() {
            relative
        } else {
            format!("{}/{}", self.module, relative)
        }
    }
}

impl ScopeResolver for NamespaceResolver<'_> {
    type Scope = NamespaceScope;
    type Error = ScopeError;

    fn build_scope(&self, document: &Document) -> Result<NamespaceScope, ScopeError> {
        self.scope_of(document)
    }

    fn package_name(&self, scope: &NamespaceScope) -> Result<String, ScopeError> {
        Ok(scope.package.clone())
    }

    fn file_path(&self, scope: &NamespaceScope) -> Result<PathBuf, ScopeError> {
        let mut path: PathBuf = scope.directory.iter().collect();
        path.push(format!("{}.go", scope.stem));
        Ok(path)
    }

    fn resolve_imports(
        &self,
        scope: &NamespaceScope,
    ) -> Result<BTreeMap<String, String>, ScopeError> {
        let mut imports = BTreeMap::new();
        imports.insert("fmt".to_string(), String::new());
        imports.insert("strings".to_string(), String::new());
        imports.insert(LEGACY_RUNTIME_IMPORT.to_string(), "thrift".to_string());

        for pkg in self.include_packages(scope)?.into_values() {
            if pkg.is_imported() {
                imports.insert(pkg.path.clone(), pkg.alias().to_string());
            }
        }
        Ok(imports)
    }

    fn include_packages(
        &self,
        scope: &NamespaceScope,
    ) -> Result<BTreeMap<String, GoPackage>, ScopeError> {
        let mut packages = BTreeMap::new();
        for include in &scope.includes {
            let document = self
                .tree
                .get(include)
                .ok_or_else(|| ScopeError::UnknownInclude(include.clone()))?;
            let included = self.scope_of(document)?;
            let pkg = if included.directory == scope.directory {
                GoPackage::local(included.package)
            } else {
                GoPackage::new(self.import_path(&included.directory), included.package)
            };
            packages.insert(include.clone(), pkg);
        }
        Ok(packages)
    }
}
