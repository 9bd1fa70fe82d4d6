//! Generation driver.
//!
//! Visits every document of the forest once, depth-first, and turns each
//! into its output units: an optional protection file, the rendered patch
//! file, and an optional verbatim copy of the IDL source. The first failure
//! aborts the run; no partial unit list is returned.

use std::fs;

use codegen::{
    CodegenError, FileData, GoTemplates, ImportFilter, OutputUnit, PackageTable, RenderContext,
    TemplateEngine, TemplateHelpers, UnitKind,
};
use ir::{Document, DocumentTree};
use semantics::TypeOracle;
use tracing::{debug, info};

use crate::options::PatchOptions;
use crate::output_plan::OutputPlanner;
use crate::scope::ScopeResolver;
use crate::{PipelineError, Result};

/// Template rendered once per document.
const FILE_TEMPLATE: &str = "file";

/// Drives one generation run over a [`DocumentTree`].
pub struct Patcher<'a, R, E = GoTemplates> {
    tree: &'a DocumentTree,
    resolver: R,
    oracle: &'a dyn TypeOracle,
    engine: E,
    options: PatchOptions,
}

impl<'a, R: ScopeResolver> Patcher<'a, R> {
    /// Create a driver rendering with the built-in Go templates.
    pub fn new(tree: &'a DocumentTree, resolver: R, oracle: &'a dyn TypeOracle) -> Self {
        Self {
            tree,
            resolver,
            oracle,
            engine: GoTemplates::new(),
            options: PatchOptions::default(),
        }
    }
}

impl<'a, R: ScopeResolver, E: TemplateEngine> Patcher<'a, R, E> {
    /// Replace the run options.
    pub fn with_options(mut self, options: PatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Render with `engine` instead.
    pub fn with_engine<E2: TemplateEngine>(self, engine: E2) -> Patcher<'a, R, E2> {
        Patcher {
            tree: self.tree,
            resolver: self.resolver,
            oracle: self.oracle,
            engine,
            options: self.options,
        }
    }

    /// The run options.
    pub fn options(&self) -> &PatchOptions { &self.options }

    /// Generate the output units of every reachable document.
    pub fn patch(&self) -> Result<Vec<OutputUnit>> {
        let filter = ImportFilter::new(self.options.module.clone());
        let helpers = TemplateHelpers::new(self.oracle, self.options.fast_api);
        let mut planner = OutputPlanner::from_options(&self.options);
        let mut units = Vec::new();
        let mut documents = 0usize;

        for document in self.tree.depth_first() {
            debug!(document = %document.filename, "patching");
            self.patch_document(document, &filter, helpers, &mut planner, &mut units)?;
            documents += 1;
        }

        info!(
            documents,
            units = units.len(),
            directories = planner.protected_directories(),
            "generation finished"
        );
        Ok(units)
    }

    fn patch_document(
        &self,
        document: &Document,
        filter: &ImportFilter,
        helpers: TemplateHelpers<'_>,
        planner: &mut OutputPlanner,
        units: &mut Vec<OutputUnit>,
    ) -> Result<()> {
        let filename = &document.filename;
        let scope_error = |e: R::Error| PipelineError::ScopeResolution {
            filename: filename.clone(),
            source: Box::new(e),
        };

        let scope = self.resolver.build_scope(document).map_err(scope_error)?;
        let pkg_name = self.resolver.package_name(&scope).map_err(scope_error)?;
        let resolved_path = self.resolver.file_path(&scope).map_err(scope_error)?;

        let planned = planner.plan(filename, &resolved_path, &pkg_name)?;
        if let Some(protection) = planned.protection {
            units.push(protection);
        }

        let import_error = |e: R::Error| PipelineError::ImportResolution {
            filename: filename.clone(),
            source: Box::new(e),
        };
        let imports = self.resolver.resolve_imports(&scope).map_err(import_error)?;
        let packages = self.resolver.include_packages(&scope).map_err(import_error)?;
        let packages = PackageTable::new(filename.as_str(), packages);
        let data = FileData::new(document, pkg_name, filter.filter(&imports))
            .with_protection(self.options.protection_symbol.clone());

        let helpers = helpers.with_packages(&packages);
        let content = self
            .engine
            .render_to_string(FILE_TEMPLATE, &RenderContext::new(&data, helpers))
            .map_err(|e| match e {
                CodegenError::Classification(source) => {
                    PipelineError::TypeClassification { filename: filename.clone(), source }
                }
                source => PipelineError::Render { filename: filename.clone(), source },
            })?;
        units.push(OutputUnit::new(planned.path, content, UnitKind::Document));

        if self.options.copy_idl {
            let source = fs::read(self.options.source_root.join(filename)).map_err(
                |source| PipelineError::SourceRead { filename: filename.clone(), source },
            )?;
            let path = planner.plan_copy(filename, &planned.directory)?;
            debug!(document = %filename, path = %path.display(), "copying source");
            units.push(OutputUnit::new(path, source, UnitKind::IdlCopy));
        }
        Ok(())
    }
}
