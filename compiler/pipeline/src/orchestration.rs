//! Pipeline orchestration for the command-line entry points.
//!
//! Loads a document forest from disk, runs the [`Patcher`] with the
//! namespace resolver and the structural type oracle, and persists the
//! resulting units.

use std::path::Path;

use codegen::{write_units, OutputUnit};
use config::GenerationConfig;
use ir::DocumentTree;
use semantics::StructuralOracle;
use tracing::info;

use crate::options::PatchOptions;
use crate::patcher::Patcher;
use crate::scope::NamespaceResolver;
use crate::{PipelineError, Result};

/// Generate the units for the forest stored at `tree_path`.
///
/// Document filenames are resolved against `source_root` for verbatim
/// copies, defaulting to the directory holding the tree file.
pub fn generate_from_file(
    tree_path: &Path,
    config: &GenerationConfig,
    source_root: Option<&Path>,
) -> Result<Vec<OutputUnit>> {
    let tree = DocumentTree::from_file(tree_path)?;
    info!(tree = %tree_path.display(), documents = tree.documents().len(), "loaded document tree");

    let source_root = source_root
        .map(Path::to_path_buf)
        .or_else(|| tree_path.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    let options = PatchOptions::from_config(config).source_root(source_root);

    let oracle = StructuralOracle::new(&tree);
    let resolver = NamespaceResolver::new(&tree, config.module.clone(), config.language.clone())
        .map_err(|e| PipelineError::ScopeResolution {
            filename: tree_path.display().to_string(),
            source: Box::new(e),
        })?;

    Patcher::new(&tree, resolver, &oracle).with_options(options).patch()
}

/// Write `units` below `output_dir`.
pub fn write_output(output_dir: &Path, units: &[OutputUnit]) -> Result<()> {
    write_units(output_dir, units)?;
    info!(output = %output_dir.display(), units = units.len(), "wrote generated files");
    Ok(())
}
