// SPDX-License-Identifier: CC0-1.0

//! stubgen: fast-codec patch files for IDL-described RPC stubs.
//!
//! Library entry point over the workspace crates. [`generate`] runs a whole
//! generation from a serialized document tree to files on disk; the
//! re-exported crates expose each stage on its own.
//!
//! ```no_run
//! use std::path::Path;
//!
//! let config = stubgen::GenerationConfig::default();
//! let units = stubgen::generate(Path::new("tree.json"), &config, Path::new("gen"))?;
//! println!("wrote {} files", units.len());
//! # Ok::<(), stubgen::PipelineError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

use std::path::Path;

pub use codegen;
pub use config;
pub use ir;
pub use pipeline;
pub use semantics;

pub use config::GenerationConfig;
pub use ir::DocumentTree;
pub use pipeline::{OutputUnit, PipelineError, UnitKind};

/// Generate the patch files of the tree stored at `tree_path` and write them
/// below `output_dir`.
///
/// IDL sources are read relative to the tree file's directory.
pub fn generate(
    tree_path: &Path,
    config: &GenerationConfig,
    output_dir: &Path,
) -> pipeline::Result<Vec<OutputUnit>> {
    let units = pipeline::generate_from_file(tree_path, config, None)?;
    pipeline::write_output(output_dir, &units)?;
    Ok(units)
}
