//! Output file planning.
//!
//! A document resolved to `dir/name.go` is emitted as `dir/<prefix>name.go`.
//! The first document planned into a directory also triggers that
//! directory's protection file, `dir/<protection_file>`, which is handed
//! back so the driver can append it before the document's own unit.

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use codegen::{OutputUnit, ProtectionSymbol, UnitKind};
use tracing::debug;

use crate::options::PatchOptions;
use crate::{PipelineError, Result};

/// Claim owner recorded for protection files.
const PROTECTION_OWNER: &str = "<protection>";

/// Where one document's output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedOutput {
    /// Path of the document's generated file
    pub path: PathBuf,
    /// Directory holding the generated file
    pub directory: PathBuf,
    /// Protection file to emit first, when this is the directory's first document
    pub protection: Option<OutputUnit>,
}

/// Plans output paths for one run.
///
/// Tracks which directories already received a protection file and which
/// paths were already claimed, so the same planner must see every document
/// of the run.
#[derive(Debug, Clone)]
pub struct OutputPlanner {
    file_prefix: String,
    protection_file: String,
    symbol: ProtectionSymbol,
    protected: BTreeSet<PathBuf>,
    claimed: BTreeMap<PathBuf, String>,
}

impl OutputPlanner {
    /// Create a planner with explicit naming.
    pub fn new(
        file_prefix: impl Into<String>,
        protection_file: impl Into<String>,
        symbol: ProtectionSymbol,
    ) -> Self {
        Self {
            file_prefix: file_prefix.into(),
            protection_file: protection_file.into(),
            symbol,
            protected: BTreeSet::new(),
            claimed: BTreeMap::new(),
        }
    }

    /// Create a planner using the naming of `options`.
    pub fn from_options(options: &PatchOptions) -> Self {
        Self::new(
            options.file_prefix.clone(),
            options.protection_file.clone(),
            options.protection_symbol.clone(),
        )
    }

    /// Number of protection files planned so far.
    pub fn protected_directories(&self) -> usize { self.protected.len() }

    /// Plan the generated file of document `filename`, resolved to
    /// `resolved_path`, in package `pkg_name`.
    pub fn plan(
        &mut self,
        filename: &str,
        resolved_path: &Path,
        pkg_name: &str,
    ) -> Result<PlannedOutput> {
        let directory = resolved_path.parent().map(Path::to_path_buf).unwrap_or_default();
        let base = resolved_path.file_name().map(OsString::from).unwrap_or_default();

        let protection_path = directory.join(&self.protection_file);
        let protection = if self.protected.insert(directory.clone()) {
            debug!(path = %protection_path.display(), package = pkg_name, "planned protection");
            self.claimed.insert(protection_path.clone(), PROTECTION_OWNER.to_string());
            Some(OutputUnit::new(
                protection_path.clone(),
                self.symbol.render_file(pkg_name),
                UnitKind::Protection,
            ))
        } else {
            None
        };

        let mut prefixed = OsString::from(&self.file_prefix);
        prefixed.push(&base);
        let mut path = directory.join(prefixed);
        if path == protection_path {
            path = with_suffix_before_extension(&path, "_");
        }
        self.claim(&path, filename)?;
        debug!(document = filename, path = %path.display(), "planned output");

        Ok(PlannedOutput { path, directory, protection })
    }

    /// Plan the verbatim copy of document `filename` into `directory`.
    pub fn plan_copy(&mut self, filename: &str, directory: &Path) -> Result<PathBuf> {
        let base = Path::new(filename).file_name().map(OsString::from).unwrap_or_default();
        let path = directory.join(base);
        self.claim(&path, filename)?;
        Ok(path)
    }

    fn claim(&mut self, path: &Path, filename: &str) -> Result<()> {
        if let Some(first) = self.claimed.get(path) {
            return Err(PipelineError::DuplicateOutput {
                path: path.to_path_buf(),
                first: first.clone(),
                second: filename.to_string(),
            });
        }
        self.claimed.insert(path.to_path_buf(), filename.to_string());
        Ok(())
    }
}

/// `dir/name.ext` -> `dir/name<suffix>.ext`
fn with_suffix_before_extension(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_stem().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}
