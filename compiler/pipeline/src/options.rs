//! Run-wide generation settings.

use std::path::PathBuf;

use codegen::ProtectionSymbol;
use config::GenerationConfig;

/// Settings shared by every document of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchOptions {
    /// Module root; imports under it are dropped
    pub module: String,
    /// Emit the high-performance codec path
    pub fast_api: bool,
    /// Also emit verbatim copies of the IDL sources
    pub copy_idl: bool,
    /// Prefix of generated document file names
    pub file_prefix: String,
    /// File name of the per-directory protection file
    pub protection_file: String,
    /// Per-package protection symbol
    pub protection_symbol: ProtectionSymbol,
    /// Directory document filenames are relative to, for verbatim copies
    pub source_root: PathBuf,
}

impl Default for PatchOptions {
    fn default() -> Self { Self::from_config(&GenerationConfig::default()) }
}

impl PatchOptions {
    /// Options from the `[generation]` configuration section.
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            module: config.module.clone(),
            fast_api: config.fast_api,
            copy_idl: config.copy_idl,
            file_prefix: config.file_prefix.clone(),
            protection_file: config.protection_file.clone(),
            protection_symbol: ProtectionSymbol::new(config.protection_symbol.clone()),
            source_root: PathBuf::from("."),
        }
    }

    /// Set the module root
    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    /// Toggle the high-performance codec path
    pub fn fast_api(mut self, enabled: bool) -> Self {
        self.fast_api = enabled;
        self
    }

    /// Toggle verbatim IDL copies
    pub fn copy_idl(mut self, enabled: bool) -> Self {
        self.copy_idl = enabled;
        self
    }

    /// Set the directory IDL filenames are relative to
    pub fn source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.source_root = root.into();
        self
    }
}
