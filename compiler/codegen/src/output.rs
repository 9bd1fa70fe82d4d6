//! Generated output units and persisting them.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

/// What produced an [`OutputUnit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// Rendered patch file of one document
    Document,
    /// Per-directory file defining the protection symbol
    Protection,
    /// Verbatim copy of an IDL source file
    IdlCopy,
}

/// A generated artifact: target path plus full content.
///
/// Content is kept as bytes so IDL copies survive in whatever encoding the
/// source file used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputUnit {
    /// Target file path
    pub path: PathBuf,
    /// Full file content
    pub content: Vec<u8>,
    /// Producer of this unit
    pub kind: UnitKind,
}

impl OutputUnit {
    /// Create a unit
    pub fn new(path: impl Into<PathBuf>, content: impl Into<Vec<u8>>, kind: UnitKind) -> Self {
        Self { path: path.into(), content: content.into(), kind }
    }

    /// Content as text, invalid UTF-8 replaced.
    pub fn text(&self) -> Cow<'_, str> { String::from_utf8_lossy(&self.content) }
}

/// Trim trailing whitespace from each line and drop trailing blank lines.
/// Always ensures the returned string ends with a single newline when not empty.
pub fn clean_generated_source(src: &str) -> String {
    let mut lines: Vec<&str> = src.lines().map(str::trim_end).collect();

    while matches!(lines.last(), Some(line) if line.is_empty()) {
        lines.pop();
    }

    if lines.is_empty() {
        String::new()
    } else {
        format!("{}\n", lines.join("\n"))
    }
}

/// Persist units to disk, creating any necessary parent directories.
///
/// Relative unit paths are resolved against `base`. Generated sources are
/// cleaned with [`clean_generated_source`]; IDL copies are written verbatim.
pub fn write_units(base: &Path, units: &[OutputUnit]) -> std::io::Result<()> {
    for unit in units {
        let path = base.join(&unit.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        match unit.kind {
            UnitKind::IdlCopy => fs::write(&path, &unit.content)?,
            UnitKind::Document | UnitKind::Protection => {
                fs::write(&path, clean_generated_source(&unit.text()))?
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_clean_generated_source() {
        assert_eq!(clean_generated_source("a  \n\tb\t\n\n\n"), "a\n\tb\n");
        assert_eq!(clean_generated_source("\n \n"), "");
        assert_eq!(clean_generated_source(""), "");
    }

    #[test]
    fn test_write_units_creates_directories() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let units = vec![
            OutputUnit::new("pkg/generated-consts.go", "package pkg  \n\n", UnitKind::Protection),
            OutputUnit::new("pkg/a.thrift", "struct A {}  \n\n", UnitKind::IdlCopy),
        ];

        write_units(dir.path(), &units).expect("Failed to write units");

        let consts = fs::read_to_string(dir.path().join("pkg/generated-consts.go"))
            .expect("Failed to read protection file");
        assert_eq!(consts, "package pkg\n");
        let copy =
            fs::read_to_string(dir.path().join("pkg/a.thrift")).expect("Failed to read copy");
        assert_eq!(copy, "struct A {}  \n\n");
    }

    #[test]
    fn test_write_units_keeps_copy_encoding() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let latin1: &[u8] = b"// caf\xe9\nstruct A {}\n";
        let units = vec![OutputUnit::new("pkg/a.thrift", latin1, UnitKind::IdlCopy)];

        write_units(dir.path(), &units).expect("Failed to write units");

        let copy = fs::read(dir.path().join("pkg/a.thrift")).expect("Failed to read copy");
        assert_eq!(copy, latin1);
        assert_eq!(units[0].text(), "// caf\u{fffd}\nstruct A {}\n");
    }
}
