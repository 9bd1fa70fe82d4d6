//! Package protection symbol.
//!
//! Every generated package defines one unconditionally referenced symbol so
//! that importing it never trips Go's "imported and not used" check.

/// Name of the per-package protection symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectionSymbol {
    name: String,
}

impl Default for ProtectionSymbol {
    fn default() -> Self { Self::new(Self::DEFAULT_NAME) }
}

impl ProtectionSymbol {
    /// Symbol name used when none is configured.
    pub const DEFAULT_NAME: &'static str = "UnusedProtection";

    /// Create a symbol with the given Go identifier
    pub fn new(name: impl Into<String>) -> Self { Self { name: name.into() } }

    /// The Go identifier
    pub fn name(&self) -> &str { &self.name }

    /// Content of the protection file for package `pkg_name`.
    pub fn render_file(&self, pkg_name: &str) -> String {
        format!(
            "package {pkg}\n\n\
             // {name} is used to prevent 'imported and not used' error.\n\
             var {name} = struct{{}}{{}}\n",
            pkg = pkg_name,
            name = self.name,
        )
    }

    /// Expression referencing the symbol of an imported package.
    pub fn reference(&self, package: &str) -> String { format!("{}.{}", package, self.name) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_file() {
        let symbol = ProtectionSymbol::default();
        let content = symbol.render_file("user");
        assert!(content.starts_with("package user\n"));
        assert!(content.contains("var UnusedProtection = struct{}{}\n"));
        assert_eq!(symbol.reference("base"), "base.UnusedProtection");
    }
}
