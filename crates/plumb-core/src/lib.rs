#![warn(rust_2024_compatibility, clippy::all)]

pub mod column;
pub mod config;

use anyhow::{Result, anyhow};
use camino::Utf8Path;
use plumb_decree_abi::{ABI_VERSION, BoxDecree, Diagnostics, SyntaxTree};
use tracing::debug;

pub use config::{ConfigError, DecreeSettings, PlumbConfig};

/// Parsed unit for the Regime to enforce.
pub struct Unit<'a> {
    /// Path of the original source file.
    pub path: &'a Utf8Path,
    pub tree: &'a SyntaxTree,
}

/// The Regime: owns decree instances and enforces them over units.
pub struct Regime {
    decrees: Vec<BoxDecree>,
}

impl Default for Regime {
    fn default() -> Self {
        Self::new()
    }
}

impl Regime {
    #[must_use]
    pub fn new() -> Self {
        Self {
            decrees: Vec::new(),
        }
    }

    /// Add a decree, refusing ones built against an incompatible ABI.
    ///
    /// # Errors
    ///
    /// Returns an error if the decree's ABI version does not match the host.
    pub fn with_decree(mut self, decree: BoxDecree) -> Result<Self> {
        self.add_decree(decree)?;
        Ok(self)
    }

    /// Add a decree, refusing ones built against an incompatible ABI.
    ///
    /// # Errors
    ///
    /// Returns an error if the decree's ABI version does not match the host.
    pub fn add_decree(&mut self, decree: BoxDecree) -> Result<()> {
        decree
            .metadata()
            .validate_abi(ABI_VERSION)
            .map_err(|e| anyhow!("decree.{}: {e}", decree.name()))?;
        debug!(decree = decree.name(), "decree enlisted");
        self.decrees.push(decree);
        Ok(())
    }

    /// Names of the enlisted decrees, in enforcement order.
    #[must_use]
    pub fn decree_names(&self) -> Vec<String> {
        self.decrees.iter().map(|d| d.name().to_string()).collect()
    }

    /// Enforce all decrees over provided units.
    ///
    /// Only runs a decree on units whose source extension matches the decree's
    /// `supported_extensions`. Decrees with empty `supported_extensions` run on
    /// all units.
    ///
    /// # Errors
    ///
    /// Returns an error if any decree refuses a unit.
    pub fn enforce(&self, units: &[Unit<'_>]) -> Result<Diagnostics> {
        let mut all = Diagnostics::new();
        for decree in &self.decrees {
            let supported = &decree.metadata().supported_extensions;
            for unit in units {
                if supported.is_empty() || Self::extension_matches(unit.path, supported) {
                    debug!(decree = decree.name(), path = %unit.path, "enforcing");
                    all.extend(decree.lint(unit.path.as_str(), unit.tree)?);
                }
            }
        }
        Ok(all)
    }

    /// Check if a file's extension matches any in the supported list.
    fn extension_matches(path: &Utf8Path, supported: &[String]) -> bool {
        path.extension()
            .is_some_and(|ext| supported.iter().any(|s| s.eq_ignore_ascii_case(ext)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plumb_decree_abi::{
        Capability, Decree, DecreeMetadata, Diagnostic, LintError, NodeSpec, Span, TokenKind,
    };

    struct Counter {
        abi: &'static str,
        extensions: Vec<String>,
    }

    impl Decree for Counter {
        fn name(&self) -> &'static str {
            "counter"
        }

        fn lint(&self, _path: &str, tree: &SyntaxTree) -> Result<Diagnostics, LintError> {
            Ok(vec![Diagnostic {
                rule: self.rule("nodes"),
                key: "counter.nodes".to_string(),
                message: format!("{} nodes", tree.len()),
                span: Span::new(1, 0),
            }])
        }

        fn metadata(&self) -> DecreeMetadata {
            DecreeMetadata {
                abi_version: self.abi.to_string(),
                decree_version: "0.0.1".to_string(),
                description: "counts nodes".to_string(),
                dectauthors: None,
                supported_extensions: self.extensions.clone(),
                capabilities: vec![Capability::Lint],
            }
        }
    }

    fn tree() -> SyntaxTree {
        SyntaxTree::from_spec("x\n", &NodeSpec::at(TokenKind::CompilationUnit, 1, 0, "")).unwrap()
    }

    #[test]
    fn enforces_matching_extensions_only() {
        let regime = Regime::new()
            .with_decree(Box::new(Counter {
                abi: ABI_VERSION,
                extensions: vec!["java".to_string()],
            }))
            .unwrap();
        let tree = tree();
        let units = [
            Unit {
                path: Utf8Path::new("A.java"),
                tree: &tree,
            },
            Unit {
                path: Utf8Path::new("notes.txt"),
                tree: &tree,
            },
        ];
        let diags = regime.enforce(&units).unwrap();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].rule, "counter/nodes");
    }

    #[test]
    fn refuses_incompatible_abi() {
        let err = Regime::new()
            .with_decree(Box::new(Counter {
                abi: "0.0.1",
                extensions: vec![],
            }))
            .err()
            .unwrap();
        assert!(err.to_string().contains("decree.counter"));
    }
}
