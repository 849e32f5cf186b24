#![warn(rust_2024_compatibility, clippy::all)]

//! ABI shared by the Plumb host and its decrees: diagnostics, decree trait and
//! the syntax tree every decree walks.

pub mod tree;

use serde::{Deserialize, Serialize};

pub use tree::{Node, NodeId, NodeSpec, SyntaxTree, TokenKind, TreeError};

/// ABI version for decree compatibility checking.
///
/// Bumped when the `Decree` trait, `Diagnostic` or the tree model change.
/// Pre-1.0: exact major.minor match required (0.3.x ↔ 0.3.y ✓, 0.3.x ↔ 0.4.y ✗)
/// Post-1.0: major must match, decree minor ≤ host minor
pub const ABI_VERSION: &str = "0.3.0";

/// Capability flags for decrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capability {
    /// Basic linting (always required)
    Lint,
    /// Accepts config at lint-time
    RuntimeConfig,
    /// Inspects comment nodes in addition to code nodes
    Comments,
}

/// Metadata for decree versioning and capabilities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecreeMetadata {
    /// ABI version this decree was built against
    pub abi_version: String,
    /// Decree's own version
    pub decree_version: String,
    /// Human-readable description
    pub description: String,
    /// Decree authors (from workspace, optional)
    pub dectauthors: Option<String>,
    /// Source extensions this decree handles (e.g., `["java"]`), empty means all
    pub supported_extensions: Vec<String>,
    /// Capabilities this decree provides
    pub capabilities: Vec<Capability>,
}

impl DecreeMetadata {
    /// Check if this decree has a specific capability.
    #[must_use]
    pub fn has_capability(&self, cap: Capability) -> bool {
        self.capabilities.contains(&cap)
    }

    /// Parse semver version string.
    ///
    /// # Errors
    ///
    /// Returns an error if the version string is not in the format "major.minor.patch"
    /// or if any component cannot be parsed as a u32.
    pub fn parse_version(version: &str) -> Result<(u32, u32, u32), String> {
        let parts: Vec<&str> = version.split('.').collect();
        if parts.len() != 3 {
            return Err(format!("invalid version format: {version}"));
        }
        let major = parts[0]
            .parse()
            .map_err(|_| format!("invalid major: {}", parts[0]))?;
        let minor = parts[1]
            .parse()
            .map_err(|_| format!("invalid minor: {}", parts[1]))?;
        let patch = parts[2]
            .parse()
            .map_err(|_| format!("invalid patch: {}", parts[2]))?;
        Ok((major, minor, patch))
    }

    /// Check if this decree's ABI version is compatible with host ABI version.
    ///
    /// # Errors
    ///
    /// Returns an error if the ABI versions are incompatible or if version parsing fails.
    pub fn validate_abi(&self, host_abi_version: &str) -> Result<(), String> {
        let (host_maj, host_min, _) = Self::parse_version(host_abi_version)?;
        let (decree_maj, decree_min, _) = Self::parse_version(&self.abi_version)?;

        if host_maj == 0 {
            if host_maj == decree_maj && host_min == decree_min {
                return Ok(());
            }
            return Err(format!(
                "ABI version mismatch: host {}, decree {}",
                host_abi_version, self.abi_version
            ));
        }

        if host_maj == decree_maj && decree_min <= host_min {
            return Ok(());
        }

        Err(format!(
            "ABI version incompatible: host {}, decree {}",
            host_abi_version, self.abi_version
        ))
    }
}

/// Position of the offending token: 1-based line, 0-based tab-expanded column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Rule identifier, e.g. "indentation/comments-indentation".
    pub rule: String,
    /// Message key of the finding, e.g. "indentation.child.error".
    pub key: String,
    pub message: String,
    pub span: Span,
}

pub type Diagnostics = Vec<Diagnostic>;

/// A decree refused to lint a unit (wiring or input problem, never a finding).
#[derive(Debug, thiserror::Error)]
#[error("decree.{decree}: {message}")]
pub struct LintError {
    pub decree: String,
    pub message: String,
}

/// Trait all Plumb decrees implement.
pub trait Decree: Send + Sync {
    /// Human-friendly decree name, e.g. "indentation".
    #[must_use]
    fn name(&self) -> &str;

    /// Lint a single parsed unit. `path` is the UTF-8 path of the original source.
    ///
    /// # Errors
    ///
    /// Returns `LintError` when the decree cannot process the tree at all.
    fn lint(&self, path: &str, tree: &SyntaxTree) -> Result<Diagnostics, LintError>;

    /// Metadata for versioning and capabilities.
    #[must_use]
    fn metadata(&self) -> DecreeMetadata;

    /// Create rule identifier: `{decree}/{rule}`.
    #[must_use]
    fn rule(&self, rule_name: &str) -> String {
        format!("{}/{}", self.name(), rule_name)
    }

    /// Wrap a message into a `LintError` attributed to this decree.
    #[must_use]
    fn error(&self, message: impl Into<String>) -> LintError
    where
        Self: Sized,
    {
        LintError {
            decree: self.name().to_string(),
            message: message.into(),
        }
    }
}

/// Boxed decree for dynamic dispatch.
pub type BoxDecree = Box<dyn Decree>;

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(abi: &str) -> DecreeMetadata {
        DecreeMetadata {
            abi_version: abi.to_string(),
            decree_version: "0.1.0".to_string(),
            description: "test".to_string(),
            dectauthors: None,
            supported_extensions: vec![],
            capabilities: vec![Capability::Lint],
        }
    }

    #[test]
    fn pre_release_abi_requires_same_minor() {
        assert!(metadata("0.3.7").validate_abi("0.3.0").is_ok());
        let err = metadata("0.2.0").validate_abi("0.3.0").unwrap_err();
        assert!(err.contains("mismatch"));
    }

    #[test]
    fn stable_abi_allows_older_minor() {
        assert!(metadata("1.1.0").validate_abi("1.4.0").is_ok());
        assert!(metadata("1.5.0").validate_abi("1.4.0").is_err());
        assert!(metadata("2.0.0").validate_abi("1.4.0").is_err());
    }

    #[test]
    fn rejects_malformed_versions() {
        assert!(DecreeMetadata::parse_version("1.2").is_err());
        assert!(DecreeMetadata::parse_version("1.x.0").is_err());
        assert_eq!(DecreeMetadata::parse_version("3.2.1"), Ok((3, 2, 1)));
    }

    #[test]
    fn capability_lookup() {
        let meta = metadata("0.3.0");
        assert!(meta.has_capability(Capability::Lint));
        assert!(!meta.has_capability(Capability::Comments));
    }
}
