#![warn(rust_2024_compatibility, clippy::all)]

//! decree.indentation - structural and comment indentation for Java-style trees.
//!
//! The structural engine builds one handler per construct as it walks the
//! tree; each handler knows which columns its tokens and children may start
//! at. The comment engine and the asterisk check run as separate passes.

mod asterisk;
mod comments;
mod error;
mod factory;
mod handlers;
mod level;
mod line_set;
mod session;
mod violation;
mod wrapping;

use plumb_decree_abi::{
    BoxDecree, Capability, Decree, DecreeMetadata, Diagnostic, Diagnostics, LintError, Span,
    SyntaxTree,
};
use tracing::debug;

pub use asterisk::{AsteriskAlignment, check_asterisk_alignment};
pub use comments::{CommentsCheck, check_comments};
pub use error::IndentationError;
pub use factory::{HandlerFactory, is_handled_kind};
pub use handlers::{ConstructKind, HandlerId};
pub use level::IndentLevel;
pub use line_set::LineSet;
pub use session::CheckSession;
pub use violation::{Expected, MessageKey, Violation};

/// Rule ids, relative to the decree name.
pub const RULE_INDENTATION: &str = "indentation";
pub const RULE_COMMENTS: &str = "comments-indentation";
pub const RULE_ASTERISK: &str = "asterisk-alignment";

/// Configuration for the indentation decree (loaded from `[decree.indentation]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentationConfig {
    pub basic_offset: usize,
    pub brace_adjustment: usize,
    pub case_indent: usize,
    pub array_init_indent: usize,
    pub throws_indent: usize,
    pub line_wrapping_indentation: usize,
    pub tab_width: usize,
    /// Wrapped lines must match exactly instead of at least.
    pub force_strict_condition: bool,
    pub comments: bool,
    pub asterisk: bool,
    pub asterisk_alignment: AsteriskAlignment,
}

impl Default for IndentationConfig {
    fn default() -> Self {
        Self {
            basic_offset: 4,
            brace_adjustment: 0,
            case_indent: 4,
            array_init_indent: 4,
            throws_indent: 4,
            line_wrapping_indentation: 4,
            tab_width: 8,
            force_strict_condition: false,
            comments: true,
            asterisk: true,
            asterisk_alignment: AsteriskAlignment::Right,
        }
    }
}

/// Structural indentation check of one tree.
///
/// # Errors
///
/// Returns `IndentationError` only on wiring failures; mismatches are violations.
pub fn check(
    tree: &SyntaxTree,
    config: &IndentationConfig,
) -> Result<Vec<Violation>, IndentationError> {
    let violations = CheckSession::new(tree, config).run()?;
    debug!(nodes = tree.len(), violations = violations.len(), "indentation checked");
    Ok(violations)
}

#[derive(Default)]
pub struct Indentation {
    config: IndentationConfig,
}

impl Indentation {
    #[must_use]
    pub const fn new(config: IndentationConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &IndentationConfig {
        &self.config
    }

    fn to_diagnostics(&self, rule: &str, violations: Vec<Violation>) -> Diagnostics {
        violations
            .into_iter()
            .map(|violation| Diagnostic {
                rule: self.rule(rule),
                key: violation.key.as_str().to_string(),
                message: violation.message(),
                span: Span::new(violation.line, violation.column),
            })
            .collect()
    }
}

impl Decree for Indentation {
    fn name(&self) -> &'static str {
        "indentation"
    }

    fn lint(&self, path: &str, tree: &SyntaxTree) -> Result<Diagnostics, LintError> {
        debug!(path, "linting");
        let structural =
            check(tree, &self.config).map_err(|e| self.error(format!("{path}: {e}")))?;
        let mut diags = self.to_diagnostics(RULE_INDENTATION, structural);

        if self.config.comments {
            let comments =
                check_comments(tree, &self.config).map_err(|e| self.error(format!("{path}: {e}")))?;
            diags.extend(self.to_diagnostics(RULE_COMMENTS, comments));
        }
        if self.config.asterisk {
            let asterisks = check_asterisk_alignment(tree, &self.config);
            diags.extend(self.to_diagnostics(RULE_ASTERISK, asterisks));
        }

        diags.sort_by_key(|diag| diag.span);
        Ok(diags)
    }

    fn metadata(&self) -> DecreeMetadata {
        DecreeMetadata {
            abi_version: plumb_decree_abi::ABI_VERSION.to_string(),
            decree_version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Structural and comment indentation".to_string(),
            dectauthors: Some(env!("CARGO_PKG_AUTHORS").to_string()),
            supported_extensions: vec!["java".to_string()],
            capabilities: vec![Capability::Lint, Capability::RuntimeConfig, Capability::Comments],
        }
    }
}

#[must_use]
pub fn init_decree() -> BoxDecree {
    Box::new(Indentation::default())
}

/// Create decree with custom config
#[must_use]
pub fn init_decree_with_config(config: IndentationConfig) -> BoxDecree {
    Box::new(Indentation::new(config))
}

/// Convert `DecreeSettings` to `IndentationConfig`; unset fields keep their defaults.
#[must_use]
pub fn config_from_decree_settings(settings: &plumb_core::DecreeSettings) -> IndentationConfig {
    let defaults = IndentationConfig::default();
    IndentationConfig {
        basic_offset: settings.basic_offset.unwrap_or(defaults.basic_offset),
        brace_adjustment: settings.brace_adjustment.unwrap_or(defaults.brace_adjustment),
        case_indent: settings.case_indent.unwrap_or(defaults.case_indent),
        array_init_indent: settings.array_init_indent.unwrap_or(defaults.array_init_indent),
        throws_indent: settings.throws_indent.unwrap_or(defaults.throws_indent),
        line_wrapping_indentation: settings
            .line_wrapping_indentation
            .unwrap_or(defaults.line_wrapping_indentation),
        tab_width: settings.tab_width.unwrap_or(defaults.tab_width),
        force_strict_condition: settings
            .force_strict_condition
            .unwrap_or(defaults.force_strict_condition),
        comments: settings.comments.unwrap_or(defaults.comments),
        asterisk: settings.asterisk.unwrap_or(defaults.asterisk),
        asterisk_alignment: settings
            .asterisk_alignment
            .as_deref()
            .and_then(|name| name.parse().ok())
            .unwrap_or(defaults.asterisk_alignment),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_override_only_what_they_set() {
        let settings = plumb_core::DecreeSettings {
            basic_offset: Some(2),
            case_indent: Some(0),
            asterisk_alignment: Some("left".to_string()),
            comments: Some(false),
            ..Default::default()
        };
        let config = config_from_decree_settings(&settings);
        assert_eq!(config.basic_offset, 2);
        assert_eq!(config.case_indent, 0);
        assert_eq!(config.tab_width, 8);
        assert_eq!(config.asterisk_alignment, AsteriskAlignment::Left);
        assert!(!config.comments);
        assert!(config.asterisk);
    }

    #[test]
    fn metadata_targets_java() {
        let decree = init_decree();
        let meta = decree.metadata();
        assert_eq!(meta.supported_extensions, vec!["java".to_string()]);
        assert!(meta.has_capability(Capability::Comments));
        assert!(meta.validate_abi(plumb_decree_abi::ABI_VERSION).is_ok());
        assert_eq!(decree.rule(RULE_COMMENTS), "indentation/comments-indentation");
    }

    #[test]
    fn empty_tree_has_nothing_to_report() {
        let tree = SyntaxTree::default();
        let diags = init_decree().lint("Empty.java", &tree).unwrap();
        assert!(diags.is_empty());
    }
}
