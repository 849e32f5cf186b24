//! Output formatting and diagnostic display

use plumb_decree_abi::Diagnostic;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SerializableDiagnostic {
    pub path: String,
    pub line: usize,
    /// 1-based, tab-expanded.
    pub col: usize,
    pub rule: String,
    pub key: String,
    pub message: String,
}

impl SerializableDiagnostic {
    #[must_use]
    pub fn new(path: &str, diag: &Diagnostic) -> Self {
        Self {
            path: path.to_string(),
            line: diag.span.line,
            col: diag.span.column + 1,
            rule: diag.rule.clone(),
            key: diag.key.clone(),
            message: diag.message.clone(),
        }
    }
}

#[must_use]
pub fn format_diagnostic(path: &str, diag: &Diagnostic) -> String {
    format!(
        "{path}:{line}:{col}: {rule}: {msg}",
        line = diag.span.line,
        col = diag.span.column + 1,
        rule = diag.rule,
        msg = diag.message
    )
}

pub fn print_diagnostic(path: &str, diag: &Diagnostic) {
    println!("{}", format_diagnostic(path, diag));
}
