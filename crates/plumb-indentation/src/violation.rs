//! Findings produced by the indentation checks.

use crate::level::IndentLevel;
use serde::Serialize;
use std::fmt;

/// Message template of a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MessageKey {
    Error,
    ErrorMulti,
    ChildError,
    ChildErrorMulti,
    CommentSingle,
    CommentBlock,
    AsteriskMisaligned,
}

impl MessageKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "indentation.error",
            Self::ErrorMulti => "indentation.error.multi",
            Self::ChildError => "indentation.child.error",
            Self::ChildErrorMulti => "indentation.child.error.multi",
            Self::CommentSingle => "comments.indentation.single",
            Self::CommentBlock => "comments.indentation.block",
            Self::AsteriskMisaligned => "javadoc.asterisk.indentation",
        }
    }

    /// Own-line key for `expected`, multi variant when it lists alternatives.
    pub(crate) const fn error_for(expected: &Expected) -> Self {
        if expected.is_multi() {
            Self::ErrorMulti
        } else {
            Self::Error
        }
    }

    pub(crate) const fn child_error_for(expected: &Expected) -> Self {
        if expected.is_multi() {
            Self::ChildErrorMulti
        } else {
            Self::ChildError
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the check wanted to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Expected {
    Exact(usize),
    /// Lenient bound: any column at or right of the value passes.
    AtLeast(usize),
    /// Alternatives in the order the producer listed them.
    OneOf(Vec<usize>),
}

impl Expected {
    #[must_use]
    pub const fn is_multi(&self) -> bool {
        matches!(self, Self::OneOf(values) if values.len() > 1)
    }
}

impl From<&IndentLevel> for Expected {
    fn from(level: &IndentLevel) -> Self {
        if level.is_multi_level() {
            Self::OneOf(level.values().collect())
        } else {
            Self::Exact(level.first())
        }
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(value) | Self::AtLeast(value) => write!(f, "{value}"),
            Self::OneOf(values) => {
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                Ok(())
            }
        }
    }
}

/// One indentation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// 1-based line.
    pub line: usize,
    /// 0-based tab-expanded column of the reported token.
    pub column: usize,
    pub key: MessageKey,
    /// Construct label, or the referenced line(s) for comment findings.
    pub subject: String,
    pub actual: usize,
    pub expected: Expected,
}

impl Violation {
    #[must_use]
    pub fn message(&self) -> String {
        let Self {
            subject,
            actual,
            expected,
            ..
        } = self;
        match self.key {
            MessageKey::Error => format!(
                "'{subject}' has incorrect indentation level {actual}, expected level should be {expected}."
            ),
            MessageKey::ErrorMulti => format!(
                "'{subject}' has incorrect indentation level {actual}, expected level should be one of the following: {expected}."
            ),
            MessageKey::ChildError => format!(
                "'{subject}' child has incorrect indentation level {actual}, expected level should be {expected}."
            ),
            MessageKey::ChildErrorMulti => format!(
                "'{subject}' child has incorrect indentation level {actual}, expected level should be one of the following: {expected}."
            ),
            MessageKey::CommentSingle => format!(
                "Comment has incorrect indentation level {actual}, expected is {expected}, indentation should be the same level as line {subject}."
            ),
            MessageKey::CommentBlock => format!(
                "Block comment has incorrect indentation level {actual}, expected is {expected}, indentation should be the same level as line {subject}."
            ),
            MessageKey::AsteriskMisaligned => format!(
                "Leading asterisk has incorrect indentation level {actual}, expected level should be {expected}."
            ),
        }
    }

    #[must_use]
    pub const fn is_child_error(&self) -> bool {
        matches!(self.key, MessageKey::ChildError | MessageKey::ChildErrorMulti)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column + 1, self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(key: MessageKey, expected: Expected) -> Violation {
        Violation {
            line: 3,
            column: 10,
            key,
            subject: "case".to_string(),
            actual: 10,
            expected,
        }
    }

    #[test]
    fn renders_label_before_numbers() {
        let v = violation(MessageKey::ChildError, Expected::Exact(8));
        assert_eq!(
            v.message(),
            "'case' child has incorrect indentation level 10, expected level should be 8."
        );
        assert!(v.is_child_error());
    }

    #[test]
    fn multi_level_lists_ascending_values() {
        let level = IndentLevel::new(16).union(&IndentLevel::new(24)).union(&IndentLevel::new(20));
        let expected = Expected::from(&level);
        let v = violation(MessageKey::error_for(&expected), expected);
        assert_eq!(v.key, MessageKey::ErrorMulti);
        assert!(v.message().ends_with("one of the following: 16, 20, 24."));
    }

    #[test]
    fn at_least_renders_bare_number() {
        assert_eq!(Expected::AtLeast(12).to_string(), "12");
        assert!(!Expected::AtLeast(12).is_multi());
    }

    #[test]
    fn comment_messages_reference_lines() {
        let v = Violation {
            line: 7,
            column: 2,
            key: MessageKey::CommentSingle,
            subject: "5, 9".to_string(),
            actual: 2,
            expected: Expected::OneOf(vec![8, 4]),
        };
        assert_eq!(
            v.message(),
            "Comment has incorrect indentation level 2, expected is 8, 4, indentation should be the same level as line 5, 9."
        );
        assert_eq!(v.to_string().split(':').next(), Some("7"));
    }

    #[test]
    fn serializes_expected_as_tagged_value() {
        let v = violation(MessageKey::ChildError, Expected::AtLeast(8));
        let value = serde_json::to_value(&v).unwrap();
        assert_eq!(value["expected"]["kind"], "at_least");
        assert_eq!(value["expected"]["value"], 8);
        assert_eq!(value["subject"], "case");
    }
}
