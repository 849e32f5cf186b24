//! Leading asterisks of block comment continuation lines.

use crate::IndentationConfig;
use crate::violation::{Expected, MessageKey, Violation};
use plumb_core::column;
use plumb_decree_abi::{Node, SyntaxTree, TokenKind};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Column the `*` of a continuation line lines up with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AsteriskAlignment {
    /// Under the opening `/`.
    Left,
    /// Under the opening `*`.
    #[default]
    Right,
}

impl FromStr for AsteriskAlignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(format!("unknown asterisk alignment: {other}")),
        }
    }
}

/// Check every multi-line block comment of `tree`.
#[must_use]
pub fn check_asterisk_alignment(tree: &SyntaxTree, config: &IndentationConfig) -> Vec<Violation> {
    let mut violations: Vec<Violation> = tree
        .nodes()
        .filter(|node| node.is(TokenKind::BlockCommentBegin))
        .flat_map(|comment| misaligned_lines(tree, comment, config))
        .collect();
    violations.sort_by_key(|violation| (violation.line, violation.column));
    violations
}

fn misaligned_lines(tree: &SyntaxTree, comment: Node<'_>, config: &IndentationConfig) -> Vec<Violation> {
    let last_line = comment
        .last_child_any()
        .map_or(comment.line(), |end| end.line());
    let opening = column::effective_column(comment.line_text(), comment.column(), config.tab_width);
    let expected = match config.asterisk_alignment {
        AsteriskAlignment::Left => opening,
        AsteriskAlignment::Right => opening + 1,
    };

    (comment.line() + 1..=last_line)
        .filter_map(|line| {
            let text = tree.line(line);
            let index = column::first_non_whitespace(text)?;
            if text.chars().nth(index) != Some('*') {
                return None;
            }
            let actual = column::effective_column(text, index, config.tab_width);
            (actual != expected).then(|| Violation {
                line,
                column: actual,
                key: MessageKey::AsteriskMisaligned,
                subject: "*".to_string(),
                actual,
                expected: Expected::Exact(expected),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use plumb_decree_abi::NodeSpec;

    fn javadoc(source: &str, end_line: usize, end_column: usize) -> SyntaxTree {
        let root = NodeSpec::new(TokenKind::CompilationUnit).with([NodeSpec::at(
            TokenKind::BlockCommentBegin,
            1,
            4,
            "/*",
        )
        .with([
            NodeSpec::at(TokenKind::CommentContent, 1, 6, "*"),
            NodeSpec::at(TokenKind::BlockCommentEnd, end_line, end_column, "*/"),
        ])]);
        SyntaxTree::from_spec(source, &root).unwrap()
    }

    #[test]
    fn right_alignment_is_the_default() {
        let tree = javadoc("    /**\n     * Docs.\n     */\n", 3, 5);
        let violations = check_asterisk_alignment(&tree, &IndentationConfig::default());
        assert!(violations.is_empty());
    }

    #[test]
    fn left_alignment_flags_right_aligned_stars() {
        let tree = javadoc("    /**\n     * Docs.\n    */\n", 3, 4);
        let config = IndentationConfig {
            asterisk_alignment: AsteriskAlignment::Left,
            ..IndentationConfig::default()
        };
        let violations = check_asterisk_alignment(&tree, &config);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, 2);
        assert_eq!(violations[0].actual, 5);
        assert_eq!(violations[0].expected, Expected::Exact(4));
        assert_eq!(
            violations[0].message(),
            "Leading asterisk has incorrect indentation level 5, expected level should be 4."
        );
    }

    #[test]
    fn lines_without_leading_star_are_ignored() {
        let tree = javadoc("    /*\n   plain text\n     */\n", 3, 5);
        assert!(check_asterisk_alignment(&tree, &IndentationConfig::default()).is_empty());
    }

    #[test]
    fn parses_alignment_names() {
        assert_eq!("LEFT".parse::<AsteriskAlignment>(), Ok(AsteriskAlignment::Left));
        assert!("center".parse::<AsteriskAlignment>().is_err());
    }
}
