//! Continuation-line checks for statements that span several lines.

use crate::handlers::{Cx, ancestors};
use crate::violation::{Expected, MessageKey};
use plumb_decree_abi::{Node, TokenKind};
use std::collections::BTreeMap;
use std::ops::Bound;

/// First nodes of these kinds never take part in a wrapping check.
const IGNORED: &[TokenKind] = &[
    TokenKind::Lcurly,
    TokenKind::Rcurly,
    TokenKind::LiteralNew,
    TokenKind::LiteralYield,
    TokenKind::ArrayInit,
    TokenKind::LiteralDefault,
    TokenKind::LiteralCase,
];

type FirstNodes<'n> = BTreeMap<usize, Node<'n>>;

impl Cx<'_> {
    /// Wrap check with the configured indentation, measured from the line of `first`.
    pub(crate) fn check_wrapping<'n>(&self, first: Node<'n>, last: Node<'n>) {
        self.check_wrapping_with(first, last, self.config.line_wrapping_indentation, None, true);
    }

    /// Every line after the first, up to `last`, must start `wrap` columns
    /// right of `start` (the line start of `first` when `None`). A closing
    /// paren that starts a line goes back to `start`.
    pub(crate) fn check_wrapping_with<'n>(
        &self,
        first: Node<'n>,
        last: Node<'n>,
        wrap: usize,
        start: Option<usize>,
        ignore_first_line: bool,
    ) {
        let mut lines = self.collect_first_nodes(first, last);
        let Some((_, &first_line_node)) = lines.first_key_value() else {
            return;
        };
        if first_line_node.is(TokenKind::At) {
            self.check_annotation_lines(&mut lines, first_line_node, wrap);
        }
        if ignore_first_line {
            lines.pop_first();
        }

        let first_node_indent = start.unwrap_or_else(|| self.line_start_of(first_line_node));
        let current_indent = first_node_indent + wrap;
        for &node in lines.values() {
            if self.skips_wrapping(node) {
                continue;
            }
            if node.is(TokenKind::Rparen) {
                self.log_wrapping(node, first_node_indent);
            } else if !node.is_any_of(IGNORED) {
                self.log_wrapping(node, current_indent);
            }
        }
    }

    fn skips_wrapping(&self, node: Node<'_>) -> bool {
        let empty_parameters = node.is(TokenKind::Parameters) && node.first_child().is_none();
        let method_lparen = node.is(TokenKind::Lparen)
            && node.parent().is_some_and(|parent| parent.is(TokenKind::MethodDef));
        let inner_text_block_end =
            node.is(TokenKind::TextBlockLiteralEnd) && !self.is_on_start_of_line(node);
        empty_parameters || method_lparen || inner_text_block_end
    }

    /// Leftmost node of each line between `first` and `last`, without
    /// entering class bodies or statement lists.
    fn collect_first_nodes<'n>(&self, first: Node<'n>, last: Node<'n>) -> FirstNodes<'n> {
        let mut result = FirstNodes::new();
        result.insert(first.line(), first);
        let mut cursor = first.first_child();
        while let Some(mut node) = cursor {
            if node.id() >= last.id() {
                break;
            }
            if node.is_any_of(&[TokenKind::Objblock, TokenKind::Slist]) {
                node = node.last_child().unwrap_or(node);
                if node.id() > last.id() {
                    break;
                }
            }
            let replace = result
                .get(&node.line())
                .is_none_or(|&known| self.expanded_column(known) >= self.expanded_column(node));
            if replace {
                result.insert(node.line(), node);
            }
            cursor = next_in_walk(node);
        }
        result
    }

    /// Leading annotations of a declaration align with their `@`; their
    /// continuation lines are wrapped from it. Handled lines are consumed.
    fn check_annotation_lines<'n>(&self, lines: &mut FirstNodes<'n>, first_line_node: Node<'n>, wrap: usize) {
        let mut cursor = first_line_node.parent();
        while let Some(node) = cursor {
            if node.is(TokenKind::Annotation) {
                if let (Some(at), Some(to)) = (node.first_child(), next_node_line(lines, node)) {
                    if to >= node.line() {
                        self.check_annotation(at, lines, node.line(), to, wrap);
                    }
                }
            }
            cursor = node.next_sibling();
        }
    }

    fn check_annotation<'n>(&self, at: Node<'n>, lines: &mut FirstNodes<'n>, from: usize, to: usize, wrap: usize) {
        let first_node_indent = self.line_start_of(at);
        let current_indent = first_node_indent + wrap;
        let Some(last_annotation_node) = at.parent().and_then(|annotation| annotation.last_child()) else {
            return;
        };
        let keys: Vec<usize> = lines.range(from..=to).map(|(&line, _)| line).collect();
        for line in keys.iter().take(keys.len().saturating_sub(1)) {
            let Some(node) = lines.remove(line) else {
                continue;
            };
            if ancestors(node).any(|ancestor| ancestor.is(TokenKind::AnnotationArrayInit)) {
                continue;
            }
            let closes_alone = node.line() == last_annotation_node.line()
                && is_end_of_scope(last_annotation_node, node);
            let leading_at = node.is(TokenKind::At)
                && node
                    .parent()
                    .and_then(|parent| parent.parent())
                    .is_some_and(|owner| owner.is_any_of(&[TokenKind::Modifiers, TokenKind::Annotations]));
            if closes_alone || leading_at || node.line() == at.line() {
                self.log_wrapping(node, first_node_indent);
            } else {
                self.log_wrapping(node, current_indent);
            }
        }
    }

    fn log_wrapping(&self, node: Node<'_>, expected: usize) {
        let column = self.expanded_column(node);
        let expected = if self.config.force_strict_condition {
            (column != expected).then_some(Expected::Exact(expected))
        } else {
            (column < expected).then_some(Expected::AtLeast(expected))
        };
        if let Some(expected) = expected {
            self.log(node, MessageKey::Error, node.text().to_string(), column, expected);
        }
    }
}

/// Next node of a depth-first walk, climbing out of exhausted subtrees.
fn next_in_walk(node: Node<'_>) -> Option<Node<'_>> {
    if let Some(child) = node.first_child() {
        return Some(child);
    }
    let mut current = node;
    loop {
        if let Some(sibling) = current.next_sibling() {
            return Some(sibling);
        }
        current = current.parent()?;
    }
}

fn next_node_line(lines: &FirstNodes<'_>, annotation: Node<'_>) -> Option<usize> {
    let last_line = annotation.last_child().map_or(annotation.line(), |child| child.line());
    lines
        .range((Bound::Excluded(last_line), Bound::Unbounded))
        .next()
        .or_else(|| lines.last_key_value())
        .map(|(&line, _)| line)
}

/// Whether only closing brackets separate `node` from the annotation's last token.
fn is_end_of_scope(last_annotation_node: Node<'_>, node: Node<'_>) -> bool {
    let mut check = node;
    while check != last_annotation_node {
        if !check.is_any_of(&[TokenKind::Rcurly, TokenKind::Rbrack]) {
            return false;
        }
        let mut climb = check;
        let next = loop {
            if let Some(sibling) = climb.next_sibling() {
                break sibling;
            }
            match climb.parent() {
                Some(parent) => climb = parent,
                None => return true,
            }
        };
        check = next;
    }
    true
}
