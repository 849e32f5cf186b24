//! Array initializers, calls, `new`, index operations and lambdas.

use super::block::{self, BlockParent};
use super::statements::signed;
use super::{ConstructKind, Cx, Handler, HandlerId, first_node, same_line};
use crate::level::IndentLevel;
use crate::line_set::LineSet;
use plumb_core::column;
use plumb_decree_abi::{Node, TokenKind};
use std::cell::Cell;

/// `{ ... }` of an array or annotation-array initializer.
pub(crate) struct ArrayInitHandler {
    annotation: bool,
}

impl ArrayInitHandler {
    pub(crate) const fn array() -> Self {
        Self { annotation: false }
    }

    pub(crate) const fn annotation() -> Self {
        Self { annotation: true }
    }

    /// Column of the first non-blank character after `{` on its line.
    fn first_child_column(cx: &Cx<'_>, lcurly: Node<'_>) -> Option<usize> {
        let line = lcurly.line_text();
        let offset = line
            .chars()
            .skip(lcurly.column() + 1)
            .position(|ch| !ch.is_whitespace())?;
        Some(column::effective_column(
            line,
            lcurly.column() + 1 + offset,
            cx.config.tab_width,
        ))
    }
}

impl BlockParent for ArrayInitHandler {
    fn top_level_ast<'t>(&self, _cx: &Cx<'t>, _me: HandlerId) -> Option<Node<'t>> {
        None
    }

    fn left_curly<'t>(&self, cx: &Cx<'t>, me: HandlerId) -> Option<Node<'t>> {
        Some(cx.ast(me))
    }

    fn right_curly<'t>(&self, cx: &Cx<'t>, me: HandlerId) -> Option<Node<'t>> {
        cx.ast(me).find_first_token(TokenKind::Rcurly)
    }

    fn list_child<'t>(&self, cx: &Cx<'t>, me: HandlerId) -> Option<Node<'t>> {
        Some(cx.ast(me))
    }

    fn checked_children(&self) -> &'static [TokenKind] {
        if self.annotation {
            &[
                TokenKind::Expr,
                TokenKind::Annotation,
                TokenKind::AnnotationArrayInit,
            ]
        } else {
            &[TokenKind::Expr, TokenKind::ArrayInit]
        }
    }

    fn can_children_be_nested(&self) -> bool {
        true
    }

    fn curly_indent(&self, cx: &Cx<'_>, me: HandlerId) -> IndentLevel {
        let level = cx.indent(me).shifted(cx.config.brace_adjustment);
        let wrapped = level.last() + cx.config.line_wrapping_indentation;
        level.add_acceptable([wrapped])
    }

    fn children_expected_indent(&self, cx: &Cx<'_>, me: HandlerId) -> IndentLevel {
        let wrap = cx.config.line_wrapping_indentation;
        let mut expected = IndentLevel::with_offsets(
            &cx.indent(me),
            &[signed(cx.config.array_init_indent), signed(wrap)],
        );
        let lcurly = cx.ast(me);
        if let Some(first_child) = Self::first_child_column(cx, lcurly) {
            expected = expected.add_acceptable([first_child, cx.expanded_column(lcurly) + wrap]);
        }
        expected
    }
}

impl Handler for ArrayInitHandler {
    fn compute_indent(&self, cx: &Cx<'_>, me: HandlerId) -> IndentLevel {
        let owner = cx.ast(me).parent();
        if self.annotation {
            return IndentLevel::new(owner.map_or(0, |owner| cx.line_start_of(owner)));
        }
        match owner {
            Some(owner) if owner.is_any_of(&[TokenKind::LiteralNew, TokenKind::Assign]) => {
                IndentLevel::new(cx.line_start_of(owner))
            }
            _ => match cx.parent(me) {
                Some(parent) if cx.kind(parent) == ConstructKind::ArrayInit => {
                    cx.suggested_child_indent(parent, me)
                }
                Some(parent) => cx.indent(parent),
                None => IndentLevel::new(0),
            },
        }
    }

    fn suggested_child_indent(&self, cx: &Cx<'_>, me: HandlerId, _child: HandlerId) -> IndentLevel {
        self.children_expected_indent(cx, me)
    }

    fn check_indentation(&self, cx: &Cx<'_>, me: HandlerId) {
        block::check_block(self, cx, me);
    }
}

/// Method calls and explicit `this(...)` / `super(...)` constructor calls.
#[derive(Default)]
pub(crate) struct MethodCallHandler;

impl MethodCallHandler {
    /// `a.b().c()` where this call's target is itself a call reached through a dot.
    fn is_chained_call_wrapped(ast: Node<'_>) -> bool {
        ast.first_child()
            .and_then(|dot| dot.first_child())
            .and_then(|target| target.first_child())
            .filter(|inner_dot| inner_dot.is(TokenKind::Dot))
            .and_then(|inner_dot| inner_dot.first_child())
            .is_some_and(|inner_target| inner_target.is(TokenKind::MethodCall))
    }

    fn are_chained(outer: Node<'_>, inner: Node<'_>) -> bool {
        outer
            .find_first_token(TokenKind::Rparen)
            .is_some_and(|rparen| same_line(rparen, inner))
    }
}

impl Handler for MethodCallHandler {
    fn compute_indent(&self, cx: &Cx<'_>, me: HandlerId) -> IndentLevel {
        let ast = cx.ast(me);
        if let Some(container) = cx.parent(me).filter(|&p| cx.kind(p).is_method_call()) {
            let container_ast = cx.ast(container);
            return if same_line(container_ast, ast)
                || Self::is_chained_call_wrapped(ast)
                || Self::are_chained(container_ast, ast)
            {
                cx.indent(container)
            } else {
                cx.indent(container)
                    .shifted(cx.config.line_wrapping_indentation)
            };
        }
        let Some(target) = ast.first_child() else {
            return cx.parent_suggestion(me);
        };
        if target.is(TokenKind::LiteralNew) {
            return cx.parent_suggestion(me);
        }
        let mut lines = LineSet::new();
        cx.find_subtree_lines(&mut lines, target);
        let first_column = lines.first_line().and_then(|line| lines.min_column_of(line));
        let line_start = cx.line_start_of(first_node(ast));
        if first_column == Some(line_start) {
            cx.parent_suggestion(me)
        } else {
            IndentLevel::new(line_start)
        }
    }

    fn suggested_child_indent(&self, cx: &Cx<'_>, me: HandlerId, child: HandlerId) -> IndentLevel {
        let ast = cx.ast(me);
        let target = ast.first_child().unwrap_or(ast);
        let mut suggested = IndentLevel::new(cx.line_start_of(target));
        let child_ast = cx.ast(child);
        let child_first = child_ast.first_child().unwrap_or(child_ast);
        if !same_line(child_first, target) {
            suggested = IndentLevel::with_offsets(
                &suggested,
                &[
                    signed(cx.config.basic_offset),
                    signed(cx.config.line_wrapping_indentation),
                ],
            );
        }
        if let Some(rparen) = ast.find_first_token(TokenKind::Rparen) {
            if cx.is_on_start_of_line(rparen) {
                let outer = cx
                    .parent_suggestion(me)
                    .shifted(cx.config.line_wrapping_indentation);
                suggested = suggested.union(&outer);
            }
        }
        suggested
    }

    fn check_indentation(&self, cx: &Cx<'_>, me: HandlerId) {
        let ast = cx.ast(me);
        let lparen = if ast.is(TokenKind::MethodCall) {
            let statement_level = ast
                .parent()
                .and_then(|expr| expr.parent())
                .is_some_and(|owner| owner.is(TokenKind::Slist));
            if !statement_level {
                return;
            }
            if let Some(target) = ast.first_child() {
                cx.check_expression_subtree(me, target, &cx.indent(me), false, false);
            }
            ast
        } else {
            ast.find_first_token(TokenKind::Lparen).unwrap_or(ast)
        };

        cx.check_left_paren(me, Some(lparen));
        let Some(rparen) = ast.find_first_token(TokenKind::Rparen) else {
            return;
        };
        if same_line(lparen, rparen) {
            return;
        }
        if let Some(arguments) = ast.find_first_token(TokenKind::Elist) {
            let expected = cx.indent(me).shifted(cx.config.basic_offset);
            cx.check_expression_subtree(me, arguments, &expected, false, true);
        }
        cx.check_right_paren(me, Some(lparen), Some(rparen));
        cx.check_wrapping(ast, rparen);
    }
}

#[derive(Default)]
pub(crate) struct NewHandler;

impl NewHandler {
    /// `x = new ...`, `return new ...` or a chained `new`, wrapped onto its own line.
    fn is_line_wrapped(ast: Node<'_>) -> bool {
        let parent = ast.parent();
        let grandparent = parent.and_then(|parent| parent.parent());
        let assigned = grandparent
            .is_some_and(|owner| owner.is_any_of(&[TokenKind::Assign, TokenKind::LiteralReturn]));
        let chained = parent.is_some_and(|parent| parent.is(TokenKind::Dot))
            && grandparent.is_some_and(|owner| owner.is(TokenKind::MethodCall));
        assigned || chained
    }
}

impl Handler for NewHandler {
    fn compute_indent(&self, cx: &Cx<'_>, me: HandlerId) -> IndentLevel {
        let ast = cx.ast(me);
        if cx.is_on_start_of_line(ast) {
            let suggested = cx.parent_suggestion(me);
            if Self::is_line_wrapped(ast) {
                suggested.shifted(cx.config.line_wrapping_indentation)
            } else {
                suggested
            }
        } else {
            IndentLevel::new(cx.line_start_of(ast))
        }
    }

    fn suggested_child_indent(&self, cx: &Cx<'_>, me: HandlerId, child: HandlerId) -> IndentLevel {
        let offset = if cx.ast(child).is(TokenKind::Objblock) {
            cx.config.basic_offset
        } else {
            cx.config.line_wrapping_indentation
        };
        cx.indent(me).shifted(offset)
    }

    fn check_indentation(&self, cx: &Cx<'_>, me: HandlerId) {
        let ast = cx.ast(me);
        let indent = cx.indent(me);
        if cx.is_on_start_of_line(ast) {
            let column = cx.expanded_column(ast);
            let flagged = if cx.config.force_strict_condition {
                !indent.is_acceptable(column)
            } else {
                indent.is_greater_than(column)
            };
            if flagged {
                cx.log_error(me, ast, "", column, &indent);
            }
        }
        if let Some(first) = ast.first_child() {
            cx.check_expression_subtree(me, first, &indent, false, false);
        }
        cx.check_left_paren(me, ast.find_first_token(TokenKind::Lparen));
    }

    fn should_increase_indent(&self) -> bool {
        false
    }
}

#[derive(Default)]
pub(crate) struct IndexOpHandler;

impl Handler for IndexOpHandler {
    fn suggested_child_indent(&self, cx: &Cx<'_>, me: HandlerId, _child: HandlerId) -> IndentLevel {
        cx.indent(me)
    }

    fn check_indentation(&self, _cx: &Cx<'_>, _me: HandlerId) {}
}

pub(crate) struct LambdaHandler {
    correctly_indented: Cell<bool>,
}

impl Default for LambdaHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl LambdaHandler {
    pub(crate) const fn new() -> Self {
        Self {
            correctly_indented: Cell::new(true),
        }
    }

    fn flag(&self, cx: &Cx<'_>, me: HandlerId, node: Node<'_>, subtype: &str, level: &IndentLevel) {
        self.correctly_indented.set(false);
        cx.log_error(me, node, subtype, cx.expanded_column(node), level);
    }

    fn check_wrapped_arrow(&self, cx: &Cx<'_>, me: HandlerId, switch_rule: bool) {
        let ast = cx.ast(me);
        let wrap = cx.config.line_wrapping_indentation;
        let level = if switch_rule {
            let label = ast.prev_sibling().unwrap_or(ast);
            IndentLevel::new(cx.line_start_of(label) + wrap)
        } else {
            cx.indent(me).shifted(wrap)
        };
        if !level.is_acceptable(cx.expanded_column(ast)) {
            self.flag(cx, me, ast, "", &level);
        }
    }

    fn check_single_statement_rule(&self, cx: &Cx<'_>, me: HandlerId, body: Node<'_>, wrapped: bool) {
        let mut level = cx.parent_suggestion(me);
        if wrapped {
            level = level.shifted(cx.config.line_wrapping_indentation);
        }
        let start = first_node(body);
        if !level.is_acceptable(cx.expanded_column(start)) {
            self.flag(cx, me, start, "", &level);
        }
    }
}

impl Handler for LambdaHandler {
    fn compute_indent(&self, cx: &Cx<'_>, me: HandlerId) -> IndentLevel {
        if cx.parent_kind(me).is_some_and(ConstructKind::is_method_call) {
            return cx.parent_suggestion(me);
        }
        let ast = cx.ast(me);
        let mut anchor = ast.parent().unwrap_or(ast);
        if cx.parent_kind(me) == Some(ConstructKind::New) {
            anchor = anchor.parent().unwrap_or(anchor);
        }
        let level = IndentLevel::new(cx.line_start_of(anchor));
        match ast.first_child() {
            Some(arguments) if cx.is_on_start_of_line(arguments) => {
                level.shifted(cx.config.line_wrapping_indentation)
            }
            _ => level,
        }
    }

    fn suggested_child_indent(&self, cx: &Cx<'_>, me: HandlerId, _child: HandlerId) -> IndentLevel {
        let indent = cx.indent(me);
        if self.correctly_indented.get() {
            indent.add_acceptable([cx.line_start_of(cx.ast(me))])
        } else {
            indent
        }
    }

    fn check_indentation(&self, cx: &Cx<'_>, me: HandlerId) {
        let ast = cx.ast(me);
        let arguments = ast.first_child();
        let switch_rule = arguments.is_none();

        if let Some(arguments) = arguments {
            if cx.is_on_start_of_line(arguments) {
                let level = cx.indent(me);
                if !level.is_acceptable(cx.expanded_column(arguments)) {
                    self.flag(cx, me, arguments, "arguments", &level);
                }
            }
        }

        let wrapped = cx.is_on_start_of_line(ast);
        if wrapped {
            self.check_wrapped_arrow(cx, me, switch_rule);
        }

        if switch_rule {
            if let Some(body) = ast.next_sibling() {
                if body.is(TokenKind::Expr) && !same_line(ast, body) {
                    self.check_single_statement_rule(cx, me, body, wrapped);
                }
            }
        }
    }
}
