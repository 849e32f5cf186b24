//! Conditionals, loops, `try` and friends.

use super::block::{self, BlockParent};
use super::{ConstructKind, Cx, Handler, HandlerId, same_line};
use crate::level::IndentLevel;
use plumb_decree_abi::{Node, TokenKind};

/// Check the node after the opening paren at `indent + basicOffset`.
fn check_paren_expression(cx: &Cx<'_>, me: HandlerId, level: &IndentLevel) {
    let condition = cx
        .ast(me)
        .find_first_token(TokenKind::Lparen)
        .and_then(|lparen| lparen.next_sibling());
    if let Some(condition) = condition {
        cx.check_expression_subtree(me, condition, level, false, false);
    }
}

fn check_wrapping_to_rparen(cx: &Cx<'_>, me: HandlerId) {
    let ast = cx.ast(me);
    if let Some(rparen) = ast.find_first_token(TokenKind::Rparen) {
        cx.check_wrapping(ast, rparen);
    }
}

#[derive(Default)]
pub(crate) struct IfHandler;

impl IfHandler {
    /// `else if` sharing the line of its `else`.
    fn is_if_after_else(cx: &Cx<'_>, me: HandlerId) -> bool {
        let ast = cx.ast(me);
        ast.parent()
            .is_some_and(|parent| parent.is(TokenKind::LiteralElse) && same_line(parent, ast))
    }
}

impl BlockParent for IfHandler {
    fn check_top_level_token(&self, cx: &Cx<'_>, me: HandlerId) {
        if !Self::is_if_after_else(cx, me) {
            block::base_check_top_level_token(self, cx, me);
        }
    }
}

impl Handler for IfHandler {
    fn compute_indent(&self, cx: &Cx<'_>, me: HandlerId) -> IndentLevel {
        match cx.parent(me) {
            Some(parent) if Self::is_if_after_else(cx, me) => cx.indent(parent),
            _ => cx.parent_suggestion(me),
        }
    }

    fn suggested_child_indent(&self, cx: &Cx<'_>, me: HandlerId, child: HandlerId) -> IndentLevel {
        if cx.kind(child) == ConstructKind::Else {
            cx.indent(me)
        } else {
            self.children_expected_indent(cx, me)
        }
    }

    fn check_indentation(&self, cx: &Cx<'_>, me: HandlerId) {
        block::check_block(self, cx, me);
        check_paren_expression(cx, me, &cx.indent(me).shifted(cx.config.basic_offset));
        check_wrapping_to_rparen(cx, me);
    }
}

#[derive(Default)]
pub(crate) struct ElseHandler;

impl BlockParent for ElseHandler {
    fn check_top_level_token(&self, cx: &Cx<'_>, me: HandlerId) {
        let ast = cx.ast(me);
        let if_rcurly = ast
            .parent()
            .and_then(|owner| owner.find_first_token(TokenKind::Slist))
            .and_then(|slist| slist.last_child());
        if !if_rcurly.is_some_and(|rcurly| same_line(rcurly, ast)) {
            block::base_check_top_level_token(self, cx, me);
        }
    }

    fn non_list_child<'t>(&self, cx: &Cx<'t>, me: HandlerId) -> Option<Node<'t>> {
        cx.ast(me).first_child()
    }
}

impl Handler for ElseHandler {
    fn suggested_child_indent(&self, cx: &Cx<'_>, me: HandlerId, _child: HandlerId) -> IndentLevel {
        self.children_expected_indent(cx, me)
    }

    fn check_indentation(&self, cx: &Cx<'_>, me: HandlerId) {
        block::check_block(self, cx, me);
    }
}

#[derive(Default)]
pub(crate) struct WhileHandler;

impl BlockParent for WhileHandler {}

impl Handler for WhileHandler {
    fn suggested_child_indent(&self, cx: &Cx<'_>, me: HandlerId, _child: HandlerId) -> IndentLevel {
        self.children_expected_indent(cx, me)
    }

    fn check_indentation(&self, cx: &Cx<'_>, me: HandlerId) {
        check_paren_expression(cx, me, &cx.indent(me).shifted(cx.config.basic_offset));
        block::check_block(self, cx, me);
    }
}

#[derive(Default)]
pub(crate) struct DoWhileHandler;

impl BlockParent for DoWhileHandler {
    fn non_list_child<'t>(&self, cx: &Cx<'t>, me: HandlerId) -> Option<Node<'t>> {
        cx.ast(me).first_child()
    }
}

impl Handler for DoWhileHandler {
    fn suggested_child_indent(&self, cx: &Cx<'_>, me: HandlerId, _child: HandlerId) -> IndentLevel {
        self.children_expected_indent(cx, me)
    }

    fn check_indentation(&self, cx: &Cx<'_>, me: HandlerId) {
        block::check_block(self, cx, me);
        let indent = cx.indent(me);
        if let Some(keyword) = cx.ast(me).find_first_token(TokenKind::DoWhile) {
            let column = cx.expanded_column(keyword);
            if cx.is_on_start_of_line(keyword) && !indent.is_acceptable(column) {
                cx.log_error(me, keyword, "while", column, &indent);
            }
        }
        check_paren_expression(cx, me, &indent);
    }
}

#[derive(Default)]
pub(crate) struct ForHandler;

impl BlockParent for ForHandler {}

impl Handler for ForHandler {
    fn suggested_child_indent(&self, cx: &Cx<'_>, me: HandlerId, _child: HandlerId) -> IndentLevel {
        self.children_expected_indent(cx, me)
    }

    fn check_indentation(&self, cx: &Cx<'_>, me: HandlerId) {
        let ast = cx.ast(me);
        let expected = cx.indent(me).shifted(cx.config.basic_offset);
        let clauses = if ast.find_first_token(TokenKind::ForInit).is_some() {
            &[TokenKind::ForInit, TokenKind::ForCondition, TokenKind::ForIterator][..]
        } else {
            &[TokenKind::ForEachClause][..]
        };
        for &clause in clauses {
            if let Some(node) = ast.find_first_token(clause) {
                cx.check_expression_subtree(me, node, &expected, false, false);
            }
        }
        block::check_block(self, cx, me);
        check_wrapping_to_rparen(cx, me);
    }
}

#[derive(Default)]
pub(crate) struct TryHandler;

impl TryHandler {
    fn check_resource_paren(cx: &Cx<'_>, me: HandlerId, paren: Option<Node<'_>>, subtype: &str) {
        let Some(paren) = paren else {
            return;
        };
        if cx.is_on_start_of_line(paren) {
            let indent = cx.indent(me);
            let expected =
                IndentLevel::with_offsets(&indent, &[0, signed(cx.config.line_wrapping_indentation)]);
            Self::check_child_indentation(cx, me, paren, subtype, expected);
        }
    }

    fn check_child_indentation(cx: &Cx<'_>, me: HandlerId, node: Node<'_>, subtype: &str, expected: IndentLevel) {
        let expected = if cx.config.force_strict_condition {
            expected
        } else {
            expected.lenient()
        };
        let column = cx.expanded_column(node);
        if !expected.is_acceptable(column) {
            cx.log_error(me, node, subtype, column, &expected);
        }
    }

    fn check_resources(cx: &Cx<'_>, me: HandlerId, spec: Node<'_>) {
        let Some(resources) = spec.find_first_token(TokenKind::Resources) else {
            return;
        };
        let wrap = cx.config.line_wrapping_indentation;
        let start = cx.indent(me).first() + wrap;
        let rparen = spec.find_first_token(TokenKind::Rparen);
        for resource in resources.children().filter(|child| child.is(TokenKind::Resource)) {
            let Some(next) = resource.next_sibling().or(rparen) else {
                continue;
            };
            if cx.is_on_start_of_line(resource) {
                Self::check_child_indentation(cx, me, resource, "resource", IndentLevel::new(start));
                cx.check_wrapping_with(resource, next, wrap, Some(start), true);
            } else {
                cx.check_wrapping(resource, next);
            }
        }
    }
}

impl BlockParent for TryHandler {}

impl Handler for TryHandler {
    fn suggested_child_indent(&self, cx: &Cx<'_>, me: HandlerId, child: HandlerId) -> IndentLevel {
        let resource_new = cx.kind(child) == ConstructKind::New
            && cx.ast(me).first_child().is_some_and(|spec| {
                spec.is(TokenKind::ResourceSpecification) && cx.ast(child).is_descendant_of(spec)
            });
        if matches!(cx.kind(child), ConstructKind::Catch | ConstructKind::Finally) || resource_new {
            cx.indent(me)
        } else {
            self.children_expected_indent(cx, me)
        }
    }

    fn check_indentation(&self, cx: &Cx<'_>, me: HandlerId) {
        block::check_block(self, cx, me);
        let Some(spec) = cx.ast(me).first_child() else {
            return;
        };
        if spec.is(TokenKind::ResourceSpecification) {
            Self::check_resource_paren(cx, me, spec.find_first_token(TokenKind::Lparen), "lparen");
            Self::check_resource_paren(cx, me, spec.find_first_token(TokenKind::Rparen), "rparen");
            Self::check_resources(cx, me, spec);
        }
    }
}

#[derive(Default)]
pub(crate) struct CatchHandler;

impl BlockParent for CatchHandler {}

impl Handler for CatchHandler {
    fn suggested_child_indent(&self, cx: &Cx<'_>, me: HandlerId, _child: HandlerId) -> IndentLevel {
        self.children_expected_indent(cx, me)
    }

    fn check_indentation(&self, cx: &Cx<'_>, me: HandlerId) {
        block::check_block(self, cx, me);
        check_paren_expression(cx, me, &cx.indent(me).shifted(cx.config.basic_offset));
    }
}

#[derive(Default)]
pub(crate) struct FinallyHandler;

impl BlockParent for FinallyHandler {}

impl Handler for FinallyHandler {
    fn suggested_child_indent(&self, cx: &Cx<'_>, me: HandlerId, _child: HandlerId) -> IndentLevel {
        self.children_expected_indent(cx, me)
    }

    fn check_indentation(&self, cx: &Cx<'_>, me: HandlerId) {
        block::check_block(self, cx, me);
    }
}

#[derive(Default)]
pub(crate) struct SynchronizedHandler;

impl SynchronizedHandler {
    fn is_method_modifier(cx: &Cx<'_>, me: HandlerId) -> bool {
        cx.ast(me)
            .parent()
            .is_some_and(|parent| parent.is(TokenKind::Modifiers))
    }
}

impl BlockParent for SynchronizedHandler {}

impl Handler for SynchronizedHandler {
    fn suggested_child_indent(&self, cx: &Cx<'_>, me: HandlerId, _child: HandlerId) -> IndentLevel {
        self.children_expected_indent(cx, me)
    }

    fn check_indentation(&self, cx: &Cx<'_>, me: HandlerId) {
        if Self::is_method_modifier(cx, me) {
            return;
        }
        block::check_block(self, cx, me);
        check_paren_expression(cx, me, &cx.indent(me).shifted(cx.config.basic_offset));
        check_wrapping_to_rparen(cx, me);
    }
}

#[derive(Default)]
pub(crate) struct LabelHandler;

impl Handler for LabelHandler {
    fn compute_indent(&self, cx: &Cx<'_>, me: HandlerId) -> IndentLevel {
        let suggested = cx.parent_suggestion(me);
        IndentLevel::with_offsets(&suggested, &[-signed(cx.config.basic_offset)]).union(&suggested)
    }

    fn check_indentation(&self, cx: &Cx<'_>, me: HandlerId) {
        let ast = cx.ast(me);
        let indent = cx.indent(me);
        cx.check_children(me, ast, &[TokenKind::Ident], &indent, true, false);
        if let Some(statement) = ast.first_child().and_then(|ident| ident.next_sibling()) {
            let expected = indent.shifted(cx.config.basic_offset);
            cx.check_expression_subtree(me, statement, &expected, false, false);
        }
    }
}

/// Offsets are configured as unsigned columns; saturate rather than wrap.
pub(crate) fn signed(offset: usize) -> isize {
    isize::try_from(offset).unwrap_or(isize::MAX)
}
