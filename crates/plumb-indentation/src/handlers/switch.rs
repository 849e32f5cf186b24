//! `switch` statements and expressions, their case groups, rules and `yield`.

use super::block::{self, BlockParent};
use super::{Cx, Handler, HandlerId};
use crate::level::IndentLevel;
use plumb_decree_abi::{Node, TokenKind};

const CASE_LABELS: &[TokenKind] = &[TokenKind::LiteralCase, TokenKind::LiteralDefault];

fn case_indent(cx: &Cx<'_>, me: HandlerId) -> IndentLevel {
    cx.parent(me)
        .map_or_else(|| IndentLevel::new(0), |parent| cx.indent(parent))
        .shifted(cx.config.case_indent)
}

#[derive(Default)]
pub(crate) struct SwitchHandler;

impl BlockParent for SwitchHandler {
    fn left_curly<'t>(&self, cx: &Cx<'t>, me: HandlerId) -> Option<Node<'t>> {
        cx.ast(me).find_first_token(TokenKind::Lcurly)
    }

    fn right_curly<'t>(&self, cx: &Cx<'t>, me: HandlerId) -> Option<Node<'t>> {
        cx.ast(me).find_first_token(TokenKind::Rcurly)
    }

    fn list_child<'t>(&self, _cx: &Cx<'t>, _me: HandlerId) -> Option<Node<'t>> {
        None
    }

    fn non_list_child<'t>(&self, _cx: &Cx<'t>, _me: HandlerId) -> Option<Node<'t>> {
        None
    }
}

impl Handler for SwitchHandler {
    fn suggested_child_indent(&self, cx: &Cx<'_>, me: HandlerId, _child: HandlerId) -> IndentLevel {
        self.children_expected_indent(cx, me)
    }

    fn check_indentation(&self, cx: &Cx<'_>, me: HandlerId) {
        let selector = cx
            .ast(me)
            .find_first_token(TokenKind::Lparen)
            .and_then(|lparen| lparen.next_sibling());
        if let Some(selector) = selector {
            let expected = cx.indent(me).shifted(cx.config.basic_offset);
            cx.check_expression_subtree(me, selector, &expected, false, false);
        }
        block::check_block(self, cx, me);
    }
}

#[derive(Default)]
pub(crate) struct CaseHandler;

impl Handler for CaseHandler {
    fn compute_indent(&self, cx: &Cx<'_>, me: HandlerId) -> IndentLevel {
        case_indent(cx, me)
    }

    fn suggested_child_indent(&self, cx: &Cx<'_>, me: HandlerId, _child: HandlerId) -> IndentLevel {
        cx.indent(me)
    }

    fn check_indentation(&self, cx: &Cx<'_>, me: HandlerId) {
        cx.check_children(me, cx.ast(me), CASE_LABELS, &cx.indent(me), true, false);
    }
}

#[derive(Default)]
pub(crate) struct SwitchRuleHandler;

impl BlockParent for SwitchRuleHandler {
    fn top_level_ast<'t>(&self, _cx: &Cx<'t>, _me: HandlerId) -> Option<Node<'t>> {
        None
    }

    fn non_list_child<'t>(&self, _cx: &Cx<'t>, _me: HandlerId) -> Option<Node<'t>> {
        None
    }
}

impl Handler for SwitchRuleHandler {
    fn compute_indent(&self, cx: &Cx<'_>, me: HandlerId) -> IndentLevel {
        case_indent(cx, me)
    }

    fn suggested_child_indent(&self, cx: &Cx<'_>, me: HandlerId, _child: HandlerId) -> IndentLevel {
        self.children_expected_indent(cx, me)
    }

    fn check_indentation(&self, cx: &Cx<'_>, me: HandlerId) {
        cx.check_children(me, cx.ast(me), CASE_LABELS, &cx.indent(me), true, false);
        if self.list_child(cx, me).is_some() {
            block::check_block(self, cx, me);
        }
    }
}

#[derive(Default)]
pub(crate) struct YieldHandler;

impl Handler for YieldHandler {
    fn check_indentation(&self, cx: &Cx<'_>, me: HandlerId) {
        let ast = cx.ast(me);
        let indent = cx.indent(me);
        let column = cx.expanded_column(ast);
        if cx.is_on_start_of_line(ast) && !indent.is_acceptable(column) {
            cx.log_error(me, ast, "", column, &indent);
        }
        if let Some(last) = ast.last_child() {
            cx.check_wrapping(ast, last);
        }
    }
}
