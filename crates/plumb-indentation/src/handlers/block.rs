//! Template shared by every construct that owns a braced body.

use super::{Cx, HandlerId, first_node, same_line};
use crate::level::IndentLevel;
use plumb_decree_abi::{Node, TokenKind};

/// Statement kinds checked directly by a block parent.
pub(crate) const CHECKED_CHILDREN: &[TokenKind] = &[
    TokenKind::VariableDef,
    TokenKind::Expr,
    TokenKind::Annotation,
    TokenKind::Objblock,
    TokenKind::LiteralBreak,
    TokenKind::LiteralReturn,
    TokenKind::LiteralThrow,
    TokenKind::LiteralContinue,
    TokenKind::CtorCall,
    TokenKind::SuperCtorCall,
    TokenKind::LiteralYield,
];

/// Hooks of the block template. Every hook has the common default.
pub(crate) trait BlockParent {
    fn top_level_ast<'t>(&self, cx: &Cx<'t>, me: HandlerId) -> Option<Node<'t>> {
        Some(cx.ast(me))
    }

    fn left_curly<'t>(&self, cx: &Cx<'t>, me: HandlerId) -> Option<Node<'t>> {
        cx.ast(me).find_first_token(TokenKind::Slist)
    }

    fn right_curly<'t>(&self, cx: &Cx<'t>, me: HandlerId) -> Option<Node<'t>> {
        cx.ast(me)
            .find_first_token(TokenKind::Slist)?
            .find_first_token(TokenKind::Rcurly)
    }

    fn left_paren<'t>(&self, cx: &Cx<'t>, me: HandlerId) -> Option<Node<'t>> {
        cx.ast(me).find_first_token(TokenKind::Lparen)
    }

    fn right_paren<'t>(&self, cx: &Cx<'t>, me: HandlerId) -> Option<Node<'t>> {
        cx.ast(me).find_first_token(TokenKind::Rparen)
    }

    fn list_child<'t>(&self, cx: &Cx<'t>, me: HandlerId) -> Option<Node<'t>> {
        cx.ast(me).find_first_token(TokenKind::Slist)
    }

    fn non_list_child<'t>(&self, cx: &Cx<'t>, me: HandlerId) -> Option<Node<'t>> {
        cx.ast(me).find_first_token(TokenKind::Rparen)?.next_sibling()
    }

    fn checked_children(&self) -> &'static [TokenKind] {
        CHECKED_CHILDREN
    }

    fn can_children_be_nested(&self) -> bool {
        false
    }

    fn check_top_level_token(&self, cx: &Cx<'_>, me: HandlerId) {
        base_check_top_level_token(self, cx, me);
    }

    fn curly_indent(&self, cx: &Cx<'_>, me: HandlerId) -> IndentLevel {
        base_curly_indent(self, cx, me)
    }

    fn children_expected_indent(&self, cx: &Cx<'_>, me: HandlerId) -> IndentLevel {
        base_children_expected_indent(self, cx, me)
    }
}

pub(crate) fn base_check_top_level_token<B: BlockParent + ?Sized>(block: &B, cx: &Cx<'_>, me: HandlerId) {
    let Some(top) = block.top_level_ast(cx, me) else {
        return;
    };
    let indent = cx.indent(me);
    let column = cx.expanded_column(top);
    if !indent.is_acceptable(column) && cx.is_on_start_of_line(top) {
        cx.log_error(me, top, "", column, &indent);
    }
}

pub(crate) fn base_curly_indent<B: BlockParent + ?Sized>(block: &B, cx: &Cx<'_>, me: HandlerId) -> IndentLevel {
    let indent = cx.indent(me);
    let adjusts = block.left_curly(cx, me).is_some_and(|lcurly| {
        cx.is_on_start_of_line(lcurly)
            && !lcurly
                .parent()
                .is_some_and(|parent| parent.is(TokenKind::InstanceInit))
    });
    if adjusts {
        indent.shifted(cx.config.brace_adjustment)
    } else {
        indent
    }
}

pub(crate) fn base_children_expected_indent<B: BlockParent + ?Sized>(
    block: &B,
    cx: &Cx<'_>,
    me: HandlerId,
) -> IndentLevel {
    let basic = cx.config.basic_offset;
    let indent = cx.indent(me);
    let mut expected = indent.shifted(basic);
    let curlies = curlies(block, cx, me);
    if indent.is_multi_level() {
        if let Some((lcurly, rcurly)) = curlies {
            if cx.is_on_start_of_line(lcurly) {
                expected = IndentLevel::new(cx.expanded_column(lcurly) + basic);
            } else if cx.is_on_start_of_line(rcurly) {
                let level = block.curly_indent(cx, me).shifted(basic);
                let wrapped = level.first() + cx.config.line_wrapping_indentation;
                expected = level.add_acceptable([wrapped]);
            }
        }
    }
    if let Some((lcurly, _)) = curlies {
        if cx.is_on_start_of_line(lcurly) {
            let curly = block.curly_indent(cx, me);
            expected = expected.add_acceptable([curly.first() + basic]);
        }
    }
    expected
}

fn curlies<'t, B: BlockParent + ?Sized>(block: &B, cx: &Cx<'t>, me: HandlerId) -> Option<(Node<'t>, Node<'t>)> {
    Some((block.left_curly(cx, me)?, block.right_curly(cx, me)?))
}

/// Run the template in its fixed order.
pub(crate) fn check_block<B: BlockParent + ?Sized>(block: &B, cx: &Cx<'_>, me: HandlerId) {
    block.check_top_level_token(cx, me);
    let lparen = block.left_paren(cx, me);
    cx.check_left_paren(me, lparen);
    cx.check_right_paren(me, lparen, block.right_paren(cx, me));

    let curlies = curlies(block, cx, me);
    if let Some((lcurly, rcurly)) = curlies {
        check_curly(block, cx, me, lcurly, "lcurly");
        check_curly(block, cx, me, rcurly, "rcurly");
    }

    match block.list_child(cx, me) {
        None => check_non_list_child(block, cx, me),
        Some(list) => {
            let one_line = curlies.is_some_and(|(lcurly, rcurly)| same_line(lcurly, rcurly));
            if !one_line {
                cx.check_children(
                    me,
                    list,
                    block.checked_children(),
                    &block.children_expected_indent(cx, me),
                    true,
                    block.can_children_be_nested(),
                );
            }
        }
    }
}

fn check_curly<B: BlockParent + ?Sized>(block: &B, cx: &Cx<'_>, me: HandlerId, curly: Node<'_>, subtype: &str) {
    let expected = block.curly_indent(cx, me);
    let column = cx.expanded_column(curly);
    if !expected.is_acceptable(column) && cx.is_on_start_of_line(curly) {
        cx.log_error(me, curly, subtype, column, &expected);
    }
}

fn check_non_list_child<B: BlockParent + ?Sized>(block: &B, cx: &Cx<'_>, me: HandlerId) {
    let Some(non_list) = block.non_list_child(cx, me) else {
        return;
    };
    let expected = cx.indent(me).shifted(cx.config.basic_offset);
    cx.check_expression_subtree(me, non_list, &expected, false, false);
    let start = first_node(non_list);
    if start != non_list {
        cx.check_expression_subtree(me, start, &expected, false, false);
    }
}
