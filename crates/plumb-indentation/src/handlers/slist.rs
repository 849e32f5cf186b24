//! Statement lists and the file root.

use super::block::{self, BlockParent};
use super::{ConstructKind, Cx, Handler, HandlerId, same_line};
use crate::level::IndentLevel;
use plumb_decree_abi::{Node, TokenKind};

/// Owners whose handler already checks the braces of their statement list.
const BLOCK_OWNERS: &[TokenKind] = &[
    TokenKind::LiteralFor,
    TokenKind::LiteralWhile,
    TokenKind::LiteralDo,
    TokenKind::LiteralIf,
    TokenKind::LiteralElse,
    TokenKind::LiteralTry,
    TokenKind::LiteralCatch,
    TokenKind::LiteralFinally,
    TokenKind::CtorDef,
    TokenKind::MethodDef,
    TokenKind::CompactCtorDef,
    TokenKind::StaticInit,
    TokenKind::LiteralSynchronized,
    TokenKind::SwitchRule,
];

/// `{ ... }` statement lists, case-group bodies and instance initializers.
#[derive(Default)]
pub(crate) struct SlistHandler;

impl SlistHandler {
    fn has_block_owner(ast: Node<'_>) -> bool {
        ast.parent()
            .is_some_and(|owner| owner.is_any_of(BLOCK_OWNERS))
    }

    /// `case 1: foo();` with the body on the label's line.
    fn is_same_line_case_group(ast: Node<'_>) -> bool {
        ast.parent()
            .is_some_and(|owner| owner.is(TokenKind::CaseGroup) && same_line(owner, ast))
    }
}

impl BlockParent for SlistHandler {
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
}

impl Handler for SlistHandler {
    fn suggested_child_indent(&self, cx: &Cx<'_>, me: HandlerId, child: HandlerId) -> IndentLevel {
        if let Some(parent) = cx.parent(me) {
            let parent_kind = cx.kind(parent);
            let transparent = parent_kind.is_block_parent() && parent_kind != ConstructKind::Block;
            let nested_in_case =
                cx.kind(child) == ConstructKind::Block && parent_kind == ConstructKind::Case;
            if transparent || nested_in_case {
                return cx.suggested_child_indent(parent, child);
            }
        }
        self.children_expected_indent(cx, me)
    }

    fn check_indentation(&self, cx: &Cx<'_>, me: HandlerId) {
        let ast = cx.ast(me);
        if !Self::has_block_owner(ast) && !Self::is_same_line_case_group(ast) {
            block::check_block(self, cx, me);
        }
    }
}

/// Root of the handler tree: everything at the top level starts at column 0.
#[derive(Default)]
pub(crate) struct PrimordialHandler;

impl Handler for PrimordialHandler {
    fn compute_indent(&self, _cx: &Cx<'_>, _me: HandlerId) -> IndentLevel {
        IndentLevel::new(0)
    }

    fn suggested_child_indent(&self, _cx: &Cx<'_>, _me: HandlerId, _child: HandlerId) -> IndentLevel {
        IndentLevel::new(0)
    }

    fn check_indentation(&self, _cx: &Cx<'_>, _me: HandlerId) {}
}
