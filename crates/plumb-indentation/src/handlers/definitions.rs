//! Package, imports, type bodies and their members.

use super::block::{self, BlockParent};
use super::{Cx, Handler, HandlerId, first_node, leftmost_node};
use crate::level::IndentLevel;
use plumb_decree_abi::{Node, TokenKind};

/// Keyword at the handler's indent, then wrapping up to `last`.
fn check_keyword_and_wrap(cx: &Cx<'_>, me: HandlerId, last: Option<Node<'_>>) {
    let ast = cx.ast(me);
    let indent = cx.indent(me);
    let column = cx.expanded_column(ast);
    if !indent.is_acceptable(column) && cx.is_on_start_of_line(ast) {
        cx.log_error(me, ast, "", column, &indent);
    }
    if let Some(last) = last {
        cx.check_wrapping(ast, last);
    }
}

#[derive(Default)]
pub(crate) struct PackageDefHandler;

impl Handler for PackageDefHandler {
    fn check_indentation(&self, cx: &Cx<'_>, me: HandlerId) {
        check_keyword_and_wrap(cx, me, cx.ast(me).last_child());
    }
}

#[derive(Default)]
pub(crate) struct ImportHandler;

impl Handler for ImportHandler {
    fn check_indentation(&self, cx: &Cx<'_>, me: HandlerId) {
        check_keyword_and_wrap(cx, me, cx.ast(me).find_first_token(TokenKind::Semi));
    }
}

const TYPE_KEYWORDS: &[TokenKind] = &[
    TokenKind::LiteralClass,
    TokenKind::LiteralInterface,
    TokenKind::Enum,
    TokenKind::LiteralRecord,
];

const CLASS_CHECKED_CHILDREN: &[TokenKind] = &[
    TokenKind::Expr,
    TokenKind::Objblock,
    TokenKind::LiteralBreak,
    TokenKind::LiteralReturn,
    TokenKind::LiteralThrow,
    TokenKind::LiteralContinue,
];

/// Classes, interfaces, enums, annotation types and records.
#[derive(Default)]
pub(crate) struct ClassDefHandler;

impl ClassDefHandler {
    fn check_declaration(cx: &Cx<'_>, me: HandlerId) {
        let ast = cx.ast(me);
        let indent = cx.indent(me);
        let has_modifiers = ast
            .find_first_token(TokenKind::Modifiers)
            .is_some_and(|modifiers| modifiers.first_child().is_some());
        if has_modifiers {
            cx.check_modifiers(me);
            let keyword = ast.children().find(|child| child.is_any_of(TYPE_KEYWORDS));
            if let Some(keyword) = keyword {
                let column = cx.expanded_column(keyword);
                if cx.is_on_start_of_line(keyword) && !indent.is_acceptable(column) {
                    cx.log_error(me, keyword, keyword.text(), column, &indent);
                }
            }
        } else if !ast.is(TokenKind::AnnotationDef) {
            if let Some(ident) = ast.find_first_token(TokenKind::Ident) {
                let line_start = cx.line_start_of(ident);
                if !indent.is_acceptable(line_start) {
                    cx.log_error(me, ident, "ident", line_start, &indent);
                }
            }
        }
    }
}

impl BlockParent for ClassDefHandler {
    fn top_level_ast<'t>(&self, _cx: &Cx<'t>, _me: HandlerId) -> Option<Node<'t>> {
        None
    }

    fn left_curly<'t>(&self, cx: &Cx<'t>, me: HandlerId) -> Option<Node<'t>> {
        self.list_child(cx, me)?.find_first_token(TokenKind::Lcurly)
    }

    fn right_curly<'t>(&self, cx: &Cx<'t>, me: HandlerId) -> Option<Node<'t>> {
        self.list_child(cx, me)?.find_first_token(TokenKind::Rcurly)
    }

    fn list_child<'t>(&self, cx: &Cx<'t>, me: HandlerId) -> Option<Node<'t>> {
        cx.ast(me).find_first_token(TokenKind::Objblock)
    }

    fn checked_children(&self) -> &'static [TokenKind] {
        CLASS_CHECKED_CHILDREN
    }
}

impl Handler for ClassDefHandler {
    fn suggested_child_indent(&self, cx: &Cx<'_>, me: HandlerId, _child: HandlerId) -> IndentLevel {
        self.children_expected_indent(cx, me)
    }

    fn check_indentation(&self, cx: &Cx<'_>, me: HandlerId) {
        let ast = cx.ast(me);
        Self::check_declaration(cx, me);
        if ast.is(TokenKind::AnnotationDef) {
            if let Some(at) = ast.find_first_token(TokenKind::At) {
                if cx.is_on_start_of_line(at) {
                    cx.check_wrapping_with(ast, at, 0, Some(cx.indent(me).first()), false);
                }
            }
        } else if let Some(body) = self.list_child(cx, me) {
            cx.check_wrapping(ast, body);
        }
        block::check_block(self, cx, me);
    }
}

/// Braced body of a type declaration or anonymous class.
#[derive(Default)]
pub(crate) struct ObjectBlockHandler;

impl BlockParent for ObjectBlockHandler {
    fn top_level_ast<'t>(&self, _cx: &Cx<'t>, _me: HandlerId) -> Option<Node<'t>> {
        None
    }

    fn left_curly<'t>(&self, cx: &Cx<'t>, me: HandlerId) -> Option<Node<'t>> {
        cx.ast(me).find_first_token(TokenKind::Lcurly)
    }

    fn right_curly<'t>(&self, cx: &Cx<'t>, me: HandlerId) -> Option<Node<'t>> {
        cx.ast(me).find_first_token(TokenKind::Rcurly)
    }

    fn list_child<'t>(&self, cx: &Cx<'t>, me: HandlerId) -> Option<Node<'t>> {
        Some(cx.ast(me))
    }
}

impl Handler for ObjectBlockHandler {
    fn compute_indent(&self, cx: &Cx<'_>, me: HandlerId) -> IndentLevel {
        let Some(parent) = cx.parent(me) else {
            return IndentLevel::new(0);
        };
        let owner = cx.ast(me).parent().map(|node| node.kind());
        match owner {
            Some(TokenKind::LiteralNew) => cx
                .indent(parent)
                .union(&cx.suggested_child_indent(parent, me)),
            Some(TokenKind::EnumConstantDef) => cx.suggested_child_indent(parent, me),
            _ => cx.indent(parent),
        }
    }

    fn suggested_child_indent(&self, cx: &Cx<'_>, me: HandlerId, _child: HandlerId) -> IndentLevel {
        self.children_expected_indent(cx, me)
    }

    fn check_indentation(&self, cx: &Cx<'_>, me: HandlerId) {
        let anonymous = cx
            .ast(me)
            .parent()
            .is_some_and(|owner| owner.is(TokenKind::LiteralNew));
        if anonymous {
            block::check_block(self, cx, me);
        }
    }
}

/// Methods, constructors, compact constructors and annotation members.
#[derive(Default)]
pub(crate) struct MethodDefHandler;

impl MethodDefHandler {
    /// First line of the declaration proper, annotations excluded.
    fn declaration_line(ast: Node<'_>) -> usize {
        let mut line = ast
            .find_first_token(TokenKind::Ident)
            .map_or(ast.line(), |ident| ident.line());
        if let Some(ty) = ast.find_first_token(TokenKind::Type) {
            line = first_node(ty).line();
        }
        if let Some(modifiers) = ast.find_first_token(TokenKind::Modifiers) {
            for modifier in modifiers.children().filter(|m| !m.is(TokenKind::Annotation)) {
                line = line.min(modifier.line());
            }
        }
        line
    }

    fn check_modifiers_node(cx: &Cx<'_>, me: HandlerId) {
        let Some(modifiers) = cx.ast(me).find_first_token(TokenKind::Modifiers) else {
            return;
        };
        let indent = cx.indent(me);
        let column = cx.expanded_column(modifiers);
        if cx.is_on_start_of_line(modifiers) && !indent.is_acceptable(column) {
            cx.log_error(me, modifiers, "modifier", column, &indent);
        }
    }

    fn check_throws(cx: &Cx<'_>, me: HandlerId) {
        let ast = cx.ast(me);
        let Some(throws) = ast.find_first_token(TokenKind::LiteralThrows) else {
            return;
        };
        let Some(next) = throws.next_sibling() else {
            return;
        };
        let start = cx.line_start(Self::declaration_line(ast));
        let ignore_first_line = !cx.is_on_start_of_line(throws);
        cx.check_wrapping_with(throws, next, cx.config.throws_indent, Some(start), ignore_first_line);
    }
}

impl BlockParent for MethodDefHandler {
    fn top_level_ast<'t>(&self, _cx: &Cx<'t>, _me: HandlerId) -> Option<Node<'t>> {
        None
    }
}

impl Handler for MethodDefHandler {
    fn suggested_child_indent(&self, cx: &Cx<'_>, me: HandlerId, _child: HandlerId) -> IndentLevel {
        self.children_expected_indent(cx, me)
    }

    fn check_indentation(&self, cx: &Cx<'_>, me: HandlerId) {
        Self::check_modifiers_node(cx, me);
        Self::check_throws(cx, me);
        let ast = cx.ast(me);
        if let Some(rparen) = ast.find_first_token(TokenKind::Rparen) {
            cx.check_wrapping(ast, rparen);
        }
        if self.left_curly(cx, me).is_some() {
            block::check_block(self, cx, me);
        }
    }
}

/// Fields and local variables.
#[derive(Default)]
pub(crate) struct MemberDefHandler;

impl MemberDefHandler {
    fn check_type(cx: &Cx<'_>, me: HandlerId) {
        let Some(ty) = cx.ast(me).find_first_token(TokenKind::Type) else {
            return;
        };
        let first = leftmost_node(ty);
        let indent = cx.indent(me);
        let column = cx.expanded_column(first);
        if cx.is_on_start_of_line(first) && !indent.is_acceptable(column) {
            cx.log_error(me, first, "type", column, &indent);
        }
    }

    fn is_array_declaration(ast: Node<'_>) -> bool {
        ast.find_first_token(TokenKind::Type)
            .and_then(|ty| ty.find_first_token(TokenKind::ArrayDeclarator))
            .is_some()
    }

    /// The terminating `;`, which may be a sibling in a multi-variable declaration.
    fn statement_semicolon(ast: Node<'_>) -> Option<Node<'_>> {
        match ast.last_child() {
            Some(last) if last.is(TokenKind::Semi) => Some(last),
            _ => ast.next_sibling(),
        }
    }
}

impl Handler for MemberDefHandler {
    fn suggested_child_indent(&self, cx: &Cx<'_>, me: HandlerId, _child: HandlerId) -> IndentLevel {
        cx.indent(me)
    }

    fn check_indentation(&self, cx: &Cx<'_>, me: HandlerId) {
        let ast = cx.ast(me);
        let has_modifiers = ast
            .find_first_token(TokenKind::Modifiers)
            .is_some_and(|modifiers| modifiers.first_child().is_some());
        if has_modifiers {
            cx.check_modifiers(me);
        } else {
            Self::check_type(cx, me);
        }
        if let Some(semi) = Self::statement_semicolon(ast) {
            if !Self::is_array_declaration(ast) {
                cx.check_wrapping(ast, semi);
            }
        }
    }
}

#[derive(Default)]
pub(crate) struct StaticInitHandler;

impl BlockParent for StaticInitHandler {}

impl Handler for StaticInitHandler {
    fn suggested_child_indent(&self, cx: &Cx<'_>, me: HandlerId, _child: HandlerId) -> IndentLevel {
        self.children_expected_indent(cx, me)
    }

    fn check_indentation(&self, cx: &Cx<'_>, me: HandlerId) {
        block::check_block(self, cx, me);
    }
}
