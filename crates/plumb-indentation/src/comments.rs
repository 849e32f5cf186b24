//! Comment indentation: a comment sits at the level of the code it describes.
//!
//! Unlike the structural engine this pass walks comment nodes, so every
//! navigation here uses the comment-aware `*_any` accessors. Columns are
//! tab-expanded before they are compared, like everywhere else.

use crate::IndentationConfig;
use crate::error::IndentationError;
use crate::violation::{Expected, MessageKey, Violation};
use plumb_core::column;
use plumb_decree_abi::{Node, SyntaxTree, TokenKind};
use tracing::{debug, trace};

/// Checks every own-line comment of one tree.
pub struct CommentsCheck<'t> {
    tree: &'t SyntaxTree,
    tab_width: usize,
    violations: Vec<Violation>,
}

impl<'t> CommentsCheck<'t> {
    #[must_use]
    pub fn new(tree: &'t SyntaxTree, config: &IndentationConfig) -> Self {
        Self {
            tree,
            tab_width: config.tab_width,
            violations: Vec::new(),
        }
    }

    /// Check one comment.
    ///
    /// # Errors
    ///
    /// `IndentationError::InvalidArgument` when `comment` is neither a
    /// single-line comment nor the start of a block comment.
    pub fn visit_comment(&mut self, comment: Node<'t>) -> Result<(), IndentationError> {
        match comment.kind() {
            TokenKind::SingleLineComment | TokenKind::BlockCommentBegin => {
                self.check_comment(comment);
                Ok(())
            }
            _ => Err(IndentationError::unexpected_token(comment.text())),
        }
    }

    /// Findings so far, in position order.
    #[must_use]
    pub fn finish(mut self) -> Vec<Violation> {
        self.violations
            .sort_by_key(|violation| (violation.line, violation.column));
        self.violations
    }

    fn check_comment(&mut self, comment: Node<'t>) {
        if self.is_trailing(comment) {
            return;
        }
        let prev = self.previous_statement(comment);
        let next = self.next_statement(comment);

        match (prev, next) {
            (Some(prev), Some(next)) if is_in_empty_case_block(prev, next) => {
                let column = self.col(comment);
                if column < self.col(prev) || column < self.col(next) {
                    self.log_multiline(prev, comment, next);
                }
            }
            (Some(prev), Some(next)) if is_fall_through(prev, next) => {
                if !self.same_level(comment, prev, next) {
                    self.log_multiline(prev, comment, next);
                }
            }
            (Some(prev), Some(next)) if is_in_empty_code_block(prev, next) => {
                if self.col(comment) < self.col(next) {
                    self.log_single(comment, next.line(), self.col(next));
                }
            }
            (prev, Some(next)) if next.is(TokenKind::Rcurly) => {
                if let Some(prev) = prev {
                    self.check_end_of_block(prev, comment, next);
                }
            }
            (_, Some(next)) => {
                if !self.same_level(comment, next, next) && !self.in_same_method_call(comment) {
                    self.log_single(comment, next.line(), self.col(next));
                }
            }
            (_, None) => {}
        }
    }

    fn check_end_of_block(&mut self, prev: Node<'t>, comment: Node<'t>, rcurly: Node<'t>) {
        if prev.is_any_of(&[
            TokenKind::LiteralCase,
            TokenKind::CaseGroup,
            TokenKind::LiteralDefault,
        ]) {
            if self.col(comment) < self.col(rcurly) {
                self.log_single(comment, rcurly.line(), self.col(rcurly));
            }
        } else if is_multiblock_end(rcurly) {
            if !self.same_level(comment, prev, rcurly) {
                self.log_multiline(prev, comment, rcurly);
            }
        } else if !self.same_level(comment, prev, prev) {
            self.log_single(comment, prev.line(), self.line_start(prev.line()));
        }
    }

    // ------------------------------------------------------------------
    // Neighbours
    // ------------------------------------------------------------------

    fn next_statement(&self, comment: Node<'t>) -> Option<Node<'t>> {
        let mut next = comment.next_sibling_any();
        while let Some(candidate) =
            next.filter(|node| node.is_comment() && self.col(*node) != self.col(comment))
        {
            next = candidate.next_sibling_any();
        }
        if next.is_some() {
            return next;
        }
        let parent = comment.parent()?;
        if parent.is_any_of(&[TokenKind::Modifiers, TokenKind::Annotations]) {
            return parent.next_sibling();
        }
        if parent.is(TokenKind::PackageDef) && comment.line() < parent.line() {
            return Some(parent);
        }
        None
    }

    fn previous_statement(&self, comment: Node<'t>) -> Option<Node<'t>> {
        if self.is_distributed_previous(comment) {
            distributed_previous(comment)
        } else {
            self.one_line_previous(comment)
        }
    }

    /// The statement above ends a multi-line construct.
    fn is_distributed_previous(&self, comment: Node<'t>) -> bool {
        let previous = comment.prev_sibling_any();
        self.is_distributed_expression(comment)
            || previous.is_some_and(is_distributed_return)
            || previous.is_some_and(is_distributed_throw)
    }

    fn is_distributed_expression(&self, comment: Node<'t>) -> bool {
        let mut previous = comment.prev_sibling_any();
        while let Some(node) = previous.filter(Node::is_comment) {
            previous = node.prev_sibling_any();
        }
        let Some(previous) = previous else {
            return false;
        };
        if previous.is(TokenKind::Semi) && self.is_on_previous_line(comment, previous) {
            let Some(mut current) = previous.prev_sibling_any() else {
                return false;
            };
            while let Some(child) = current.first_child_any() {
                current = child;
            }
            previous.line() != current.line()
        } else {
            is_statement_with_possible_curlies(previous)
        }
    }

    /// Depth-first search from the enclosing block for the token that starts
    /// the code line right above `comment`.
    fn one_line_previous(&self, comment: Node<'t>) -> Option<Node<'t>> {
        let mut root = comment.parent();
        while let Some(node) = root.filter(|node| !is_block_start(*node)) {
            root = node.parent();
        }
        let mut stack = vec![root?];
        while let Some(mut cursor) = stack.pop() {
            loop {
                if let Some(found) = self.find_previous_statement(comment, cursor) {
                    return Some(found);
                }
                if let Some(sibling) = cursor.next_sibling_any() {
                    stack.push(sibling);
                }
                match cursor.first_child_any() {
                    Some(child) => cursor = child,
                    None => break,
                }
            }
        }
        None
    }

    fn find_previous_statement(&self, comment: Node<'t>, root: Node<'t>) -> Option<Node<'t>> {
        // Case-group bodies can start below their comments.
        let from_switch = if root.line() >= comment.line() {
            previous_from_switch_block(comment)
        } else {
            None
        };

        let first = root.first_child_any();
        let line_token = if root.is(TokenKind::Expr)
            && first.and_then(|node| node.first_child_any()).is_some()
        {
            match first {
                Some(new) if new.is(TokenKind::LiteralNew) => Some(new),
                _ => token_beginning_the_line(root),
            }
        } else if root.is(TokenKind::Plus) {
            first
        } else {
            Some(root)
        };

        line_token
            .filter(|token| !token.is_comment() && self.is_on_previous_line(comment, *token))
            .or(from_switch)
    }

    /// `checked` is the last code line above `current`, skipping comments and
    /// blank lines in between.
    fn is_on_previous_line(&self, current: Node<'t>, checked: Node<'t>) -> bool {
        let mut next = self.next_token(checked);
        let mut distance = 1;
        if next.is_some_and(|node| node.is_comment()) {
            distance += self.count_blank_lines(checked, current);
        }
        while let Some(node) = next.filter(|node| *node != current && node.is_comment()) {
            if node.is(TokenKind::BlockCommentBegin) {
                if let Some(end) = node.last_child_any() {
                    distance += end.line().saturating_sub(node.line());
                }
            }
            distance += 1;
            next = node.next_sibling_any();
        }
        current.line().checked_sub(checked.line()) == Some(distance)
    }

    fn next_token(&self, checked: Node<'t>) -> Option<Node<'t>> {
        let next = if checked.is_any_of(&[
            TokenKind::Slist,
            TokenKind::ArrayInit,
            TokenKind::CaseGroup,
        ]) {
            checked.first_child_any()
        } else {
            checked.next_sibling_any()
        };
        match next {
            Some(node) if node.is_comment() && self.is_trailing(node) => node.next_sibling_any(),
            other => other,
        }
    }

    fn count_blank_lines(&self, start: Node<'_>, end: Node<'_>) -> usize {
        (start.line() + 1..=end.line())
            .filter(|&line| column::is_blank(self.tree.line(line)))
            .count()
    }

    // ------------------------------------------------------------------
    // Columns and logging
    // ------------------------------------------------------------------

    /// Code precedes the comment on its line, or a block comment is followed
    /// by code on the same line.
    fn is_trailing(&self, comment: Node<'_>) -> bool {
        let after_code = !column::is_blank_before(comment.line_text(), comment.column());
        if comment.is(TokenKind::SingleLineComment) {
            after_code
        } else {
            after_code
                || comment
                    .next_sibling_any()
                    .is_some_and(|next| next.line() == comment.line())
        }
    }

    fn col(&self, node: Node<'_>) -> usize {
        column::effective_column(node.line_text(), node.column(), self.tab_width)
    }

    fn line_start(&self, line: usize) -> usize {
        column::line_start(self.tree.line(line), self.tab_width)
    }

    fn same_level(&self, comment: Node<'_>, prev: Node<'_>, next: Node<'_>) -> bool {
        let column = self.col(comment);
        column == self.line_start(next.line()) || column == self.line_start(prev.line())
    }

    /// A comment aligned with the first argument of the call it sits in.
    fn in_same_method_call(&self, comment: Node<'_>) -> bool {
        comment.parent().is_some_and(|call| {
            call.is(TokenKind::MethodCall)
                && call
                    .find_first_token(TokenKind::Elist)
                    .is_some_and(|args| self.col(args) == self.col(comment))
        })
    }

    fn log_single(&mut self, comment: Node<'_>, line: usize, expected: usize) {
        self.push(comment, line.to_string(), Expected::Exact(expected));
    }

    fn log_multiline(&mut self, prev: Node<'_>, comment: Node<'_>, next: Node<'_>) {
        let subject = format!("{}, {}", prev.line(), next.line());
        let expected = Expected::OneOf(vec![
            self.line_start(prev.line()),
            self.line_start(next.line()),
        ]);
        self.push(comment, subject, expected);
    }

    fn push(&mut self, comment: Node<'_>, subject: String, expected: Expected) {
        let key = if comment.is(TokenKind::SingleLineComment) {
            MessageKey::CommentSingle
        } else {
            MessageKey::CommentBlock
        };
        let column = self.col(comment);
        let violation = Violation {
            line: comment.line(),
            column,
            key,
            subject,
            actual: column,
            expected,
        };
        trace!(line = violation.line, key = %key, "{}", violation.message());
        self.violations.push(violation);
    }
}

/// Check every single-line and block comment of `tree`.
///
/// # Errors
///
/// Never for trees built by [`SyntaxTree::from_spec`]; see [`CommentsCheck::visit_comment`].
pub fn check_comments(
    tree: &SyntaxTree,
    config: &IndentationConfig,
) -> Result<Vec<Violation>, IndentationError> {
    let mut check = CommentsCheck::new(tree, config);
    let mut visited = 0usize;
    for node in tree.nodes().filter(|node| {
        node.is_any_of(&[TokenKind::SingleLineComment, TokenKind::BlockCommentBegin])
    }) {
        check.visit_comment(node)?;
        visited += 1;
    }
    let violations = check.finish();
    debug!(comments = visited, violations = violations.len(), "comment pass done");
    Ok(violations)
}

fn is_in_empty_case_block(prev: Node<'_>, next: Node<'_>) -> bool {
    prev.is_any_of(&[TokenKind::LiteralCase, TokenKind::CaseGroup])
        && next.is_any_of(&[TokenKind::LiteralCase, TokenKind::LiteralDefault])
}

fn is_fall_through(prev: Node<'_>, next: Node<'_>) -> bool {
    !prev.is(TokenKind::LiteralCase)
        && next.is_any_of(&[TokenKind::LiteralCase, TokenKind::LiteralDefault])
}

fn is_in_empty_code_block(prev: Node<'_>, next: Node<'_>) -> bool {
    prev.is_any_of(&[
        TokenKind::Slist,
        TokenKind::Lcurly,
        TokenKind::ArrayInit,
        TokenKind::Objblock,
    ]) && next.is(TokenKind::Rcurly)
}

fn is_block_start(node: Node<'_>) -> bool {
    node.is_any_of(&[
        TokenKind::Slist,
        TokenKind::Objblock,
        TokenKind::ArrayInit,
        TokenKind::CaseGroup,
    ])
}

fn is_statement_with_possible_curlies(node: Node<'_>) -> bool {
    node.is_any_of(&[
        TokenKind::LiteralIf,
        TokenKind::LiteralTry,
        TokenKind::LiteralFor,
        TokenKind::LiteralDo,
        TokenKind::LiteralWhile,
        TokenKind::LiteralSwitch,
        TokenKind::MethodDef,
    ]) || node.kind().is_type_declaration()
}

/// `return` with a value.
fn is_distributed_return(node: Node<'_>) -> bool {
    node.is(TokenKind::LiteralReturn)
        && node
            .first_child_any()
            .and_then(|first| first.next_sibling_any())
            .is_some()
}

/// `throw` whose terminating semicolon sits on a later line.
fn is_distributed_throw(node: Node<'_>) -> bool {
    node.is(TokenKind::LiteralThrow)
        && node
            .first_child_any()
            .and_then(|first| first.next_sibling_any())
            .is_some_and(|semi| semi.line() != node.line())
}

fn distributed_previous(comment: Node<'_>) -> Option<Node<'_>> {
    let mut current = comment.prev_sibling_any()?;
    while current.is_comment() {
        current = current.prev_sibling_any()?;
    }
    if current.is(TokenKind::Semi) {
        current = current.prev_sibling_any()?;
        while let Some(child) = current.first_child_any() {
            current = if current.is_comment() {
                current.next_sibling_any()?
            } else {
                child
            };
        }
    }
    Some(current)
}

/// `a.b()` style expression: the call target has an operand after its first.
fn invokes_through_reference(expr: Node<'_>) -> bool {
    expr.first_child_any()
        .and_then(|node| node.first_child_any())
        .and_then(|node| node.first_child_any())
        .and_then(|node| node.next_sibling_any())
        .is_some()
}

fn token_beginning_the_line(expr: Node<'_>) -> Option<Node<'_>> {
    if invokes_through_reference(expr) {
        start_of_call_chain(expr)
    } else {
        expr.first_child_any()?.find_first_token(TokenKind::Ident)
    }
}

fn start_of_call_chain(expr: Node<'_>) -> Option<Node<'_>> {
    let mut start = expr;
    while let Some(child) = start
        .first_child_any()
        .filter(|child| child.line() == expr.line())
    {
        start = child;
    }
    match start.first_child_any() {
        Some(child) => child.next_sibling_any(),
        None => Some(start),
    }
}

fn previous_from_switch_block(comment: Node<'_>) -> Option<Node<'_>> {
    let parent = comment.parent()?;
    if parent.is(TokenKind::CaseGroup) {
        previous_under_case(parent)
    } else {
        previous_case_token(parent)
    }
}

/// Last statement of the case group before the comment's own group.
fn previous_under_case(case_group: Node<'_>) -> Option<Node<'_>> {
    let previous_group = case_group.prev_sibling_any()?;
    let mut body = previous_group.last_child_any()?.last_child_any()?;
    if body.is(TokenKind::Semi) {
        body = body.prev_sibling_any()?;
    }
    let statement = if body.is(TokenKind::Expr) {
        if invokes_through_reference(body) {
            start_of_call_chain(body)?
        } else {
            body.first_child_any()?.first_child_any()?
        }
    } else if body.is(TokenKind::Slist) {
        body.parent()?.parent()?
    } else {
        body
    };
    if statement.is_comment() {
        statement.next_sibling_any()
    } else {
        Some(statement)
    }
}

fn previous_case_token(parent: Node<'_>) -> Option<Node<'_>> {
    let case = parent.parent()?.parent()?.prev_sibling_any()?;
    case.is(TokenKind::LiteralCase).then_some(case)
}

/// `} else {`, `} catch`, `} finally`: another block continues on the brace's line.
fn is_multiblock_end(rcurly: Node<'_>) -> bool {
    let Some(block) = rcurly.parent() else {
        return false;
    };
    let continues = block
        .next_sibling_any()
        .is_some_and(|next| next.line() == rcurly.line());
    let owner = block.parent();
    let finally_follows = owner.is_some_and(|owner| {
        owner.is(TokenKind::LiteralCatch)
            && owner
                .next_sibling_any()
                .is_some_and(|next| next.line() == rcurly.line())
    });
    continues || finally_follows
}

#[cfg(test)]
mod tests {
    use super::*;
    use plumb_decree_abi::NodeSpec;

    fn tree(source: &str, root: NodeSpec) -> SyntaxTree {
        SyntaxTree::from_spec(source, &root).unwrap()
    }

    fn comment(line: usize, column: usize) -> NodeSpec {
        NodeSpec::at(TokenKind::SingleLineComment, line, column, "//")
    }

    /// `{` / `x();` / comment / `}` with the comment at `column`.
    fn block_ending_in_comment(column: usize) -> SyntaxTree {
        let indent = " ".repeat(column);
        let source = format!("void m() {{\n    x();\n{indent}// done\n}}\n");
        tree(
            &source,
            NodeSpec::new(TokenKind::CompilationUnit).with([NodeSpec::at(
                TokenKind::MethodDef,
                1,
                0,
                "",
            )
            .with([
                NodeSpec::at(TokenKind::Ident, 1, 5, "m"),
                NodeSpec::at(TokenKind::Slist, 1, 9, "{").with([
                    NodeSpec::at(TokenKind::Expr, 2, 5, "").with([NodeSpec::at(
                        TokenKind::MethodCall,
                        2,
                        5,
                        "(",
                    )
                    .with([
                        NodeSpec::at(TokenKind::Ident, 2, 4, "x"),
                        NodeSpec::at(TokenKind::Elist, 2, 6, ""),
                        NodeSpec::at(TokenKind::Rparen, 2, 6, ")"),
                    ])]),
                    NodeSpec::at(TokenKind::Semi, 2, 7, ";"),
                    comment(3, column),
                    NodeSpec::at(TokenKind::Rcurly, 4, 0, "}"),
                ]),
            ])]),
        )
    }

    #[test]
    fn comment_aligned_with_last_statement_passes() {
        let tree = block_ending_in_comment(4);
        let violations = check_comments(&tree, &IndentationConfig::default()).unwrap();
        assert!(violations.is_empty(), "{violations:?}");
    }

    #[test]
    fn comment_before_brace_reports_previous_statement() {
        let tree = block_ending_in_comment(2);
        let violations = check_comments(&tree, &IndentationConfig::default()).unwrap();
        assert_eq!(violations.len(), 1);
        let found = &violations[0];
        assert_eq!(found.key, MessageKey::CommentSingle);
        assert_eq!(found.subject, "2");
        assert_eq!(found.actual, 2);
        assert_eq!(found.expected, Expected::Exact(4));
    }

    #[test]
    fn trailing_comment_is_skipped() {
        let source = "int a; // note\n";
        let tree = tree(
            source,
            NodeSpec::new(TokenKind::CompilationUnit).with([
                NodeSpec::at(TokenKind::VariableDef, 1, 0, ""),
                NodeSpec::at(TokenKind::Semi, 1, 5, ";"),
                comment(1, 7),
            ]),
        );
        let violations = check_comments(&tree, &IndentationConfig::default()).unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn non_comment_token_is_rejected() {
        let tree = tree(
            "x\n",
            NodeSpec::new(TokenKind::CompilationUnit).with([NodeSpec::at(
                TokenKind::Ident,
                1,
                0,
                "x",
            )]),
        );
        let config = IndentationConfig::default();
        let mut check = CommentsCheck::new(&tree, &config);
        let ident = tree
            .nodes()
            .find(|node| node.is(TokenKind::Ident))
            .unwrap();
        let err = check.visit_comment(ident).unwrap_err();
        assert_eq!(err.to_string(), "Unexpected token type: x");
    }
}
