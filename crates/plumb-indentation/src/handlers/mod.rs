//! Construct handlers and the per-file context they share.
//!
//! Handlers live in an arena owned by [`Cx`]. A handler never stores tree
//! nodes or parent pointers itself: it receives the context plus its own
//! [`HandlerId`] and reads everything else through them.

pub(crate) mod block;
pub(crate) mod definitions;
pub(crate) mod expressions;
pub(crate) mod slist;
pub(crate) mod statements;
pub(crate) mod switch;

use crate::IndentationConfig;
use crate::factory;
use crate::level::IndentLevel;
use crate::line_set::LineSet;
use crate::violation::{Expected, MessageKey, Violation};
use plumb_core::column;
use plumb_decree_abi::{Node, SyntaxTree, TokenKind};
use std::cell::{OnceCell, RefCell};
use std::collections::HashSet;
use tracing::trace;

/// Index of a handler in the per-file arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(usize);

/// Closed set of constructs the structural engine knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstructKind {
    Primordial,
    Block,
    If,
    Else,
    While,
    DoWhile,
    For,
    Try,
    Catch,
    Finally,
    Synchronized,
    Label,
    Switch,
    Case,
    SwitchRule,
    Yield,
    PackageDef,
    Import,
    ClassDef,
    InterfaceDef,
    EnumDef,
    AnnotationDef,
    RecordDef,
    ObjectBlock,
    MethodDef,
    CtorDef,
    AnnotationFieldDef,
    CompactCtorDef,
    MemberDef,
    StaticInit,
    ArrayInit,
    AnnotationArrayInit,
    MethodCall,
    CtorCall,
    SuperCtorCall,
    New,
    IndexOp,
    Lambda,
}

impl ConstructKind {
    /// Name used in violation messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Primordial => "primordial",
            Self::Block => "block",
            Self::If => "if",
            Self::Else => "else",
            Self::While => "while",
            Self::DoWhile => "do..while",
            Self::For => "for",
            Self::Try => "try",
            Self::Catch => "catch",
            Self::Finally => "finally",
            Self::Synchronized => "synchronized",
            Self::Label => "label",
            Self::Switch => "switch",
            Self::Case => "case",
            Self::SwitchRule => "switch rule",
            Self::Yield => "yield",
            Self::PackageDef => "package def",
            Self::Import => "import",
            Self::ClassDef => "class def",
            Self::InterfaceDef => "interface def",
            Self::EnumDef => "enum def",
            Self::AnnotationDef => "annotation def",
            Self::RecordDef => "record def",
            Self::ObjectBlock => "object def",
            Self::MethodDef => "method def",
            Self::CtorDef => "ctor def",
            Self::AnnotationFieldDef => "annotation field def",
            Self::CompactCtorDef => "compact ctor def",
            Self::MemberDef => "member def",
            Self::StaticInit => "static initialization",
            Self::ArrayInit => "array initialization",
            Self::AnnotationArrayInit => "annotation array initialization",
            Self::MethodCall => "method call",
            Self::CtorCall => "ctor call",
            Self::SuperCtorCall => "super ctor call",
            Self::New => "new",
            Self::IndexOp => "index op",
            Self::Lambda => "lambda",
        }
    }

    /// Constructs driven by the block template.
    #[must_use]
    pub const fn is_block_parent(self) -> bool {
        matches!(
            self,
            Self::Block
                | Self::If
                | Self::Else
                | Self::While
                | Self::DoWhile
                | Self::For
                | Self::Try
                | Self::Catch
                | Self::Finally
                | Self::Synchronized
                | Self::Switch
                | Self::SwitchRule
                | Self::ClassDef
                | Self::InterfaceDef
                | Self::EnumDef
                | Self::AnnotationDef
                | Self::RecordDef
                | Self::ObjectBlock
                | Self::MethodDef
                | Self::CtorDef
                | Self::AnnotationFieldDef
                | Self::CompactCtorDef
                | Self::StaticInit
                | Self::ArrayInit
                | Self::AnnotationArrayInit
        )
    }

    #[must_use]
    pub const fn is_method_call(self) -> bool {
        matches!(self, Self::MethodCall | Self::CtorCall | Self::SuperCtorCall)
    }
}

/// Behaviour of one construct.
pub(crate) trait Handler {
    /// Columns this construct's introducing token may start at.
    fn compute_indent(&self, cx: &Cx<'_>, me: HandlerId) -> IndentLevel {
        cx.parent_suggestion(me)
    }

    /// Columns the construct expects `child` to start at.
    fn suggested_child_indent(&self, cx: &Cx<'_>, me: HandlerId, _child: HandlerId) -> IndentLevel {
        cx.indent(me).shifted(cx.config.basic_offset)
    }

    fn check_indentation(&self, cx: &Cx<'_>, me: HandlerId);

    /// Whether continuation lines below the construct's own line get an extra level.
    fn should_increase_indent(&self) -> bool {
        true
    }
}

pub(crate) struct HandlerEntry<'t> {
    handler: Box<dyn Handler>,
    kind: ConstructKind,
    ast: Node<'t>,
    parent: Option<HandlerId>,
    indent: OnceCell<IndentLevel>,
}

/// Per-file state shared by every handler of one pass.
pub(crate) struct Cx<'t> {
    pub(crate) tree: &'t SyntaxTree,
    pub(crate) config: &'t IndentationConfig,
    entries: Vec<HandlerEntry<'t>>,
    violations: RefCell<Vec<Violation>>,
    logged_lines: RefCell<HashSet<usize>>,
}

impl<'t> Cx<'t> {
    pub(crate) fn new(tree: &'t SyntaxTree, config: &'t IndentationConfig) -> Self {
        Self {
            tree,
            config,
            entries: Vec::new(),
            violations: RefCell::new(Vec::new()),
            logged_lines: RefCell::new(HashSet::new()),
        }
    }

    // ------------------------------------------------------------------
    // Arena
    // ------------------------------------------------------------------

    pub(crate) fn push(
        &mut self,
        handler: Box<dyn Handler>,
        kind: ConstructKind,
        ast: Node<'t>,
        parent: Option<HandlerId>,
    ) -> HandlerId {
        let id = HandlerId(self.entries.len());
        self.entries.push(HandlerEntry {
            handler,
            kind,
            ast,
            parent,
            indent: OnceCell::new(),
        });
        id
    }

    fn entry(&self, id: HandlerId) -> &HandlerEntry<'t> {
        &self.entries[id.0]
    }

    pub(crate) fn ast(&self, id: HandlerId) -> Node<'t> {
        self.entry(id).ast
    }

    pub(crate) fn kind(&self, id: HandlerId) -> ConstructKind {
        self.entry(id).kind
    }

    pub(crate) fn parent(&self, id: HandlerId) -> Option<HandlerId> {
        self.entry(id).parent
    }

    pub(crate) fn parent_kind(&self, id: HandlerId) -> Option<ConstructKind> {
        self.parent(id).map(|parent| self.kind(parent))
    }

    pub(crate) fn handler_count(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn check(&self, id: HandlerId) {
        self.entry(id).handler.check_indentation(self, id);
    }

    /// Cached indentation of a handler.
    pub(crate) fn indent(&self, id: HandlerId) -> IndentLevel {
        let entry = self.entry(id);
        entry
            .indent
            .get_or_init(|| entry.handler.compute_indent(self, id))
            .clone()
    }

    pub(crate) fn suggested_child_indent(&self, parent: HandlerId, child: HandlerId) -> IndentLevel {
        self.entry(parent)
            .handler
            .suggested_child_indent(self, parent, child)
    }

    /// What the parent suggests for `me`; column 0 for the root.
    pub(crate) fn parent_suggestion(&self, me: HandlerId) -> IndentLevel {
        self.parent(me).map_or_else(
            || IndentLevel::new(0),
            |parent| self.suggested_child_indent(parent, me),
        )
    }

    pub(crate) fn into_violations(self) -> Vec<Violation> {
        self.violations.into_inner()
    }

    // ------------------------------------------------------------------
    // Columns
    // ------------------------------------------------------------------

    pub(crate) fn expanded_column(&self, node: Node<'_>) -> usize {
        column::effective_column(node.line_text(), node.column(), self.config.tab_width)
    }

    pub(crate) fn line_start(&self, line_no: usize) -> usize {
        column::line_start(self.tree.line(line_no), self.config.tab_width)
    }

    pub(crate) fn line_start_of(&self, node: Node<'_>) -> usize {
        self.line_start(node.line())
    }

    pub(crate) fn is_on_start_of_line(&self, node: Node<'_>) -> bool {
        self.line_start_of(node) == self.expanded_column(node)
    }

    // ------------------------------------------------------------------
    // Logging
    // ------------------------------------------------------------------

    /// Record a violation unless its line already has one.
    pub(crate) fn log(
        &self,
        node: Node<'_>,
        key: MessageKey,
        subject: String,
        actual: usize,
        expected: Expected,
    ) {
        if !self.logged_lines.borrow_mut().insert(node.line()) {
            return;
        }
        let violation = Violation {
            line: node.line(),
            column: self.expanded_column(node),
            key,
            subject,
            actual,
            expected,
        };
        trace!(line = violation.line, key = %key, "{}", violation.message());
        self.violations.borrow_mut().push(violation);
    }

    /// Own-token violation: label plus optional subtype.
    pub(crate) fn log_error(
        &self,
        me: HandlerId,
        node: Node<'_>,
        subtype: &str,
        actual: usize,
        expected: &IndentLevel,
    ) {
        let label = self.kind(me).label();
        let subject = if subtype.is_empty() {
            label.to_string()
        } else {
            format!("{label} {subtype}")
        };
        let expected = Expected::from(expected);
        self.log(node, MessageKey::error_for(&expected), subject, actual, expected);
    }

    fn log_child_error(&self, me: HandlerId, node: Node<'_>, actual: usize, expected: &IndentLevel) {
        let expected = Expected::from(expected);
        self.log(
            node,
            MessageKey::child_error_for(&expected),
            self.kind(me).label().to_string(),
            actual,
            expected,
        );
    }

    // ------------------------------------------------------------------
    // Shared checks
    // ------------------------------------------------------------------

    pub(crate) fn is_handled(kind: TokenKind) -> bool {
        factory::is_handled_kind(kind)
    }

    /// Check the lines of `tree` that no nested construct owns.
    pub(crate) fn check_expression_subtree(
        &self,
        me: HandlerId,
        tree: Node<'_>,
        level: &IndentLevel,
        first_line_matches: bool,
        allow_nesting: bool,
    ) {
        let mut lines = LineSet::new();
        let first = first_node(tree);
        if first_line_matches && !allow_nesting {
            lines.add(first.line(), self.expanded_column(first), first.id());
        }
        self.find_subtree_lines(&mut lines, tree);
        self.check_lines_indent(me, &lines, level, first_line_matches, first.line(), allow_nesting);
    }

    /// Subtree check for every child of `parent` whose kind is listed.
    pub(crate) fn check_children(
        &self,
        me: HandlerId,
        parent: Node<'_>,
        kinds: &[TokenKind],
        level: &IndentLevel,
        first_line_matches: bool,
        allow_nesting: bool,
    ) {
        for child in parent.children().filter(|child| child.is_any_of(kinds)) {
            self.check_expression_subtree(me, child, level, first_line_matches, allow_nesting);
        }
    }

    pub(crate) fn find_subtree_lines(&self, lines: &mut LineSet, tree: Node<'_>) {
        let mut stack = vec![tree];
        while let Some(node) = stack.pop() {
            if Self::is_handled(node.kind()) {
                continue;
            }
            lines.add(node.line(), self.expanded_column(node), node.id());
            let children: Vec<_> = node.children().collect();
            stack.extend(children.into_iter().rev());
        }
    }

    fn check_lines_indent(
        &self,
        me: HandlerId,
        lines: &LineSet,
        level: &IndentLevel,
        first_line_matches: bool,
        first_line: usize,
        allow_nesting: bool,
    ) {
        let Some(start_line) = lines.first_line() else {
            return;
        };
        let real_start = self.line_start(start_line);
        let start_col = if first_line_matches && !allow_nesting {
            real_start
        } else {
            lines.min_column_of(start_line).unwrap_or(real_start)
        };
        if real_start == start_col {
            if let Some(node) = lines.node_at(start_line).and_then(|id| self.tree.get(id)) {
                self.check_line_indent(me, node, level, first_line_matches);
            }
        }

        let increases = self.entry(me).handler.should_increase_indent();
        let level = if first_line_matches || (first_line > self.ast(me).line() && increases) {
            level.shifted(self.config.basic_offset)
        } else {
            level.clone()
        };
        for line in lines.lines().skip(1) {
            if let Some(node) = lines.node_at(line).and_then(|id| self.tree.get(id)) {
                self.check_line_indent(me, node, &level, false);
            }
        }
    }

    fn check_line_indent(&self, me: HandlerId, node: Node<'_>, level: &IndentLevel, must_match: bool) {
        let start = self.line_start_of(node);
        let column = self.expanded_column(node);
        if (must_match && !level.is_acceptable(start))
            || (!must_match && column == start && level.is_greater_than(start))
        {
            self.log_child_error(me, node, start, level);
        }
    }

    /// Each modifier that starts a line must sit at the handler's indent.
    pub(crate) fn check_modifiers(&self, me: HandlerId) {
        let Some(modifiers) = self.ast(me).find_first_token(TokenKind::Modifiers) else {
            return;
        };
        let indent = self.indent(me);
        for modifier in modifiers.children() {
            let column = self.expanded_column(modifier);
            if self.is_on_start_of_line(modifier) && !indent.is_acceptable(column) {
                self.log_error(me, modifier, "modifier", column, &indent);
            }
        }
    }

    pub(crate) fn check_left_paren(&self, me: HandlerId, lparen: Option<Node<'_>>) {
        let Some(lparen) = lparen else {
            return;
        };
        let indent = self.indent(me);
        let column = self.expanded_column(lparen);
        if !indent.is_acceptable(column) && self.is_on_start_of_line(lparen) {
            self.log_error(me, lparen, "lparen", column, &indent);
        }
    }

    /// A closing paren may sit at the indent or one right of its opening paren.
    pub(crate) fn check_right_paren(
        &self,
        me: HandlerId,
        lparen: Option<Node<'_>>,
        rparen: Option<Node<'_>>,
    ) {
        let (Some(lparen), Some(rparen)) = (lparen, rparen) else {
            return;
        };
        let indent = self.indent(me);
        let rparen_level = self.expanded_column(rparen);
        let lparen_level = self.expanded_column(lparen);
        if rparen_level != lparen_level + 1
            && !indent.is_acceptable(rparen_level)
            && self.is_on_start_of_line(rparen)
        {
            self.log_error(me, rparen, "rparen", rparen_level, &indent);
        }
    }
}

/// Code nodes of a subtree in document order, the root included.
pub(crate) fn preorder(root: Node<'_>) -> impl Iterator<Item = Node<'_>> {
    let mut stack = vec![root];
    std::iter::from_fn(move || {
        let node = stack.pop()?;
        let children: Vec<_> = node.children().collect();
        stack.extend(children.into_iter().rev());
        Some(node)
    })
}

pub(crate) fn ancestors(node: Node<'_>) -> impl Iterator<Item = Node<'_>> {
    std::iter::successors(node.parent(), Node::parent)
}

/// Topmost-leftmost node of a subtree.
pub(crate) fn first_node(tree: Node<'_>) -> Node<'_> {
    preorder(tree).fold(tree, |best, node| {
        if (node.line(), node.column()) < (best.line(), best.column()) {
            node
        } else {
            best
        }
    })
}

/// Leftmost node of a subtree, ignoring lines.
pub(crate) fn leftmost_node(tree: Node<'_>) -> Node<'_> {
    preorder(tree).fold(tree, |best, node| {
        if node.column() < best.column() {
            node
        } else {
            best
        }
    })
}

pub(crate) fn same_line(a: Node<'_>, b: Node<'_>) -> bool {
    a.line() == b.line()
}
