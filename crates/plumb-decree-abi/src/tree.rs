//! Syntax tree handed to decrees by a front-end parser.
//!
//! The tree is an arena of nodes in document (preorder) order. Each node has a
//! kind, its first token's 1-based line and 0-based code-point column, and its
//! text. Comments are ordinary nodes placed as siblings where they occur; the
//! default navigation skips them and the `*_any` variants include them.

use memchr::memchr_iter;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! token_kinds {
    ($($variant:ident => $name:literal,)*) => {
        /// Token and node kinds of the Java-family grammar.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum TokenKind {
            $(#[serde(rename = $name)] $variant,)*
            /// Any kind this table does not name; checked as a plain expression token.
            #[serde(rename = "OTHER", other)]
            Other,
        }

        impl TokenKind {
            /// Every kind, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)* Self::Other];

            /// Textual kind name as front-ends spell it, e.g. `LITERAL_IF`.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                    Self::Other => "OTHER",
                }
            }

            /// Look up a kind by its textual name.
            #[must_use]
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(Self::$variant),)*
                    "OTHER" => Some(Self::Other),
                    _ => None,
                }
            }
        }
    };
}

token_kinds! {
    CompilationUnit => "COMPILATION_UNIT",
    PackageDef => "PACKAGE_DEF",
    Import => "IMPORT",
    StaticImport => "STATIC_IMPORT",
    Annotations => "ANNOTATIONS",
    Annotation => "ANNOTATION",
    AnnotationMemberValuePair => "ANNOTATION_MEMBER_VALUE_PAIR",
    AnnotationArrayInit => "ANNOTATION_ARRAY_INIT",
    AnnotationDef => "ANNOTATION_DEF",
    AnnotationFieldDef => "ANNOTATION_FIELD_DEF",
    ClassDef => "CLASS_DEF",
    InterfaceDef => "INTERFACE_DEF",
    EnumDef => "ENUM_DEF",
    RecordDef => "RECORD_DEF",
    EnumConstantDef => "ENUM_CONSTANT_DEF",
    RecordComponents => "RECORD_COMPONENTS",
    RecordComponentDef => "RECORD_COMPONENT_DEF",
    Objblock => "OBJBLOCK",
    Modifiers => "MODIFIERS",
    LiteralPublic => "LITERAL_PUBLIC",
    LiteralProtected => "LITERAL_PROTECTED",
    LiteralPrivate => "LITERAL_PRIVATE",
    LiteralStatic => "LITERAL_STATIC",
    Final => "FINAL",
    Abstract => "ABSTRACT",
    LiteralClass => "LITERAL_CLASS",
    LiteralInterface => "LITERAL_INTERFACE",
    Enum => "ENUM",
    LiteralRecord => "LITERAL_RECORD",
    ExtendsClause => "EXTENDS_CLAUSE",
    ImplementsClause => "IMPLEMENTS_CLAUSE",
    Type => "TYPE",
    TypeParameters => "TYPE_PARAMETERS",
    TypeArguments => "TYPE_ARGUMENTS",
    ArrayDeclarator => "ARRAY_DECLARATOR",
    ArrayInit => "ARRAY_INIT",
    Rbrack => "RBRACK",
    Ident => "IDENT",
    MethodDef => "METHOD_DEF",
    CtorDef => "CTOR_DEF",
    CompactCtorDef => "COMPACT_CTOR_DEF",
    Parameters => "PARAMETERS",
    ParameterDef => "PARAMETER_DEF",
    LiteralThrows => "LITERAL_THROWS",
    LiteralVoid => "LITERAL_VOID",
    LiteralInt => "LITERAL_INT",
    LiteralLong => "LITERAL_LONG",
    LiteralBoolean => "LITERAL_BOOLEAN",
    LiteralChar => "LITERAL_CHAR",
    LiteralDouble => "LITERAL_DOUBLE",
    LiteralByte => "LITERAL_BYTE",
    LiteralShort => "LITERAL_SHORT",
    LiteralFloat => "LITERAL_FLOAT",
    Strictfp => "STRICTFP",
    LiteralTransient => "LITERAL_TRANSIENT",
    LiteralNative => "LITERAL_NATIVE",
    LiteralVolatile => "LITERAL_VOLATILE",
    LiteralSealed => "LITERAL_SEALED",
    LiteralNonSealed => "LITERAL_NON_SEALED",
    LiteralDefaultModifier => "LITERAL_DEFAULT_MODIFIER",
    PermitsClause => "PERMITS_CLAUSE",
    LiteralPermits => "LITERAL_PERMITS",
    TypeParameter => "TYPE_PARAMETER",
    TypeArgument => "TYPE_ARGUMENT",
    WildcardType => "WILDCARD_TYPE",
    TypeUpperBounds => "TYPE_UPPER_BOUNDS",
    TypeLowerBounds => "TYPE_LOWER_BOUNDS",
    TypeExtensionAnd => "TYPE_EXTENSION_AND",
    GenericStart => "GENERIC_START",
    GenericEnd => "GENERIC_END",
    Ellipsis => "ELLIPSIS",
    Lbrack => "LBRACK",
    Slist => "SLIST",
    Lcurly => "LCURLY",
    Rcurly => "RCURLY",
    Lparen => "LPAREN",
    Rparen => "RPAREN",
    Semi => "SEMI",
    Comma => "COMMA",
    Dot => "DOT",
    Colon => "COLON",
    At => "AT",
    VariableDef => "VARIABLE_DEF",
    Assign => "ASSIGN",
    Expr => "EXPR",
    Elist => "ELIST",
    MethodCall => "METHOD_CALL",
    CtorCall => "CTOR_CALL",
    SuperCtorCall => "SUPER_CTOR_CALL",
    LiteralNew => "LITERAL_NEW",
    LiteralThis => "LITERAL_THIS",
    LiteralSuper => "LITERAL_SUPER",
    LiteralNull => "LITERAL_NULL",
    LiteralTrue => "LITERAL_TRUE",
    LiteralFalse => "LITERAL_FALSE",
    NumInt => "NUM_INT",
    NumLong => "NUM_LONG",
    NumFloat => "NUM_FLOAT",
    NumDouble => "NUM_DOUBLE",
    StringLiteral => "STRING_LITERAL",
    CharLiteral => "CHAR_LITERAL",
    TextBlockLiteralBegin => "TEXT_BLOCK_LITERAL_BEGIN",
    TextBlockContent => "TEXT_BLOCK_CONTENT",
    TextBlockLiteralEnd => "TEXT_BLOCK_LITERAL_END",
    Plus => "PLUS",
    Minus => "MINUS",
    Star => "STAR",
    Div => "DIV",
    Lt => "LT",
    Gt => "GT",
    Le => "LE",
    Ge => "GE",
    Equal => "EQUAL",
    NotEqual => "NOT_EQUAL",
    Land => "LAND",
    Lor => "LOR",
    Lnot => "LNOT",
    Question => "QUESTION",
    PostInc => "POST_INC",
    Inc => "INC",
    PostDec => "POST_DEC",
    Dec => "DEC",
    UnaryMinus => "UNARY_MINUS",
    UnaryPlus => "UNARY_PLUS",
    Bnot => "BNOT",
    Mod => "MOD",
    Band => "BAND",
    Bor => "BOR",
    Bxor => "BXOR",
    Sl => "SL",
    Sr => "SR",
    Bsr => "BSR",
    PlusAssign => "PLUS_ASSIGN",
    MinusAssign => "MINUS_ASSIGN",
    StarAssign => "STAR_ASSIGN",
    DivAssign => "DIV_ASSIGN",
    ModAssign => "MOD_ASSIGN",
    SrAssign => "SR_ASSIGN",
    BsrAssign => "BSR_ASSIGN",
    SlAssign => "SL_ASSIGN",
    BandAssign => "BAND_ASSIGN",
    BxorAssign => "BXOR_ASSIGN",
    BorAssign => "BOR_ASSIGN",
    Typecast => "TYPECAST",
    LiteralInstanceof => "LITERAL_INSTANCEOF",
    PatternVariableDef => "PATTERN_VARIABLE_DEF",
    RecordPatternDef => "RECORD_PATTERN_DEF",
    RecordPatternComponents => "RECORD_PATTERN_COMPONENTS",
    PatternDef => "PATTERN_DEF",
    UnnamedPatternDef => "UNNAMED_PATTERN_DEF",
    LiteralWhen => "LITERAL_WHEN",
    DoubleColon => "DOUBLE_COLON",
    IndexOp => "INDEX_OP",
    MethodRef => "METHOD_REF",
    LiteralIf => "LITERAL_IF",
    LiteralElse => "LITERAL_ELSE",
    LiteralWhile => "LITERAL_WHILE",
    DoWhile => "DO_WHILE",
    LiteralDo => "LITERAL_DO",
    LiteralFor => "LITERAL_FOR",
    ForInit => "FOR_INIT",
    ForCondition => "FOR_CONDITION",
    ForIterator => "FOR_ITERATOR",
    ForEachClause => "FOR_EACH_CLAUSE",
    LiteralSwitch => "LITERAL_SWITCH",
    CaseGroup => "CASE_GROUP",
    LiteralCase => "LITERAL_CASE",
    LiteralDefault => "LITERAL_DEFAULT",
    SwitchRule => "SWITCH_RULE",
    LiteralYield => "LITERAL_YIELD",
    LiteralBreak => "LITERAL_BREAK",
    LiteralContinue => "LITERAL_CONTINUE",
    LiteralReturn => "LITERAL_RETURN",
    LiteralThrow => "LITERAL_THROW",
    LiteralAssert => "LITERAL_ASSERT",
    LiteralTry => "LITERAL_TRY",
    ResourceSpecification => "RESOURCE_SPECIFICATION",
    Resources => "RESOURCES",
    Resource => "RESOURCE",
    LiteralCatch => "LITERAL_CATCH",
    LiteralFinally => "LITERAL_FINALLY",
    LiteralSynchronized => "LITERAL_SYNCHRONIZED",
    LabeledStat => "LABELED_STAT",
    StaticInit => "STATIC_INIT",
    InstanceInit => "INSTANCE_INIT",
    Lambda => "LAMBDA",
    EmptyStat => "EMPTY_STAT",
    SingleLineComment => "SINGLE_LINE_COMMENT",
    BlockCommentBegin => "BLOCK_COMMENT_BEGIN",
    CommentContent => "COMMENT_CONTENT",
    BlockCommentEnd => "BLOCK_COMMENT_END",
}

impl TokenKind {
    #[must_use]
    pub const fn is_comment(self) -> bool {
        matches!(
            self,
            Self::SingleLineComment
                | Self::BlockCommentBegin
                | Self::CommentContent
                | Self::BlockCommentEnd
        )
    }

    /// Class-like declarations.
    #[must_use]
    pub const fn is_type_declaration(self) -> bool {
        matches!(
            self,
            Self::ClassDef
                | Self::InterfaceDef
                | Self::EnumDef
                | Self::AnnotationDef
                | Self::RecordDef
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while building a tree from a front-end description.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("{kind} at line {line}: source has {available} lines")]
    LineOutOfRange {
        kind: TokenKind,
        line: usize,
        available: usize,
    },
    #[error("{kind} at {line}:{column}: line is {width} characters wide")]
    ColumnOutOfRange {
        kind: TokenKind,
        line: usize,
        column: usize,
        width: usize,
    },
}

/// Interchange form of a node, as produced by front-ends (usually JSON).
///
/// `line`/`column` may be omitted for imaginary nodes such as `EXPR`,
/// `MODIFIERS` or `SLIST` of a case group: such nodes take the position of
/// their first code child, or of the next code node when they have none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub kind: TokenKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Self>,
}

impl NodeSpec {
    /// Imaginary node without a position of its own.
    #[must_use]
    pub const fn new(kind: TokenKind) -> Self {
        Self {
            kind,
            line: None,
            column: None,
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Token at a known position.
    #[must_use]
    pub fn at(kind: TokenKind, line: usize, column: usize, text: impl Into<String>) -> Self {
        Self {
            kind,
            line: Some(line),
            column: Some(column),
            text: text.into(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }
}

/// Index of a node inside its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: TokenKind,
    text: String,
    line: usize,
    column: usize,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    next_sibling: Option<NodeId>,
    prev_sibling: Option<NodeId>,
}

/// Parsed unit: node arena plus the raw source lines.
#[derive(Debug, Clone, Default)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
    lines: Vec<String>,
}

impl SyntaxTree {
    /// Build the arena from a front-end description of `source`.
    ///
    /// # Errors
    ///
    /// Returns `TreeError` when a node points outside the source text.
    pub fn from_spec(source: &str, root: &NodeSpec) -> Result<Self, TreeError> {
        let mut tree = Self {
            nodes: Vec::new(),
            lines: split_lines(source),
        };
        let mut positions = Vec::new();
        let mut stack: Vec<(&NodeSpec, Option<NodeId>)> = vec![(root, None)];

        while let Some((spec, parent)) = stack.pop() {
            let id = NodeId(tree.nodes.len());
            let text = if spec.text.is_empty() {
                spec.kind.as_str().to_string()
            } else {
                spec.text.clone()
            };
            positions.push(tree.explicit_position(spec)?);
            tree.nodes.push(NodeData {
                kind: spec.kind,
                text,
                line: 1,
                column: 0,
                parent,
                first_child: None,
                last_child: None,
                next_sibling: None,
                prev_sibling: None,
            });
            if let Some(parent) = parent {
                tree.append_child(parent, id);
            }
            for child in spec.children.iter().rev() {
                stack.push((child, Some(id)));
            }
        }

        tree.resolve_positions(positions);
        Ok(tree)
    }

    fn explicit_position(&self, spec: &NodeSpec) -> Result<Option<(usize, usize)>, TreeError> {
        let Some(line) = spec.line else {
            return Ok(None);
        };
        let column = spec.column.unwrap_or(0);
        if line == 0 || line > self.lines.len() {
            return Err(TreeError::LineOutOfRange {
                kind: spec.kind,
                line,
                available: self.lines.len(),
            });
        }
        let width = self.lines[line - 1].chars().count();
        if column > width {
            return Err(TreeError::ColumnOutOfRange {
                kind: spec.kind,
                line,
                column,
                width,
            });
        }
        Ok(Some((line, column)))
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let previous = self.nodes[parent.0].last_child;
        if let Some(previous) = previous {
            self.nodes[previous.0].next_sibling = Some(child);
        } else {
            self.nodes[parent.0].first_child = Some(child);
        }
        self.nodes[child.0].prev_sibling = previous;
        self.nodes[parent.0].last_child = Some(child);
    }

    fn resolve_positions(&mut self, mut positions: Vec<Option<(usize, usize)>>) {
        let count = self.nodes.len();
        // Children and successors have larger indices, so walk backwards.
        for index in (0..count).rev() {
            if positions[index].is_some() {
                continue;
            }
            let from_child = self
                .get(NodeId(index))
                .and_then(|node| node.first_child())
                .and_then(|child| positions[child.id.0]);
            let resolved = from_child.or_else(|| {
                ((index + 1)..count)
                    .find(|&next| !self.nodes[next].kind.is_comment())
                    .and_then(|next| positions[next])
            });
            positions[index] = resolved;
        }
        for index in 0..count {
            if positions[index].is_none() {
                let inherited = self.nodes[index]
                    .parent
                    .and_then(|parent| positions[parent.0]);
                positions[index] = inherited;
            }
            let (line, column) = positions[index].unwrap_or((1, 0));
            self.nodes[index].line = line;
            self.nodes[index].column = column;
        }
    }

    #[must_use]
    pub fn root(&self) -> Option<Node<'_>> {
        self.get(NodeId(0))
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<Node<'_>> {
        (id.0 < self.nodes.len()).then_some(Node { tree: self, id })
    }

    /// All nodes, comments included, in document order.
    pub fn nodes(&self) -> impl Iterator<Item = Node<'_>> {
        (0..self.nodes.len()).map(move |index| Node {
            tree: self,
            id: NodeId(index),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Text of a 1-based line; empty when out of range.
    #[must_use]
    pub fn line(&self, line_no: usize) -> &str {
        line_no
            .checked_sub(1)
            .and_then(|index| self.lines.get(index))
            .map_or("", String::as_str)
    }
}

fn split_lines(source: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut start = 0;
    for nl in memchr_iter(b'\n', source.as_bytes()) {
        lines.push(source[start..nl].trim_end_matches('\r').to_string());
        start = nl + 1;
    }
    if start < source.len() {
        lines.push(source[start..].trim_end_matches('\r').to_string());
    }
    lines
}

/// Borrowed handle to one node of a `SyntaxTree`.
#[derive(Clone, Copy)]
pub struct Node<'a> {
    tree: &'a SyntaxTree,
    id: NodeId,
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}:{}] {:?}",
            self.kind(),
            self.line(),
            self.column(),
            self.text()
        )
    }
}

impl<'a> Node<'a> {
    fn data(&self) -> &'a NodeData {
        &self.tree.nodes[self.id.0]
    }

    const fn wrap(&self, id: Option<NodeId>) -> Option<Self> {
        match id {
            Some(id) => Some(Self {
                tree: self.tree,
                id,
            }),
            None => None,
        }
    }

    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub const fn tree(&self) -> &'a SyntaxTree {
        self.tree
    }

    #[must_use]
    pub fn kind(&self) -> TokenKind {
        self.data().kind
    }

    #[must_use]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    #[must_use]
    pub fn is_any_of(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.kind())
    }

    #[must_use]
    pub fn is_comment(&self) -> bool {
        self.kind().is_comment()
    }

    #[must_use]
    pub fn text(&self) -> &'a str {
        &self.data().text
    }

    /// 1-based line of the node's first token.
    #[must_use]
    pub fn line(&self) -> usize {
        self.data().line
    }

    /// 0-based code-point column of the node's first token.
    #[must_use]
    pub fn column(&self) -> usize {
        self.data().column
    }

    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.wrap(self.data().parent)
    }

    #[must_use]
    pub fn first_child_any(&self) -> Option<Self> {
        self.wrap(self.data().first_child)
    }

    #[must_use]
    pub fn last_child_any(&self) -> Option<Self> {
        self.wrap(self.data().last_child)
    }

    #[must_use]
    pub fn next_sibling_any(&self) -> Option<Self> {
        self.wrap(self.data().next_sibling)
    }

    #[must_use]
    pub fn prev_sibling_any(&self) -> Option<Self> {
        self.wrap(self.data().prev_sibling)
    }

    #[must_use]
    pub fn first_child(&self) -> Option<Self> {
        let mut cursor = self.first_child_any();
        while let Some(node) = cursor {
            if !node.is_comment() {
                return Some(node);
            }
            cursor = node.next_sibling_any();
        }
        None
    }

    #[must_use]
    pub fn last_child(&self) -> Option<Self> {
        let mut cursor = self.last_child_any();
        while let Some(node) = cursor {
            if !node.is_comment() {
                return Some(node);
            }
            cursor = node.prev_sibling_any();
        }
        None
    }

    #[must_use]
    pub fn next_sibling(&self) -> Option<Self> {
        let mut cursor = self.next_sibling_any();
        while let Some(node) = cursor {
            if !node.is_comment() {
                return Some(node);
            }
            cursor = node.next_sibling_any();
        }
        None
    }

    #[must_use]
    pub fn prev_sibling(&self) -> Option<Self> {
        let mut cursor = self.prev_sibling_any();
        while let Some(node) = cursor {
            if !node.is_comment() {
                return Some(node);
            }
            cursor = node.prev_sibling_any();
        }
        None
    }

    /// Code children (comments skipped).
    #[must_use]
    pub fn children(&self) -> Children<'a> {
        Children {
            next: self.first_child(),
            with_comments: false,
        }
    }

    /// All children, comments included.
    #[must_use]
    pub fn children_any(&self) -> Children<'a> {
        Children {
            next: self.first_child_any(),
            with_comments: true,
        }
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children().count()
    }

    /// First direct code child of the given kind.
    #[must_use]
    pub fn find_first_token(&self, kind: TokenKind) -> Option<Self> {
        self.children().find(|child| child.is(kind))
    }

    /// Whether `self` lies inside the subtree rooted at `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, ancestor: Self) -> bool {
        let mut cursor = self.parent();
        while let Some(node) = cursor {
            if node == ancestor {
                return true;
            }
            cursor = node.parent();
        }
        false
    }

    /// Text of the line this node starts on.
    #[must_use]
    pub fn line_text(&self) -> &'a str {
        self.tree.line(self.line())
    }
}

/// Iterator over the children of a node.
pub struct Children<'a> {
    next: Option<Node<'a>>,
    with_comments: bool,
}

impl<'a> Iterator for Children<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = if self.with_comments {
            current.next_sibling_any()
        } else {
            current.next_sibling()
        };
        Some(current)
    }
}
