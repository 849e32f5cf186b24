#![allow(dead_code)]

use plumb_decree_abi::{NodeSpec, SyntaxTree, TokenKind};
use plumb_indentation::IndentationConfig;

/// Source text plus helpers that place tokens by finding their text in it.
pub struct Fixture {
    source: String,
}

impl Fixture {
    pub fn new(lines: &[&str]) -> Self {
        let mut source = lines.join("\n");
        source.push('\n');
        Self { source }
    }

    /// 1-based line and 0-based column of the `nth` occurrence of `text`.
    pub fn find(&self, text: &str, nth: usize) -> (usize, usize) {
        self.source
            .lines()
            .enumerate()
            .flat_map(|(index, line)| {
                line.match_indices(text)
                    .map(move |(byte, _)| (index + 1, line[..byte].chars().count()))
            })
            .nth(nth)
            .unwrap_or_else(|| panic!("occurrence {nth} of {text:?} not in fixture"))
    }

    pub fn tok(&self, kind: TokenKind, text: &str) -> NodeSpec {
        self.nth(kind, text, 0)
    }

    pub fn nth(&self, kind: TokenKind, text: &str, nth: usize) -> NodeSpec {
        let (line, column) = self.find(text, nth);
        NodeSpec::at(kind, line, column, text)
    }

    pub fn tree(&self, root: NodeSpec) -> SyntaxTree {
        SyntaxTree::from_spec(&self.source, &root).expect("fixture tree")
    }
}

pub fn imaginary(kind: TokenKind) -> NodeSpec {
    NodeSpec::new(kind)
}

pub fn unit(children: impl IntoIterator<Item = NodeSpec>) -> NodeSpec {
    NodeSpec::new(TokenKind::CompilationUnit).with(children)
}

pub fn config_with_case_indent(case_indent: usize, tab_width: usize) -> IndentationConfig {
    IndentationConfig {
        case_indent,
        tab_width,
        ..IndentationConfig::default()
    }
}

/// `name()` as an expression statement body, where `(` is occurrence `nth` of the fixture.
pub fn call_expr(fx: &Fixture, name: &str, nth: usize) -> NodeSpec {
    let (line, paren) = fx.find("(", nth);
    imaginary(TokenKind::Expr).with([fx.nth(TokenKind::MethodCall, "(", nth).with([
        NodeSpec::at(TokenKind::Ident, line, paren - name.chars().count(), name),
        imaginary(TokenKind::Elist),
        fx.nth(TokenKind::Rparen, ")", nth),
    ])])
}

/// A condition that is a single identifier.
pub fn ident_expr(fx: &Fixture, name: &str) -> NodeSpec {
    imaginary(TokenKind::Expr).with([fx.tok(TokenKind::Ident, name)])
}
