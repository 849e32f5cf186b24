mod common;

use common::{Fixture, config_with_case_indent, imaginary, unit};
use plumb_decree_abi::{SyntaxTree, TokenKind};
use plumb_indentation::{
    CheckSession, Expected, HandlerFactory, IndentLevel, IndentationConfig, IndentationError,
    MessageKey, Violation, check,
};
use std::collections::BTreeSet;

fn nested_switch(case_column: usize) -> (Fixture, SyntaxTree) {
    let case_line = format!("{}case 1:", " ".repeat(case_column));
    let fx = Fixture::new(&[
        "{",
        "    {",
        "        switch (x) {",
        &case_line,
        "            break;",
        "        }",
        "    }",
        "}",
    ]);
    let root = unit([fx.nth(TokenKind::Slist, "{", 0).with([
        fx.nth(TokenKind::Slist, "{", 1).with([
            fx.tok(TokenKind::LiteralSwitch, "switch").with([
                fx.tok(TokenKind::Lparen, "("),
                imaginary(TokenKind::Expr).with([fx.tok(TokenKind::Ident, "x")]),
                fx.tok(TokenKind::Rparen, ")"),
                fx.nth(TokenKind::Lcurly, "{", 2),
                imaginary(TokenKind::CaseGroup).with([
                    fx.tok(TokenKind::LiteralCase, "case").with([
                        imaginary(TokenKind::Expr).with([fx.tok(TokenKind::NumInt, "1")]),
                        fx.tok(TokenKind::Colon, ":"),
                    ]),
                    imaginary(TokenKind::Slist).with([fx
                        .tok(TokenKind::LiteralBreak, "break")
                        .with([fx.tok(TokenKind::Semi, ";")])]),
                ]),
                fx.nth(TokenKind::Rcurly, "}", 0),
            ]),
            fx.nth(TokenKind::Rcurly, "}", 1),
        ]),
        fx.nth(TokenKind::Rcurly, "}", 2),
    ])]);
    let tree = fx.tree(root);
    (fx, tree)
}

#[test]
fn case_label_too_deep_is_a_child_error() {
    let (_, tree) = nested_switch(10);
    let violations = check(&tree, &config_with_case_indent(0, 4)).unwrap();

    assert_eq!(violations.len(), 1, "{violations:?}");
    let found = &violations[0];
    assert_eq!((found.line, found.column), (4, 10));
    assert_eq!(found.key, MessageKey::ChildError);
    assert!(found.is_child_error());
    assert_eq!(
        found.message(),
        "'case' child has incorrect indentation level 10, expected level should be 8."
    );
}

#[test]
fn aligned_case_label_passes() {
    let (_, tree) = nested_switch(8);
    let violations = check(&tree, &config_with_case_indent(0, 4)).unwrap();
    assert!(violations.is_empty(), "{violations:?}");
}

#[test]
fn default_case_indent_expects_one_level_in() {
    let (_, tree) = nested_switch(8);
    let violations = check(&tree, &IndentationConfig::default()).unwrap();
    let found: Vec<_> = violations
        .iter()
        .map(|v| (v.line, v.subject.as_str(), v.expected.clone()))
        .collect();
    assert_eq!(
        found,
        vec![
            (4, "case", Expected::Exact(12)),
            (5, "block", Expected::Exact(16)),
        ]
    );
}

#[test]
fn checks_are_deterministic() {
    let (_, tree) = nested_switch(10);
    let config = config_with_case_indent(0, 4);
    let first = check(&tree, &config).unwrap();
    let second = check(&tree, &config).unwrap();
    assert_eq!(first, second);
}

/// `int total = first` wrapped onto a `+ second;` line at `column`.
fn wrapped_assignment(column: usize) -> SyntaxTree {
    let wrapped = format!("{}+ second;", " ".repeat(column));
    let fx = Fixture::new(&["{", "    int total = first", &wrapped, "}"]);
    let root = unit([fx.tok(TokenKind::Slist, "{").with([
        imaginary(TokenKind::VariableDef).with([
            imaginary(TokenKind::Modifiers),
            imaginary(TokenKind::Type).with([fx.tok(TokenKind::LiteralInt, "int")]),
            fx.tok(TokenKind::Ident, "total"),
            fx.tok(TokenKind::Assign, "=").with([imaginary(TokenKind::Expr).with([fx
                .tok(TokenKind::Plus, "+")
                .with([
                    fx.tok(TokenKind::Ident, "first"),
                    fx.tok(TokenKind::Ident, "second"),
                ])])]),
        ]),
        fx.tok(TokenKind::Semi, ";"),
        fx.tok(TokenKind::Rcurly, "}"),
    ])]);
    fx.tree(root)
}

fn wrap_violations(column: usize, strict: bool) -> Vec<Violation> {
    let config = IndentationConfig {
        force_strict_condition: strict,
        ..IndentationConfig::default()
    };
    check(&wrapped_assignment(column), &config).unwrap()
}

#[test]
fn wrap_at_minimum_is_never_flagged() {
    assert!(wrap_violations(8, false).is_empty());
    assert!(wrap_violations(8, true).is_empty());
}

#[test]
fn wrap_short_of_minimum_is_flagged_in_both_modes() {
    let lenient = wrap_violations(7, false);
    assert_eq!(lenient.len(), 1);
    assert_eq!(lenient[0].expected, Expected::AtLeast(8));
    assert_eq!(lenient[0].subject, "+");

    let strict = wrap_violations(7, true);
    assert_eq!(strict.len(), 1);
    assert_eq!(strict[0].expected, Expected::Exact(8));
}

#[test]
fn deeper_wrap_is_flagged_only_when_strict() {
    assert!(wrap_violations(12, false).is_empty());
    let strict = wrap_violations(12, true);
    assert_eq!(strict.len(), 1);
    assert_eq!(
        strict[0].message(),
        "'+' has incorrect indentation level 12, expected level should be 8."
    );
}

#[test]
fn multi_levels_render_ascending() {
    let level = IndentLevel::with_offsets(&IndentLevel::new(16), &[8, 0, 4]);
    let violation = Violation {
        line: 3,
        column: 10,
        key: MessageKey::ErrorMulti,
        subject: "block lcurly".to_string(),
        actual: 10,
        expected: Expected::from(&level),
    };
    assert_eq!(
        violation.message(),
        "'block lcurly' has incorrect indentation level 10, expected level should be one of the following: 16, 20, 24."
    );
}

#[test]
fn handler_kinds_match_what_the_factory_builds() {
    let fx = Fixture::new(&["x"]);
    let declared: BTreeSet<TokenKind> = HandlerFactory::handled_kinds().into_iter().collect();

    let buildable: BTreeSet<TokenKind> = TokenKind::ALL
        .iter()
        .copied()
        .filter(|&kind| kind != TokenKind::CompilationUnit)
        .filter(|&kind| {
            let tree = fx.tree(unit([fx.tok(kind, "x")]));
            let config = IndentationConfig::default();
            let mut session = CheckSession::new(&tree, &config);
            let node = tree.root().and_then(|root| root.first_child_any()).unwrap();
            session.handler_for(node).is_ok()
        })
        .collect();

    assert_eq!(declared, buildable);
}

#[test]
fn unhandled_kind_is_an_invalid_argument() {
    let fx = Fixture::new(&["x"]);
    let tree = fx.tree(unit([fx.tok(TokenKind::Ident, "x")]));
    let config = IndentationConfig::default();
    let mut session = CheckSession::new(&tree, &config);
    let ident = tree.root().and_then(|root| root.first_child()).unwrap();

    let err = session.handler_for(ident).unwrap_err();
    let IndentationError::InvalidArgument(message) = err;
    assert!(message.contains("IDENT"), "{message}");
}
