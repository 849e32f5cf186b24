//! Integration tests for the lint command over unit files on disk

use anyhow::Result;
use camino::Utf8PathBuf;
use plumb::files::{UnitFile, collect_unit_files};
use plumb::lint::lint_files;
use plumb::output::format_diagnostic;
use plumb::regime::init_regime;
use plumb_core::PlumbConfig;
use plumb_decree_abi::{NodeSpec, TokenKind};
use std::fs;
use tempfile::TempDir;

/// `switch` with its `case` label at `case_column`.
fn switch_unit(case_column: usize) -> UnitFile {
    let case_line = format!("{}case 1:", " ".repeat(case_column));
    let source = format!("{{\n    switch (x) {{\n{case_line}\n        break;\n    }}\n}}\n");
    let root = NodeSpec::new(TokenKind::CompilationUnit).with([NodeSpec::at(
        TokenKind::Slist,
        1,
        0,
        "{",
    )
    .with([
        NodeSpec::at(TokenKind::LiteralSwitch, 2, 4, "switch").with([
            NodeSpec::at(TokenKind::Lparen, 2, 11, "("),
            NodeSpec::new(TokenKind::Expr).with([NodeSpec::at(TokenKind::Ident, 2, 12, "x")]),
            NodeSpec::at(TokenKind::Rparen, 2, 13, ")"),
            NodeSpec::at(TokenKind::Lcurly, 2, 15, "{"),
            NodeSpec::new(TokenKind::CaseGroup).with([
                NodeSpec::at(TokenKind::LiteralCase, 3, case_column, "case").with([
                    NodeSpec::new(TokenKind::Expr)
                        .with([NodeSpec::at(TokenKind::NumInt, 3, case_column + 5, "1")]),
                    NodeSpec::at(TokenKind::Colon, 3, case_column + 6, ":"),
                ]),
                NodeSpec::new(TokenKind::Slist).with([NodeSpec::at(
                    TokenKind::LiteralBreak,
                    4,
                    8,
                    "break",
                )
                .with([NodeSpec::at(TokenKind::Semi, 4, 13, ";")])]),
            ]),
            NodeSpec::at(TokenKind::Rcurly, 5, 4, "}"),
        ]),
        NodeSpec::at(TokenKind::Rcurly, 6, 0, "}"),
    ])]);
    UnitFile {
        path: Utf8PathBuf::from("src/Switch.java"),
        source,
        root,
    }
}

fn write_unit(dir: &Utf8PathBuf, name: &str, unit: &UnitFile) -> Result<()> {
    fs::write(dir.join(name), serde_json::to_string(unit)?)?;
    Ok(())
}

fn temp_root() -> Result<(TempDir, Utf8PathBuf)> {
    let temp_dir = TempDir::new()?;
    let temp_path = Utf8PathBuf::from_path_buf(temp_dir.path().to_path_buf())
        .map_err(|_| anyhow::anyhow!("non-utf8 path"))?;
    Ok((temp_dir, temp_path))
}

#[test]
fn misplaced_case_is_reported_with_one_based_column() -> Result<()> {
    let (_guard, root) = temp_root()?;
    write_unit(&root, "Switch.java.tree.json", &switch_unit(6))?;
    let config = PlumbConfig::from_toml("[decree.indentation]\ncase_indent = 0\n")?;
    let regime = init_regime(Some(&config))?;

    let files = collect_unit_files(std::slice::from_ref(&root))?;
    let reports = lint_files(&regime, &files)?;

    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.path, Utf8PathBuf::from("src/Switch.java"));
    let lines: Vec<String> = report
        .diagnostics
        .iter()
        .map(|diag| format_diagnostic(report.path.as_str(), diag))
        .collect();
    assert_eq!(
        lines,
        vec![
            "src/Switch.java:3:7: indentation/indentation: 'case' child has incorrect indentation level 6, expected level should be 4."
                .to_string()
        ]
    );
    Ok(())
}

#[test]
fn aligned_unit_is_clean() -> Result<()> {
    let (_guard, root) = temp_root()?;
    write_unit(&root, "Switch.java.tree.json", &switch_unit(4))?;
    let config = PlumbConfig::from_toml("[decree.indentation]\ncase_indent = 0\n")?;
    let regime = init_regime(Some(&config))?;

    let files = collect_unit_files(std::slice::from_ref(&root))?;
    let reports = lint_files(&regime, &files)?;
    assert!(reports.iter().all(|report| report.diagnostics.is_empty()));
    Ok(())
}

#[test]
fn malformed_units_are_skipped() -> Result<()> {
    let (_guard, root) = temp_root()?;
    fs::write(root.join("Broken.java.tree.json"), "{ not json")?;
    write_unit(&root, "Switch.java.tree.json", &switch_unit(4))?;
    let regime = init_regime(None)?;

    let files = collect_unit_files(std::slice::from_ref(&root))?;
    assert_eq!(files.len(), 2);
    let reports = lint_files(&regime, &files)?;
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].path, Utf8PathBuf::from("src/Switch.java"));
    Ok(())
}

/// Compound assignments plus a kind no table entry names, as a front-end writes them.
const COMPOUND_UNIT: &str = r#"{
  "path": "src/Compound.java",
  "source": "{\n    total += 1;\n      count -= 2;\n}\n",
  "root": {"kind": "COMPILATION_UNIT", "children": [
    {"kind": "SLIST", "line": 1, "column": 0, "text": "{", "children": [
      {"kind": "EXPR", "children": [
        {"kind": "PLUS_ASSIGN", "line": 2, "column": 10, "text": "+=", "children": [
          {"kind": "IDENT", "line": 2, "column": 4, "text": "total"},
          {"kind": "NUM_INT", "line": 2, "column": 13, "text": "1"}
        ]}
      ]},
      {"kind": "SEMI", "line": 2, "column": 14, "text": ";"},
      {"kind": "EXPR", "children": [
        {"kind": "MINUS_ASSIGN", "line": 3, "column": 12, "text": "-=", "children": [
          {"kind": "IDENT", "line": 3, "column": 6, "text": "count"},
          {"kind": "STRING_TEMPLATE_BEGIN", "line": 3, "column": 15, "text": "2"}
        ]}
      ]},
      {"kind": "SEMI", "line": 3, "column": 16, "text": ";"},
      {"kind": "RCURLY", "line": 4, "column": 0, "text": "}"}
    ]}
  ]}
}"#;

#[test]
fn units_with_expression_and_unknown_kinds_are_checked() -> Result<()> {
    let (_guard, root) = temp_root()?;
    fs::write(root.join("Compound.java.tree.json"), COMPOUND_UNIT)?;
    let regime = init_regime(None)?;

    let files = collect_unit_files(std::slice::from_ref(&root))?;
    let reports = lint_files(&regime, &files)?;

    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    let lines: Vec<String> = report
        .diagnostics
        .iter()
        .map(|diag| format_diagnostic(report.path.as_str(), diag))
        .collect();
    assert_eq!(
        lines,
        vec![
            "src/Compound.java:3:7: indentation/indentation: 'block' child has incorrect indentation level 6, expected level should be 4."
                .to_string()
        ]
    );
    Ok(())
}
