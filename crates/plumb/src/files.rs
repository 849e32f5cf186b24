//! Unit file collection and loading

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use plumb_decree_abi::{NodeSpec, SyntaxTree};
use serde::{Deserialize, Serialize};
use std::fs;
use walkdir::WalkDir;

/// Suffix of the files a front-end writes, one per source file.
pub const UNIT_SUFFIX: &str = ".tree.json";

/// One source file as described by a front-end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitFile {
    /// Path of the original source file, e.g. `src/Foo.java`.
    pub path: Utf8PathBuf,
    pub source: String,
    pub root: NodeSpec,
}

impl UnitFile {
    /// Read and parse a unit file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a unit description.
    pub fn load(file: &Utf8Path) -> Result<Self> {
        let content = fs::read_to_string(file).with_context(|| format!("reading {file}"))?;
        serde_json::from_str(&content).with_context(|| format!("parsing {file}"))
    }

    /// Build the syntax tree of this unit.
    ///
    /// # Errors
    ///
    /// Returns an error if a node lies outside the source text.
    pub fn tree(&self) -> Result<SyntaxTree> {
        SyntaxTree::from_spec(&self.source, &self.root)
            .with_context(|| format!("building tree for {}", self.path))
    }
}

pub fn is_unit_file(path: &Utf8Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.ends_with(UNIT_SUFFIX) && name.len() > UNIT_SUFFIX.len())
}

/// Unit files under `paths`, sorted. Explicit file paths are always included.
pub fn collect_unit_files(paths: &[Utf8PathBuf]) -> Result<Vec<Utf8PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        let metadata = fs::metadata(path).with_context(|| format!("reading {path}"))?;
        if metadata.is_file() {
            files.push(path.clone());
            continue;
        }

        for entry in WalkDir::new(path).follow_links(false) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let p = Utf8PathBuf::from_path_buf(entry.path().to_owned())
                .map_err(|_| anyhow::anyhow!("non-utf8 path: {}", entry.path().display()))?;
            if is_unit_file(&p) {
                files.push(p);
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_unit_suffix() {
        assert!(is_unit_file(Utf8Path::new("out/Foo.java.tree.json")));
        assert!(!is_unit_file(Utf8Path::new("out/Foo.java")));
        assert!(!is_unit_file(Utf8Path::new("out/.tree.json")));
        assert!(!is_unit_file(Utf8Path::new("out/tree.json")));
    }

    #[test]
    fn walks_directories_for_units_only() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        fs::create_dir_all(root.join("nested")).unwrap();
        fs::write(root.join("B.java.tree.json"), "{}").unwrap();
        fs::write(root.join("nested/A.java.tree.json"), "{}").unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();

        let files = collect_unit_files(std::slice::from_ref(&root)).unwrap();
        assert_eq!(
            files,
            vec![root.join("B.java.tree.json"), root.join("nested/A.java.tree.json")]
        );
    }

    #[test]
    fn parses_unit_with_imaginary_nodes() {
        let json = r#"{
            "path": "A.java",
            "source": "class A {\n}\n",
            "root": {"kind": "COMPILATION_UNIT", "children": [
                {"kind": "CLASS_DEF", "children": [
                    {"kind": "MODIFIERS"},
                    {"kind": "LITERAL_CLASS", "line": 1, "column": 0, "text": "class"},
                    {"kind": "IDENT", "line": 1, "column": 6, "text": "A"},
                    {"kind": "OBJBLOCK", "children": [
                        {"kind": "LCURLY", "line": 1, "column": 8, "text": "{"},
                        {"kind": "RCURLY", "line": 2, "column": 0, "text": "}"}
                    ]}
                ]}
            ]}
        }"#;
        let unit: UnitFile = serde_json::from_str(json).unwrap();
        assert_eq!(unit.path, Utf8PathBuf::from("A.java"));
        let tree = unit.tree().unwrap();
        assert_eq!(tree.len(), 7);
    }
}
