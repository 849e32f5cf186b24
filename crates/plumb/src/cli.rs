//! CLI argument parsing and command definitions

use camino::Utf8PathBuf;
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "plumb", version, about = "Indentation checker for Java-style syntax trees")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Parser)]
pub enum Command {
    /// Check unit files/directories once and exit
    Lint(LintArgs),
    /// Show loaded decrees and the effective indentation settings
    Census(CensusArgs),
    /// Write a default .plumb.toml into a directory
    Occupy(OccupyArgs),
}

#[derive(Debug, Parser)]
pub struct LintArgs {
    /// `*.tree.json` unit files or directories holding them.
    #[arg(required = true)]
    pub paths: Vec<Utf8PathBuf>,

    /// Optional config file (TOML only). Default: .plumb.toml if present.
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Output JSON instead of human format
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct CensusArgs {
    /// Optional config file (TOML only). Default: .plumb.toml if present.
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Print every effective setting, not just the overrides
    #[arg(long)]
    pub details: bool,
}

#[derive(Debug, Parser)]
pub struct OccupyArgs {
    /// Directory to write .plumb.toml into
    #[arg(default_value = ".")]
    pub path: Utf8PathBuf,

    /// Overwrite an existing .plumb.toml
    #[arg(long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lint_with_json() {
        let args = Args::parse_from(["plumb", "lint", "units", "--json"]);
        let Command::Lint(lint) = args.command else {
            panic!("expected lint");
        };
        assert_eq!(lint.paths, vec![Utf8PathBuf::from("units")]);
        assert!(lint.json);
        assert!(lint.config.is_none());
    }

    #[test]
    fn lint_requires_a_path() {
        assert!(Args::try_parse_from(["plumb", "lint"]).is_err());
    }

    #[test]
    fn occupy_defaults_to_current_dir() {
        let args = Args::parse_from(["plumb", "occupy"]);
        let Command::Occupy(occupy) = args.command else {
            panic!("expected occupy");
        };
        assert_eq!(occupy.path, Utf8PathBuf::from("."));
        assert!(!occupy.force);
    }
}
