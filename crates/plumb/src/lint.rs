//! Lint command implementation

use anyhow::Result;
use camino::Utf8PathBuf;
use plumb_core::{Regime, Unit};
use plumb_decree_abi::Diagnostics;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::cli::{LintArgs, OutputFormat};
use crate::config::{load_config, load_decree_config};
use crate::files::{UnitFile, collect_unit_files};
use crate::output::{SerializableDiagnostic, print_diagnostic};
use crate::regime::init_regime;

/// Findings of one unit file.
#[derive(Debug)]
pub struct UnitReport {
    /// Path of the original source, as the unit file names it.
    pub path: Utf8PathBuf,
    pub diagnostics: Diagnostics,
}

/// Check every unit file in parallel, keeping input order.
///
/// Malformed unit files are logged and skipped; a decree refusing a
/// well-formed unit is an error.
///
/// # Errors
///
/// Returns the first decree failure.
pub fn lint_files(regime: &Regime, files: &[Utf8PathBuf]) -> Result<Vec<UnitReport>> {
    let reports: Vec<Option<UnitReport>> = files
        .par_iter()
        .map(|file| lint_file(regime, file))
        .collect::<Result<_>>()?;
    Ok(reports.into_iter().flatten().collect())
}

fn lint_file(regime: &Regime, file: &Utf8PathBuf) -> Result<Option<UnitReport>> {
    let unit = match UnitFile::load(file) {
        Ok(unit) => unit,
        Err(e) => {
            warn!(file = %file, "skipping unit: {e:#}");
            return Ok(None);
        }
    };
    let tree = match unit.tree() {
        Ok(tree) => tree,
        Err(e) => {
            warn!(file = %file, "skipping unit: {e:#}");
            return Ok(None);
        }
    };

    let diagnostics = regime.enforce(&[Unit {
        path: &unit.path,
        tree: &tree,
    }])?;
    debug!(file = %file, diagnostics = diagnostics.len(), "unit checked");
    Ok(Some(UnitReport {
        path: unit.path,
        diagnostics,
    }))
}

/// Run the lint command, returning the process exit code.
///
/// # Errors
///
/// Returns an error on unreadable paths, invalid configuration or a decree failure.
pub fn run_once(args: LintArgs) -> Result<i32> {
    let cfg = load_config(args.config.as_deref())?;
    let format = if args.json {
        OutputFormat::Json
    } else {
        cfg.format.unwrap_or(OutputFormat::Human)
    };

    let files = collect_unit_files(&args.paths)?;
    if files.is_empty() {
        eprintln!("No unit files found");
        return Ok(0);
    }

    let decree_config = load_decree_config(args.config.as_deref())?;
    let regime = init_regime(decree_config.as_ref())?;
    let reports = lint_files(&regime, &files)?;

    let mut exit_code = 0;
    let mut json_out: Vec<SerializableDiagnostic> = Vec::new();
    for report in &reports {
        for diag in &report.diagnostics {
            match format {
                OutputFormat::Human => print_diagnostic(report.path.as_str(), diag),
                OutputFormat::Json => {
                    json_out.push(SerializableDiagnostic::new(report.path.as_str(), diag));
                }
            }
            exit_code = 1;
        }
    }

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&json_out)?);
    }

    Ok(exit_code)
}
