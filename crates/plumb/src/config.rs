//! Configuration loading for the CLI

use anyhow::{Context, Result};
use camino::Utf8Path;
use plumb_core::PlumbConfig;
use plumb_core::config::CONFIG_FILE_NAME;
use serde::{Deserialize, Serialize};
use std::fs;

use crate::cli::OutputFormat;

/// CLI-level keys of .plumb.toml; `[decree.*]` tables are read by `plumb-core`.
#[derive(Debug, Deserialize, Serialize)]
pub struct ConfigFile {
    pub format: Option<OutputFormat>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            format: Some(OutputFormat::Human),
        }
    }
}

pub fn load_config(path: Option<&Utf8Path>) -> Result<ConfigFile> {
    let config_path = path.unwrap_or_else(|| Utf8Path::new(CONFIG_FILE_NAME));

    if config_path.exists() {
        let content =
            fs::read_to_string(config_path).with_context(|| format!("reading {config_path}"))?;
        Ok(toml::from_str(&content)?)
    } else {
        Ok(ConfigFile::default())
    }
}

/// Decree configuration: the given file (which must exist) or .plumb.toml if present.
pub fn load_decree_config(path: Option<&Utf8Path>) -> Result<Option<PlumbConfig>> {
    let config = match path {
        Some(p) => Some(PlumbConfig::from_file(p.as_std_path())?),
        None => PlumbConfig::load_default_strict()?,
    };
    Ok(config)
}
