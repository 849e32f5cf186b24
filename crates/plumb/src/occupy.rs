//! Occupy command - initialize .plumb.toml with defaults

use anyhow::Result;
use camino::Utf8PathBuf;
use plumb_core::config::CONFIG_FILE_NAME;
use std::fs;
use tracing::info;

use crate::cli::OccupyArgs;

/// Default .plumb.toml template, mirroring the built-in defaults.
pub const DEFAULT_CONFIG: &str = include_str!("../templates/default.plumb.toml");

/// Run the occupy command to initialize a .plumb.toml file.
///
/// # Errors
///
/// Returns an error if:
/// - The target path is not a valid UTF-8 path
/// - The target directory does not exist
/// - The target path is not a directory
/// - The config file already exists and `--force` is not set
/// - Writing the config file fails
pub fn run_occupy(args: OccupyArgs) -> Result<()> {
    let target_dir = if args.path.is_absolute() {
        args.path
    } else {
        let cwd = std::env::current_dir()?;
        Utf8PathBuf::from_path_buf(cwd)
            .map_err(|_| anyhow::anyhow!("non-utf8 path"))?
            .join(&args.path)
    };

    if !target_dir.exists() {
        return Err(anyhow::anyhow!(
            "Target directory does not exist: {target_dir}"
        ));
    }

    if !target_dir.is_dir() {
        return Err(anyhow::anyhow!(
            "Target path is not a directory: {target_dir}"
        ));
    }

    let config_path = target_dir.join(CONFIG_FILE_NAME);
    if config_path.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "{CONFIG_FILE_NAME} already exists at {config_path}\nUse --force to overwrite"
        ));
    }

    fs::write(&config_path, DEFAULT_CONFIG)?;
    info!(path = %config_path, "config written");
    println!("✓ Created {CONFIG_FILE_NAME} at {config_path}");
    Ok(())
}
