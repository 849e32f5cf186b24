//! Regime initialization and decree loading

use anyhow::Result;
use plumb_core::{PlumbConfig, Regime};
use plumb_indentation::IndentationConfig;

/// Decrees compiled into the binary, with the extensions they check.
pub const NATIVE_DECREES: &[(&str, &[&str])] = &[("indentation", &["java"])];

/// Check if a decree should be loaded based on config.
/// Returns true if: no config, no decree entry, or enabled != false
pub fn should_load_decree(config: Option<&PlumbConfig>, key: &str) -> bool {
    config
        .and_then(|c| c.settings(key))
        .is_none_or(|s| s.enabled != Some(false))
}

/// Effective indentation settings: defaults overlaid with `[decree.indentation]`.
#[must_use]
pub fn indentation_config(config: Option<&PlumbConfig>) -> IndentationConfig {
    config
        .and_then(|c| c.settings("indentation"))
        .map_or_else(IndentationConfig::default, plumb_indentation::config_from_decree_settings)
}

/// Build the regime with every enabled native decree.
///
/// # Errors
///
/// Returns an error if a decree was built against an incompatible ABI.
pub fn init_regime(config: Option<&PlumbConfig>) -> Result<Regime> {
    let mut regime = Regime::new();
    if should_load_decree(config, "indentation") {
        regime.add_decree(plumb_indentation::init_decree_with_config(
            indentation_config(config),
        ))?;
    }
    Ok(regime)
}
