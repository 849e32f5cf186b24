//! Configuration loading for .plumb.toml

use garde::Validate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default configuration file name, looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = ".plumb.toml";

/// Root configuration from .plumb.toml
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlumbConfig {
    #[serde(default)]
    pub decree: HashMap<String, DecreeSettings>,
}

/// Settings for a specific decree
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[garde(context(()))]
pub struct DecreeSettings {
    #[garde(skip)]
    pub enabled: Option<bool>,

    // Structural indentation
    #[garde(custom(validate_offset))]
    pub basic_offset: Option<usize>,
    #[garde(custom(validate_offset))]
    pub brace_adjustment: Option<usize>,
    #[garde(custom(validate_offset))]
    pub case_indent: Option<usize>,
    #[garde(custom(validate_offset))]
    pub array_init_indent: Option<usize>,
    #[garde(custom(validate_offset))]
    pub throws_indent: Option<usize>,
    #[garde(custom(validate_offset))]
    pub line_wrapping_indentation: Option<usize>,
    #[garde(custom(validate_tab_width))]
    pub tab_width: Option<usize>,
    #[garde(skip)]
    pub force_strict_condition: Option<bool>,

    // Comment checks
    #[garde(skip)]
    pub comments: Option<bool>,
    #[garde(skip)]
    pub asterisk: Option<bool>,
    #[garde(custom(validate_asterisk_alignment))]
    pub asterisk_alignment: Option<String>,
}

// ============================================================================
// Custom Validators
// Note: garde requires `&Option<T>` and `&()` signatures - clippy lints suppressed
// ============================================================================

#[allow(
    clippy::ref_option,
    clippy::trivially_copy_pass_by_ref,
    clippy::option_if_let_else
)]
fn validate_offset(value: &Option<usize>, _ctx: &()) -> garde::Result {
    if let Some(v) = value {
        if *v <= 32 {
            Ok(())
        } else {
            Err(garde::Error::new(format!(
                "{v} is outside the range 0-32 - common values are 0, 2, 4, or 8"
            )))
        }
    } else {
        Ok(())
    }
}

#[allow(
    clippy::ref_option,
    clippy::trivially_copy_pass_by_ref,
    clippy::option_if_let_else
)]
fn validate_tab_width(value: &Option<usize>, _ctx: &()) -> garde::Result {
    if let Some(v) = value {
        if *v >= 1 && *v <= 16 {
            Ok(())
        } else {
            Err(garde::Error::new(format!(
                "{v} is outside the range 1-16 - common values are 2, 4, or 8"
            )))
        }
    } else {
        Ok(())
    }
}

#[allow(
    clippy::ref_option,
    clippy::trivially_copy_pass_by_ref,
    clippy::option_if_let_else
)]
fn validate_asterisk_alignment(value: &Option<String>, _ctx: &()) -> garde::Result {
    if let Some(v) = value {
        match v.as_str() {
            "left" | "right" => Ok(()),
            _ => Err(garde::Error::new(format!(
                "'{v}' is not valid - use 'left' or 'right'"
            ))),
        }
    } else {
        Ok(())
    }
}

// ============================================================================
// Config Error
// ============================================================================

/// Error type for configuration loading
#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Validation(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "config read error: {e}"),
            Self::Parse(e) => write!(f, "config parse error: {e}"),
            Self::Validation(e) => write!(f, "config validation error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Config Loading
// ============================================================================

impl PlumbConfig {
    /// Parse and validate configuration text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the TOML content is invalid.
    /// Returns `ConfigError::Validation` if decree settings fail validation.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        for (name, settings) in &config.decree {
            settings
                .validate()
                .map_err(|e| ConfigError::Validation(format!("decree.{name}: {e}")))?;
        }

        Ok(config)
    }

    /// Load configuration from a TOML file with validation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, otherwise the
    /// errors of [`PlumbConfig::from_toml`].
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Load from default location (.plumb.toml in current directory)
    #[must_use]
    pub fn load_default() -> Option<Self> {
        Self::load_default_strict().ok().flatten()
    }

    /// Load from default location, returning error details on failure.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` with details if loading or validation fails.
    pub fn load_default_strict() -> Result<Option<Self>, ConfigError> {
        let cwd = std::env::current_dir().map_err(|e| ConfigError::Io(e.to_string()))?;
        let config_path = cwd.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        Self::from_file(&config_path).map(Some)
    }

    /// Settings of one decree, if configured.
    #[must_use]
    pub fn settings(&self, decree: &str) -> Option<&DecreeSettings> {
        self.decree.get(decree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_config() {
        let toml = r#"
[decree.indentation]
basic_offset = 2
brace_adjustment = 2
case_indent = 0
array_init_indent = 4
throws_indent = 8
line_wrapping_indentation = 8
tab_width = 4
force_strict_condition = true
comments = true
asterisk_alignment = "left"
"#;

        let config = PlumbConfig::from_toml(toml).unwrap();
        let settings = config.settings("indentation").unwrap();
        assert_eq!(settings.basic_offset, Some(2));
        assert_eq!(settings.case_indent, Some(0));
        assert_eq!(settings.tab_width, Some(4));
        assert_eq!(settings.force_strict_condition, Some(true));
        assert_eq!(settings.asterisk_alignment.as_deref(), Some("left"));
        assert!(settings.asterisk.is_none());
    }

    #[test]
    fn rejects_tab_width_out_of_range() {
        let settings = DecreeSettings {
            tab_width: Some(32),
            ..Default::default()
        };

        let err = settings.validate().unwrap_err().to_string();
        assert!(err.contains("1-16"));
    }

    #[test]
    fn rejects_oversized_offsets() {
        let settings = DecreeSettings {
            line_wrapping_indentation: Some(64),
            ..Default::default()
        };

        let err = settings.validate().unwrap_err().to_string();
        assert!(err.contains("0-32"));
    }

    #[test]
    fn rejects_negative_offset_at_parse() {
        let toml = r"
[decree.indentation]
basic_offset = -4
";
        let result = PlumbConfig::from_toml(toml);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn rejects_unknown_alignment() {
        let toml = r#"
[decree.indentation]
asterisk_alignment = "center"
"#;
        let err = PlumbConfig::from_toml(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("decree.indentation"));
    }

    #[test]
    fn accepts_none_values() {
        let settings = DecreeSettings::default();
        assert!(settings.validate().is_ok());
    }
}
