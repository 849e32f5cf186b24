//! Census command - shows regime status

use anyhow::Result;
use camino::Utf8Path;
use plumb_core::config::CONFIG_FILE_NAME;
use plumb_core::DecreeSettings;
use plumb_indentation::IndentationConfig;

use crate::cli::CensusArgs;
use crate::config::load_decree_config;
use crate::regime::{NATIVE_DECREES, indentation_config, should_load_decree};

pub fn run_census(args: CensusArgs) -> Result<()> {
    let config = load_decree_config(args.config.as_deref())?;

    let config_display = args
        .config
        .as_deref()
        .unwrap_or_else(|| Utf8Path::new(CONFIG_FILE_NAME));

    println!("Regime Status");
    println!("─────────────");
    println!();

    if config_display.exists() {
        println!("Config: {config_display} (found)");
    } else {
        println!("Config: {config_display} (not found - using defaults)");
    }
    println!();

    println!("Native decrees: {}", NATIVE_DECREES.len());
    for (name, extensions) in NATIVE_DECREES {
        let enabled = should_load_decree(config.as_ref(), name);
        let status = if enabled { "✓" } else { "○" };
        let exts = extensions.join(", ");
        println!("  {status} {name:<12} (*.{exts})");

        let settings = config.as_ref().and_then(|c| c.settings(name));
        if args.details {
            for line in effective_settings(&indentation_config(config.as_ref())) {
                println!("      {line}");
            }
        } else {
            println!("      {}", overrides(settings));
        }
    }

    Ok(())
}

/// Every effective setting as `key=value`, four per line.
#[must_use]
pub fn effective_settings(config: &IndentationConfig) -> Vec<String> {
    let fields = [
        format!("basic_offset={}", config.basic_offset),
        format!("brace_adjustment={}", config.brace_adjustment),
        format!("case_indent={}", config.case_indent),
        format!("array_init_indent={}", config.array_init_indent),
        format!("throws_indent={}", config.throws_indent),
        format!("line_wrapping_indentation={}", config.line_wrapping_indentation),
        format!("tab_width={}", config.tab_width),
        format!("force_strict_condition={}", config.force_strict_condition),
        format!("comments={}", config.comments),
        format!("asterisk={}", config.asterisk),
        format!(
            "asterisk_alignment={}",
            match config.asterisk_alignment {
                plumb_indentation::AsteriskAlignment::Left => "left",
                plumb_indentation::AsteriskAlignment::Right => "right",
            }
        ),
    ];
    fields.chunks(4).map(|chunk| chunk.join("  ")).collect()
}

fn overrides(settings: Option<&DecreeSettings>) -> String {
    let Some(settings) = settings else {
        return "(no overrides)".to_string();
    };

    let mut fields = Vec::new();

    macro_rules! push_opt {
        ($label:expr, $opt:expr) => {
            if let Some(val) = $opt {
                fields.push(format!("{}={}", $label, val));
            }
        };
    }

    push_opt!("enabled", settings.enabled);
    push_opt!("basic_offset", settings.basic_offset);
    push_opt!("brace_adjustment", settings.brace_adjustment);
    push_opt!("case_indent", settings.case_indent);
    push_opt!("array_init_indent", settings.array_init_indent);
    push_opt!("throws_indent", settings.throws_indent);
    push_opt!("line_wrapping_indentation", settings.line_wrapping_indentation);
    push_opt!("tab_width", settings.tab_width);
    push_opt!("force_strict_condition", settings.force_strict_condition);
    push_opt!("comments", settings.comments);
    push_opt!("asterisk", settings.asterisk);
    push_opt!("asterisk_alignment", settings.asterisk_alignment.as_deref());

    if fields.is_empty() {
        "(no overrides)".to_string()
    } else {
        fields.join("  ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plumb_core::PlumbConfig;

    #[test]
    fn lists_only_configured_overrides() {
        let config =
            PlumbConfig::from_toml("[decree.indentation]\ncase_indent = 0\ntab_width = 4\n").unwrap();
        assert_eq!(
            overrides(config.settings("indentation")),
            "case_indent=0  tab_width=4"
        );
        assert_eq!(overrides(None), "(no overrides)");
    }

    #[test]
    fn effective_settings_cover_every_key() {
        let lines = effective_settings(&IndentationConfig::default());
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("basic_offset=4  brace_adjustment=0"));
        assert!(lines[2].ends_with("asterisk_alignment=right"));
    }
}
