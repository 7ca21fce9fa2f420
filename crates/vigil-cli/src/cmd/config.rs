use super::load_config;
use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;
use vigil_core::config::{Config, WarnLevel};
use vigil_core::{io, paths};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Write a default config file if none exists
    Init,

    /// Print the effective config (file + environment overrides)
    Show,

    /// Validate the config for common mistakes
    Validate,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Init => init(root, json),
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::Validate => validate(root, json),
    }
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

fn init(root: &Path, json: bool) -> anyhow::Result<()> {
    let path = paths::config_path(root);
    let data = serde_yaml::to_string(&Config::default())?;
    let created = io::create_if_absent(&path, data.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;

    if json {
        print_json(&serde_json::json!({
            "path": path,
            "created": created,
        }))?;
    } else if created {
        println!("Created {}", path.display());
    } else {
        println!("{} already exists; left unchanged.", path.display());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    if json {
        print_json(&config)?;
    } else {
        print!("{}", serde_yaml::to_string(&config)?);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let warnings = config.validate();

    if json {
        let value = serde_json::json!({
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    let has_errors = warnings.iter().any(|w| w.level == WarnLevel::Error);
    if has_errors {
        anyhow::bail!("config validation found errors");
    }

    Ok(())
}
