//! Interactive configuration bootstrap
//!
//! Prompts for each setting with sensible defaults and writes
//! `ts-openapi.config.json` to the working directory. Values are
//! validated at prompt time with the same rules the daemon applies at
//! load time, so an `init`-produced file always loads.

use std::path::Path;

use anyhow::{Context, Result};
use dialoguer::{Input, Select, theme::ColorfulTheme};

use typesync_core::config::{Config, Environment, LogLevel};

const ENVIRONMENTS: &[(&str, Environment)] = &[
    ("development", Environment::Development),
    ("production", Environment::Production),
    ("test", Environment::Test),
];

const LOG_LEVELS: &[(&str, LogLevel)] = &[
    ("error", LogLevel::Error),
    ("warn", LogLevel::Warn),
    ("info", LogLevel::Info),
    ("http", LogLevel::Http),
    ("verbose", LogLevel::Verbose),
    ("debug", LogLevel::Debug),
    ("silly", LogLevel::Silly),
];

/// Run the interactive prompt sequence and write the configuration file
pub fn run(config_path: &Path) -> Result<()> {
    let theme = ColorfulTheme::default();

    if config_path.exists() {
        let overwrite = dialoguer::Confirm::with_theme(&theme)
            .with_prompt(format!("{} already exists. Overwrite?", config_path.display()))
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;
        if !overwrite {
            println!("Aborted, existing configuration left untouched.");
            return Ok(());
        }
    }

    let port: u16 = Input::with_theme(&theme)
        .with_prompt("Port for the types server")
        .default(3000)
        .validate_with(|value: &u16| {
            if *value > 0 {
                Ok(())
            } else {
                Err("Port must be a positive integer")
            }
        })
        .interact_text()
        .context("Failed to read port")?;

    let environment_idx = Select::with_theme(&theme)
        .with_prompt("Runtime environment")
        .items(&ENVIRONMENTS.iter().map(|(name, _)| *name).collect::<Vec<_>>())
        .default(0)
        .interact()
        .context("Failed to read environment")?;

    let log_level_idx = Select::with_theme(&theme)
        .with_prompt("Log level")
        .items(&LOG_LEVELS.iter().map(|(name, _)| *name).collect::<Vec<_>>())
        .default(2)
        .interact()
        .context("Failed to read log level")?;

    let spec_url: String = Input::with_theme(&theme)
        .with_prompt("OpenAPI spec URL")
        .default("http://localhost:3000/api-json".to_string())
        .validate_with(|value: &String| {
            if value.starts_with("http://") || value.starts_with("https://") {
                Ok(())
            } else {
                Err("URL must start with http:// or https://")
            }
        })
        .interact_text()
        .context("Failed to read spec URL")?;

    let output_path: String = Input::with_theme(&theme)
        .with_prompt("Output file path")
        .default("./src/types.ts".to_string())
        .validate_with(|value: &String| {
            if value.ends_with(".ts") || value.ends_with(".mts") || value.ends_with(".cts") {
                Ok(())
            } else {
                Err("Output path must end in .ts, .mts or .cts")
            }
        })
        .interact_text()
        .context("Failed to read output path")?;

    let config = Config {
        port,
        environment: ENVIRONMENTS[environment_idx].1,
        log_level: LOG_LEVELS[log_level_idx].1,
        spec_url,
        output_path,
        update_interval_ms: None,
        watch_dir: None,
    };
    config.validate().context("Configuration failed validation")?;

    let serialized = serde_json::to_string_pretty(&config)?;
    std::fs::write(config_path, serialized + "\n")
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Configuration file created: {}", config_path.display());
    Ok(())
}
