//! Init and Config commands.

use anyhow::Result;
use std::path::Path;

use crate::config::{ConfigError, IGNORE_FILE, Settings};
use crate::io::ExitCode;

/// Create the settings file and ignore file under `root`.
pub fn run_init(root: &Path, force: bool) -> Result<ExitCode> {
    match Settings::init_config_file(root, force) {
        Ok(path) => {
            println!("Created configuration file at: {}", path.display());
            println!("Created ignore file at: {}", root.join(IGNORE_FILE).display());
            println!("Edit these files to customize your settings.");
            Ok(ExitCode::Success)
        }
        Err(ConfigError::AlreadyExists(path)) => {
            eprintln!("Configuration file already exists at: {}", path.display());
            eprintln!("Use --force to overwrite");
            Ok(ExitCode::GeneralError)
        }
        Err(e) => Err(e.into()),
    }
}

/// Print the effective configuration.
pub fn run_config(config: &Settings) -> Result<ExitCode> {
    println!("Current Configuration:");
    println!("{}", "=".repeat(50));
    println!("{}", toml::to_string_pretty(config)?);
    Ok(ExitCode::Success)
}
