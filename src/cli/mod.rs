//! CLI module for the endpoint validator.
//!
//! Provides command-line interface parsing and command dispatch.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, ValidateArgs};

use anyhow::Result;
use std::sync::Arc;

use crate::Settings;
use crate::io::ExitCode;
use crate::logging;

/// Load settings and apply command-line overrides on top.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    if let Some(threads) = cli.threads {
        settings.scan.parallel_threads = threads;
    }
    if let Some(fail_on) = cli.validate.fail_on {
        settings.validation.fail_on = fail_on;
    }
    if cli.validate.no_unimplemented {
        settings.validation.report_unimplemented = false;
    }
    if cli.validate.no_security {
        settings.validation.security_checks = false;
    }
    Ok(settings)
}

/// Dispatch a parsed command line.
pub fn run(cli: Cli) -> Result<ExitCode> {
    let settings = load_settings(&cli)?;
    logging::init_with_config(&settings.logging, cli.verbose);

    match &cli.command {
        Some(Commands::Endpoints { code_path }) => {
            commands::endpoints::run_endpoints(Arc::new(settings), code_path, cli.json)
        }
        Some(Commands::Init { force }) => {
            commands::init::run_init(&std::env::current_dir()?, *force)
        }
        Some(Commands::Config) => commands::init::run_config(&settings),
        None => {
            // clap enforces both positionals when no subcommand is given
            let (Some(code_path), Some(schema_path)) =
                (&cli.validate.code_path, &cli.validate.schema_path)
            else {
                anyhow::bail!("<CODE_PATH> and <SCHEMA_PATH> are required");
            };
            commands::validate::run_validate(Arc::new(settings), code_path, schema_path, cli.json)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::Severity;
    use clap::Parser;

    #[test]
    fn test_cli_overrides_settings() {
        let cli = Cli::try_parse_from([
            "bin",
            "--config",
            "/nonexistent/settings.toml",
            "--fail-on",
            "info",
            "--no-unimplemented",
            "--threads",
            "3",
            "src",
            "openapi.yaml",
        ])
        .unwrap();

        let settings = load_settings(&cli).unwrap();
        assert_eq!(settings.scan.parallel_threads, 3);
        assert_eq!(settings.validation.fail_on, Severity::Info);
        assert!(!settings.validation.report_unimplemented);
        assert!(settings.validation.security_checks);
    }
}
