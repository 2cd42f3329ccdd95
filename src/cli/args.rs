//! CLI argument parsing using clap.
//!
//! Contains the Cli struct and the Commands enum.

use clap::{
    Args, Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

use crate::validate::Severity;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Examples appended to `--help`
fn create_quick_start() -> String {
    use console::style;

    let mut help = String::new();
    help.push_str(&format!("{}\n", style("Quick Start:").cyan().bold()));
    help.push_str("  $ codeintel-api-endpoint-validator ./src openapi.yaml          # Validate endpoints\n");
    help.push_str("  $ codeintel-api-endpoint-validator -v ./app swagger.json       # With debug logging\n");
    help.push_str("  $ codeintel-api-endpoint-validator --json ./src openapi.yml    # JSON envelope for CI\n");
    help.push_str("  $ codeintel-api-endpoint-validator endpoints ./src             # List routes found in code\n");
    help.push_str("  $ codeintel-api-endpoint-validator init                        # Create .codeintel/settings.toml\n");
    help
}

/// Validate API endpoints in a codebase against an OpenAPI/Swagger schema
#[derive(Parser, Debug)]
#[command(
    name = "codeintel-api-endpoint-validator",
    version = env!("CARGO_PKG_VERSION"),
    about = "Validate API endpoints in a codebase against an OpenAPI/Swagger schema.",
    styles = clap_cargo_style(),
    after_help = create_quick_start(),
    subcommand_negates_reqs = true
)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to custom settings.toml file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit a JSON envelope instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Number of worker threads (overrides config)
    #[arg(short, long, global = true, value_name = "N")]
    pub threads: Option<usize>,

    #[command(flatten)]
    pub validate: ValidateArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Arguments of the default (validation) mode
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the codebase to scan
    #[arg(value_name = "CODE_PATH", required = true)]
    pub code_path: Option<PathBuf>,

    /// Path to the API schema file (YAML or JSON)
    #[arg(value_name = "SCHEMA_PATH", required = true)]
    pub schema_path: Option<PathBuf>,

    /// Lowest severity that fails the run (overrides config)
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub fail_on: Option<Severity>,

    /// Do not report schema operations missing from code
    #[arg(long)]
    pub no_unimplemented: bool,

    /// Skip schema security checks
    #[arg(long)]
    pub no_security: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List endpoints discovered in source code
    Endpoints {
        /// Path to the codebase to scan
        #[arg(value_name = "CODE_PATH")]
        code_path: PathBuf,
    },

    /// Create .codeintel/settings.toml and .codeintelignore
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}
