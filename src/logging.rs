//! Unified logging for diagnostic output.
//!
//! Provides compact timestamped logging on stderr with per-module level
//! configuration. Supports the `RUST_LOG` environment variable for runtime
//! overrides.
//!
//! # Configuration
//!
//! ```toml
//! [logging]
//! default = "warn"  # quiet by default
//!
//! [logging.modules]
//! scan = "debug"    # enable scanner debug logs
//! ```
//!
//! # Environment Variable
//!
//! `RUST_LOG` takes precedence over config and over `--verbose`:
//! ```bash
//! RUST_LOG=debug codeintel-api-endpoint-validator ./src openapi.yaml
//! RUST_LOG=schema=trace,validate=debug codeintel-api-endpoint-validator ./src openapi.yaml
//! ```

use std::sync::Once;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

/// Compact time format: HH:MM:SS.mmm
struct CompactTime;

impl FormatTime for CompactTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S%.3f"))
    }
}

/// Build the filter directive string from config.
///
/// `verbose` raises the default level to `debug` but keeps explicit
/// per-module overrides.
pub fn filter_directives(config: &LoggingConfig, verbose: bool) -> String {
    let mut filter_str = if verbose {
        "debug".to_string()
    } else {
        config.default.clone()
    };

    let mut modules: Vec<_> = config.modules.iter().collect();
    modules.sort();
    for (module, level) in modules {
        filter_str.push_str(&format!(",{module}={level}"));
    }
    filter_str
}

/// Initialize logging with configuration.
///
/// Call once at startup. Safe to call multiple times (only first call takes effect).
pub fn init_with_config(config: &LoggingConfig, verbose: bool) {
    INIT.call_once(|| {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(filter_directives(config, verbose))
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_timer(CompactTime)
            .with_level(true)
            .with_filter(filter);

        tracing_subscriber::registry().with(fmt_layer).init();

        if verbose {
            tracing::debug!(target: "cli", "Verbose logging enabled.");
        }
    });
}
