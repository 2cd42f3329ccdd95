//! Default command: scan code and validate it against the schema.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::Settings;
use crate::io::{ExitCode, render_error_json, render_json, render_text};
use crate::validate;

/// Run validation and print the report. Operational errors are reported
/// here too, so the caller only has to exit with the returned code.
pub fn run_validate(
    settings: Arc<Settings>,
    code_path: &Path,
    schema_path: &Path,
    json: bool,
) -> Result<ExitCode> {
    let fail_on = settings.validation.fail_on;

    let report = match validate::run(Arc::clone(&settings), code_path, schema_path) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(target: "cli", "{e}");
            if json {
                println!("{}", render_error_json(&e)?);
            } else {
                eprintln!("Error: {e}");
                if let Some(hint) = e.hint() {
                    eprintln!("Hint: {hint}");
                }
            }
            return Ok(e.exit_code());
        }
    };

    if json {
        println!("{}", render_json(&report, fail_on)?);
    } else {
        print!("{}", render_text(&report, fail_on));
    }

    if report.passed(fail_on) {
        tracing::info!(target: "cli", "API Endpoint Validation Passed.");
        Ok(ExitCode::Success)
    } else {
        for finding in report.failures(fail_on) {
            tracing::debug!(target: "cli", "{finding}");
        }
        Ok(ExitCode::ValidationFailed)
    }
}
