//! `endpoints` command: list the routes found in source code.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::Settings;
use crate::error::ValidatorError;
use crate::io::{ExitCode, render_endpoints_json, render_endpoints_text, render_error_json};
use crate::scan::EndpointScanner;

pub fn run_endpoints(settings: Arc<Settings>, code_path: &Path, json: bool) -> Result<ExitCode> {
    let outcome = match EndpointScanner::new(settings).scan(code_path) {
        Ok(outcome) => outcome,
        Err(e) => {
            let e = ValidatorError::from(e);
            tracing::error!(target: "cli", "{e}");
            if json {
                println!("{}", render_error_json(&e)?);
            } else {
                eprintln!("Error: {e}");
            }
            return Ok(e.exit_code());
        }
    };

    if json {
        println!("{}", render_endpoints_json(&outcome)?);
    } else {
        print!("{}", render_endpoints_text(&outcome));
    }
    Ok(ExitCode::Success)
}
