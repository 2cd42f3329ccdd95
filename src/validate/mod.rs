//! Endpoint inventory and schema security validation.

pub mod finding;
pub mod report;
pub mod security;
pub mod validator;

pub use finding::{Finding, RuleId, Severity};
pub use report::{SeverityCounts, ValidationReport};
pub use validator::Validator;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::Settings;
use crate::error::ValidatorResult;
use crate::scan::EndpointScanner;
use crate::schema::load_schema;

/// Load the schema, scan `code_path` and cross-check the two.
pub fn run(
    settings: Arc<Settings>,
    code_path: &Path,
    schema_path: &Path,
) -> ValidatorResult<ValidationReport> {
    let started = Instant::now();

    let schema = load_schema(schema_path)?;
    let outcome = EndpointScanner::new(Arc::clone(&settings)).scan(code_path)?;
    let findings = Validator::new(&schema, &settings.validation).validate(&outcome.endpoints);

    let report = ValidationReport {
        code_path: code_path.to_path_buf(),
        schema_path: schema_path.to_path_buf(),
        files_scanned: outcome.files_scanned,
        files_skipped: outcome.files_skipped,
        endpoints_found: outcome.endpoints.len(),
        schema_operations: schema.operation_count(),
        findings,
        duration_ms: started.elapsed().as_millis() as u64,
    };

    tracing::info!(
        target: "validate",
        "Validated {} endpoints against {} schema operations in {}ms",
        report.endpoints_found,
        report.schema_operations,
        report.duration_ms
    );
    Ok(report)
}
