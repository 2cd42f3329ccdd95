//! Text and JSON rendering of validation reports and endpoint listings.

use console::style;
use serde::Serialize;

use super::{EntityType, Envelope, ErrorDetails, ResultCode};
use crate::error::ValidatorError;
use crate::parsing::DiscoveredEndpoint;
use crate::scan::ScanOutcome;
use crate::validate::{Finding, Severity, ValidationReport};

pub const PASSED_BANNER: &str = "API Endpoint Validation Passed.";
pub const FAILED_BANNER: &str = "API Endpoint Validation Failed:";

fn severity_label(severity: Severity) -> String {
    let label = format!("{:<7}", severity.as_str());
    match severity {
        Severity::Error => style(label).red().bold().to_string(),
        Severity::Warning => style(label).yellow().to_string(),
        Severity::Info => style(label).dim().to_string(),
    }
}

/// Where a finding points: source location, else `METHOD /path`, else the schema.
fn finding_target(finding: &Finding) -> String {
    if let Some(location) = &finding.location {
        return location.to_string();
    }
    match (&finding.method, &finding.path) {
        (Some(method), Some(path)) => format!("{method} {path}"),
        (None, Some(path)) => path.clone(),
        _ => "schema".to_string(),
    }
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

/// Human-readable report.
pub fn render_text(report: &ValidationReport, fail_on: Severity) -> String {
    let mut out = String::new();

    if report.passed(fail_on) {
        out.push_str(&format!("{}\n", style(PASSED_BANNER).green().bold()));
    } else {
        out.push_str(&format!("{}\n", style(FAILED_BANNER).red().bold()));
    }

    for finding in &report.findings {
        out.push_str(&format!(
            "  {} {}  {} {}\n",
            severity_label(finding.severity),
            finding_target(finding),
            finding.message,
            style(format!("[{}]", finding.rule)).dim()
        ));
    }

    let counts = report.counts();
    out.push_str(&format!(
        "\n{} in {} checked against {}: {}, {}, {} info ({}ms)\n",
        plural(report.endpoints_found, "endpoint"),
        plural(report.files_scanned, "file"),
        plural(report.schema_operations, "schema operation"),
        plural(counts.errors, "error"),
        plural(counts.warnings, "warning"),
        counts.info,
        report.duration_ms
    ));
    out
}

/// JSON envelope carrying the whole report.
pub fn render_json(
    report: &ValidationReport,
    fail_on: Severity,
) -> Result<String, serde_json::Error> {
    let count = report.findings.len();
    let envelope = if report.passed(fail_on) {
        Envelope::success(report).with_message(PASSED_BANNER)
    } else {
        let blocking = report.failures(fail_on).count();
        Envelope::failed(report, FAILED_BANNER)
            .with_hint(format!("{} at or above '{fail_on}'", plural(blocking, "finding")))
    };
    envelope
        .with_entity_type(EntityType::ValidationReport)
        .with_count(count)
        .with_duration_ms(report.duration_ms)
        .to_json()
}

/// One line per endpoint plus a summary line.
pub fn render_endpoints_text(outcome: &ScanOutcome) -> String {
    let mut out = String::new();
    for endpoint in &outcome.endpoints {
        out.push_str(&format!(
            "{:<7} {}  {}  {}\n",
            endpoint.method_label(),
            endpoint.template,
            style(endpoint.framework).cyan(),
            style(&endpoint.location).dim()
        ));
    }
    out.push_str(&format!(
        "\nFound {} in {}\n",
        plural(outcome.endpoints.len(), "endpoint"),
        plural(outcome.files_scanned, "file")
    ));
    out
}

#[derive(Serialize)]
struct EndpointListing<'a> {
    endpoints: &'a [DiscoveredEndpoint],
    files_scanned: usize,
    files_skipped: usize,
}

pub fn render_endpoints_json(outcome: &ScanOutcome) -> Result<String, serde_json::Error> {
    let listing = EndpointListing {
        endpoints: &outcome.endpoints,
        files_scanned: outcome.files_scanned,
        files_skipped: outcome.files_skipped,
    };
    Envelope::success(listing)
        .with_message(format!("Found {}", plural(outcome.endpoints.len(), "endpoint")))
        .with_entity_type(EntityType::Endpoints)
        .with_count(outcome.endpoints.len())
        .to_json()
}

/// Error envelope for an operational failure.
pub fn render_error_json(error: &ValidatorError) -> Result<String, serde_json::Error> {
    let code = match error {
        ValidatorError::Schema(_) => ResultCode::SchemaError,
        ValidatorError::Scan(_) => ResultCode::ScanError,
        ValidatorError::Config(_) => ResultCode::ConfigError,
        ValidatorError::Parse(_) => ResultCode::InternalError,
    };
    let mut envelope: Envelope<()> = Envelope::error(code, error.to_string());
    if let Some(hint) = error.hint() {
        envelope = envelope
            .with_hint(hint)
            .with_error_details(ErrorDetails {
                suggestions: vec![hint.to_string()],
                context: None,
            });
    }
    envelope.to_json()
}
