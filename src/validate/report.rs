use serde::Serialize;
use std::path::PathBuf;

use super::{Finding, Severity};

/// Outcome of one validation run.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub code_path: PathBuf,
    pub schema_path: PathBuf,
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub endpoints_found: usize,
    pub schema_operations: usize,
    pub findings: Vec<Finding>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
}

impl ValidationReport {
    /// True when no finding reaches `fail_on`.
    pub fn passed(&self, fail_on: Severity) -> bool {
        !self.findings.iter().any(|f| f.severity >= fail_on)
    }

    /// Findings at or above `fail_on`.
    pub fn failures(&self, fail_on: Severity) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.severity >= fail_on)
    }

    pub fn counts(&self) -> SeverityCounts {
        let mut counts = SeverityCounts::default();
        for finding in &self.findings {
            match finding.severity {
                Severity::Error => counts.errors += 1,
                Severity::Warning => counts.warnings += 1,
                Severity::Info => counts.info += 1,
            }
        }
        counts
    }
}
