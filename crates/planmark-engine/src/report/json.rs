use serde::Serialize;

use crate::models::{Diagnostic, Severity};

/// Aggregate report shape for machine consumers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonReport<'a> {
    pub total_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub diagnostics: &'a [Diagnostic],
}

pub fn format_json_report(diagnostics: &[Diagnostic]) -> Result<String, serde_json::Error> {
    let count = |severity: Severity| {
        diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    };
    let report = JsonReport {
        total_count: diagnostics.len(),
        error_count: count(Severity::Error),
        warning_count: count(Severity::Warning),
        info_count: count(Severity::Info),
        diagnostics,
    };
    serde_json::to_string_pretty(&report)
}
