pub mod convert;
pub mod format;
pub mod init;
pub mod lint;
pub mod lint_project;
pub mod parse;
pub mod templates;
pub mod uncertainty;

use std::process::ExitCode;

use planmark_engine::models::Diagnostic;
use planmark_engine::report::{TextReportOptions, format_json_report, format_text_report};

use crate::{OutputFormat, SeverityFilter};

/// Merge CLI-disabled rules with the user config's standing list.
pub(crate) fn effective_disabled_rules(cli_disabled: Vec<String>) -> Vec<String> {
    let mut disabled = cli_disabled;
    if let Ok(Some(config)) = planmark_config::Config::load() {
        disabled.extend(config.disabled_rules);
    }
    disabled
}

pub(crate) fn filter_by_severity(
    diagnostics: Vec<Diagnostic>,
    min: SeverityFilter,
) -> Vec<Diagnostic> {
    diagnostics
        .into_iter()
        .filter(|d| d.severity.rank() <= min.rank())
        .collect()
}

/// Print diagnostics in the requested format and translate them into an
/// exit code: failure when any error-severity diagnostic remains.
pub(crate) fn report_diagnostics(
    diagnostics: &[Diagnostic],
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<ExitCode> {
    if !(quiet && diagnostics.is_empty()) {
        match format {
            OutputFormat::Json => println!("{}", format_json_report(diagnostics)?),
            OutputFormat::Text => println!(
                "{}",
                format_text_report(diagnostics, TextReportOptions::default())
            ),
        }
    }

    let has_errors = diagnostics
        .iter()
        .any(|d| d.severity == planmark_engine::Severity::Error);
    Ok(if has_errors {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
