use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use planmark_engine::linting::{LintEngine, LintOptions};
use planmark_engine::models::Diagnostic;
use planmark_engine::parse_plan_file;

use crate::{OutputFormat, SeverityFilter};

use super::{effective_disabled_rules, filter_by_severity, report_diagnostics};

pub fn run(
    files: &[PathBuf],
    format: OutputFormat,
    quiet: bool,
    disabled: Vec<String>,
    severity: SeverityFilter,
) -> anyhow::Result<ExitCode> {
    let engine = LintEngine::new();
    let disabled_rules = effective_disabled_rules(disabled);
    let mut all: Vec<Diagnostic> = Vec::new();

    for file in files {
        let source = std::fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let doc = parse_plan_file(&source, Some(&file.to_string_lossy()));
        all.extend(engine.lint(
            &doc,
            &LintOptions {
                disabled_rules: disabled_rules.clone(),
                source: Some(source),
            },
        ));
    }

    let all = filter_by_severity(all, severity);
    report_diagnostics(&all, format, quiet)
}
