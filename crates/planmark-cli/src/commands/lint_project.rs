use std::path::PathBuf;
use std::process::ExitCode;

use planmark_engine::fixing::{FixRegistry, apply_fixes, fixes_for_diagnostics, source_to_lines};
use planmark_engine::linting::{LintEngine, LintOptions};
use planmark_engine::models::Diagnostic;
use planmark_engine::parse_plan_file;
use planmark_engine::project::load_project;

use crate::{OutputFormat, SeverityFilter};

use super::{effective_disabled_rules, filter_by_severity, report_diagnostics};

fn default_dir() -> PathBuf {
    planmark_config::Config::load()
        .ok()
        .flatten()
        .and_then(|c| c.plans_path)
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn run(
    dir: Option<PathBuf>,
    format: OutputFormat,
    quiet: bool,
    disabled: Vec<String>,
    severity: SeverityFilter,
    fix: bool,
) -> anyhow::Result<ExitCode> {
    let dir = dir.unwrap_or_else(default_dir);
    let project = load_project(&dir);

    for err in &project.errors {
        eprintln!("{err}");
    }

    if project.documents.is_empty() {
        println!("No .plan files found.");
        return Ok(ExitCode::SUCCESS);
    }
    tracing::debug!(
        documents = project.documents.len(),
        duplicates = project.duplicate_ids.len(),
        "project loaded"
    );

    let engine = LintEngine::new();
    let disabled_rules = effective_disabled_rules(disabled);
    let options = LintOptions {
        disabled_rules,
        source: None,
    };

    let mut results = engine.lint_project(
        &project.documents,
        &project.sources,
        &options,
        &project.duplicate_ids,
    );

    if fix {
        let registry = FixRegistry::new();
        for (id, diagnostics) in results.iter_mut() {
            if diagnostics.is_empty() {
                continue;
            }
            let Some(doc) = project.documents.get(id) else {
                continue;
            };
            let (Some(file_path), Some(source)) = (&doc.file_path, project.sources.get(id))
            else {
                continue;
            };

            let fixes = fixes_for_diagnostics(diagnostics, &source_to_lines(source), &registry);
            if fixes.is_empty() {
                continue;
            }

            let outcome = apply_fixes(source, &fixes);
            std::fs::write(file_path, &outcome.output)?;

            // Re-parse to report what is left after the rewrite.
            let new_doc = parse_plan_file(&outcome.output, Some(file_path));
            let remaining = engine.lint(
                &new_doc,
                &LintOptions {
                    disabled_rules: options.disabled_rules.clone(),
                    source: Some(outcome.output.clone()),
                },
            );
            println!(
                "{file_path}: Fixed {} issue(s) ({} remaining)",
                outcome.applied.len(),
                remaining.len()
            );
            *diagnostics = remaining;
        }
    }

    let all: Vec<Diagnostic> = results.into_values().flatten().collect();
    let all = filter_by_severity(all, severity);
    report_diagnostics(&all, format, quiet)
}
