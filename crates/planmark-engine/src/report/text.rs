//! Human-readable diagnostic report, grouped by file.

use std::collections::BTreeMap;

use owo_colors::OwoColorize;

use crate::models::{Diagnostic, Severity};

#[derive(Debug, Clone, Copy)]
pub struct TextReportOptions {
    pub color: bool,
}

impl Default for TextReportOptions {
    fn default() -> Self {
        Self { color: true }
    }
}

fn severity_label(severity: Severity, color: bool) -> String {
    let label = match severity {
        Severity::Error => "error",
        Severity::Warning => "warn ",
        Severity::Info => "info ",
    };
    if !color {
        return label.to_string();
    }
    match severity {
        Severity::Error => label.red().to_string(),
        Severity::Warning => label.yellow().to_string(),
        Severity::Info => label.cyan().to_string(),
    }
}

pub fn format_text_report(diagnostics: &[Diagnostic], options: TextReportOptions) -> String {
    let color = options.color;

    if diagnostics.is_empty() {
        let message = "All checks passed.";
        return if color {
            message.green().to_string()
        } else {
            message.to_string()
        };
    }

    let mut by_file: BTreeMap<&str, Vec<&Diagnostic>> = BTreeMap::new();
    for d in diagnostics {
        by_file
            .entry(d.file_path.as_deref().unwrap_or("<unknown>"))
            .or_default()
            .push(d);
    }

    let mut lines: Vec<String> = Vec::new();

    for (file_path, mut file_diags) in by_file {
        lines.push(String::new());
        lines.push(if color {
            file_path.bold().to_string()
        } else {
            file_path.to_string()
        });

        file_diags.sort_by_key(|d| d.range.start.line);
        for d in file_diags {
            let loc = format!("{}:{}", d.range.start.line, d.range.start.column);
            let rule = if color {
                d.rule_id.dimmed().to_string()
            } else {
                d.rule_id.clone()
            };
            lines.push(format!(
                "  {loc}\t{}\t{}\t{rule}",
                severity_label(d.severity, color),
                d.message
            ));
        }
    }

    let errors = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warnings = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    let infos = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Info)
        .count();

    lines.push(String::new());
    let mut parts = Vec::new();
    if errors > 0 {
        let part = format!("{errors} error(s)");
        parts.push(if color { part.red().to_string() } else { part });
    }
    if warnings > 0 {
        let part = format!("{warnings} warning(s)");
        parts.push(if color {
            part.yellow().to_string()
        } else {
            part
        });
    }
    if infos > 0 {
        let part = format!("{infos} info");
        parts.push(if color { part.cyan().to_string() } else { part });
    }
    lines.push(parts.join(", "));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, Range};

    fn diag(file: &str, line: usize, severity: Severity, message: &str) -> Diagnostic {
        Diagnostic {
            rule_id: "PLAN-001".to_string(),
            severity,
            message: message.to_string(),
            range: Range::new(Location::new(line, 1), Location::new(line, 10)),
            file_path: Some(file.to_string()),
        }
    }

    #[test]
    fn empty_report_is_a_pass() {
        let out = format_text_report(&[], TextReportOptions { color: false });
        assert_eq!(out, "All checks passed.");
    }

    #[test]
    fn groups_by_file_and_sorts_by_line() {
        let diags = vec![
            diag("b.plan", 9, Severity::Warning, "late"),
            diag("a.plan", 3, Severity::Error, "first"),
            diag("b.plan", 2, Severity::Info, "early"),
        ];
        let out = format_text_report(&diags, TextReportOptions { color: false });
        let lines: Vec<&str> = out.lines().collect();

        let a_idx = lines.iter().position(|l| *l == "a.plan").unwrap();
        let b_idx = lines.iter().position(|l| *l == "b.plan").unwrap();
        assert!(a_idx < b_idx);
        assert!(lines[b_idx + 1].contains("early"));
        assert!(lines[b_idx + 2].contains("late"));
        assert!(out.ends_with("1 error(s), 1 warning(s), 1 info"));
    }
}
