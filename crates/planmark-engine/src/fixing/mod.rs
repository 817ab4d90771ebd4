//! Automatic fixes: map specific diagnostics to textual edits and apply
//! them bottom-up so earlier insertions cannot invalidate later indices.

mod providers;

pub use providers::FixRegistry;

use crate::models::{Diagnostic, Range};

/// A single pure edit over the source line array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixEdit {
    /// Insert a new line at the given 0-based index.
    InsertLine { index: usize, text: String },
    /// Append a suffix to the line at the given 0-based index
    /// (trailing whitespace on the line is trimmed first).
    AppendToLine { index: usize, suffix: String },
}

/// A proposed fix for one diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fix {
    pub rule_id: &'static str,
    /// 1-based position of the diagnostic the fix addresses.
    pub range: Range,
    pub description: String,
    pub edit: FixEdit,
}

impl Fix {
    /// Apply the edit, returning a new line array. Never fails: an
    /// out-of-bounds index leaves the input unchanged.
    pub fn apply(&self, lines: &[String]) -> Vec<String> {
        let mut result = lines.to_vec();
        match &self.edit {
            FixEdit::InsertLine { index, text } => {
                let index = (*index).min(result.len());
                result.insert(index, text.clone());
            }
            FixEdit::AppendToLine { index, suffix } => {
                if let Some(line) = result.get_mut(*index) {
                    *line = format!("{}{}", line.trim_end(), suffix);
                }
            }
        }
        result
    }
}

/// A provider maps diagnostics of one rule to concrete fixes.
pub trait FixProvider {
    fn rule_id(&self) -> &'static str;
    fn fixes(&self, diagnostic: &Diagnostic, source_lines: &[String]) -> Vec<Fix>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixOutcome {
    pub output: String,
    /// Applied fix descriptions in top-to-bottom source order.
    pub applied: Vec<String>,
}

/// Collect fixes for a diagnostic list from the registry.
pub fn fixes_for_diagnostics(
    diagnostics: &[Diagnostic],
    source_lines: &[String],
    registry: &FixRegistry,
) -> Vec<Fix> {
    diagnostics
        .iter()
        .filter_map(|d| registry.provider(&d.rule_id).map(|p| p.fixes(d, source_lines)))
        .flatten()
        .collect()
}

/// Apply fixes to source text.
///
/// Fixes are sorted bottom-up (descending start line, then descending
/// column for same-line fixes) before applying, so that splicing lines
/// near the top of the file does not invalidate the indices of fixes still
/// pending further down. The applied-description list is reversed at the
/// end so it reads in top-to-bottom order for reporting.
pub fn apply_fixes(source: &str, fixes: &[Fix]) -> FixOutcome {
    if fixes.is_empty() {
        return FixOutcome {
            output: source.to_string(),
            applied: Vec::new(),
        };
    }

    let mut lines: Vec<String> = source.split('\n').map(String::from).collect();
    let mut applied = Vec::new();

    let mut sorted: Vec<&Fix> = fixes.iter().collect();
    sorted.sort_by(|a, b| {
        b.range
            .start
            .line
            .cmp(&a.range.start.line)
            .then(b.range.start.column.cmp(&a.range.start.column))
    });

    for fix in sorted {
        lines = fix.apply(&lines);
        applied.push(fix.description.clone());
    }

    applied.reverse();

    FixOutcome {
        output: lines.join("\n"),
        applied,
    }
}

/// Scan forward from a heading for the insertion point after an existing
/// run of the given keyword prefixes (blank lines included).
fn insertion_index_after_run(
    source_lines: &[String],
    heading_line: usize,
    prefixes: &[&str],
) -> usize {
    let mut index = heading_line; // 0-based: the line after the 1-based heading
    while let Some(line) = source_lines.get(index) {
        let trimmed = line.trim();
        if trimmed.is_empty() || prefixes.iter().any(|p| trimmed.starts_with(p)) {
            index += 1;
        } else {
            break;
        }
    }
    index
}

/// Split source into the line array the fix providers and [`apply_fixes`]
/// operate on (plain `\n`, matching the join on output).
pub fn source_to_lines(source: &str) -> Vec<String> {
    source.split('\n').map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linting::{LintEngine, LintOptions};
    use crate::parsing::parse_plan_file;

    fn fix_rule(source: &str, rule_id: &str) -> (String, Vec<String>) {
        let doc = parse_plan_file(source, None);
        let diags: Vec<Diagnostic> = LintEngine::new()
            .lint(&doc, &LintOptions::default())
            .into_iter()
            .filter(|d| d.rule_id == rule_id)
            .collect();
        assert_eq!(diags.len(), 1, "expected exactly one {rule_id} diagnostic");

        let lines = source_to_lines(source);
        let registry = FixRegistry::new();
        let fixes = fixes_for_diagnostics(&diags, &lines, &registry);
        assert!(!fixes.is_empty(), "no fixes produced for {rule_id}");

        let outcome = apply_fixes(source, &fixes);
        (outcome.output, outcome.applied)
    }

    fn remaining(source: &str, rule_id: &str) -> usize {
        let doc = parse_plan_file(source, None);
        LintEngine::new()
            .lint(&doc, &LintOptions::default())
            .into_iter()
            .filter(|d| d.rule_id == rule_id)
            .count()
    }

    #[test]
    fn plan_001_fix_inserts_goal_after_feature_heading() {
        let source = "# Feature: F\nMetric: m";
        let (fixed, applied) = fix_rule(source, "PLAN-001");
        assert_eq!(applied.len(), 1);
        assert_eq!(fixed.lines().nth(1), Some("Goal: "));
        assert_eq!(remaining(&fixed, "PLAN-001"), 0);
    }

    #[test]
    fn plan_002_fix_inserts_both_missing_behaviors() {
        let source = "# Feature: F\nGoal: g\nMetric: m\n## Story: S\nGiven: setup\n### Task: T\nAssign: @a";
        let doc = parse_plan_file(source, None);
        let diags: Vec<Diagnostic> = LintEngine::new()
            .lint(&doc, &LintOptions::default())
            .into_iter()
            .filter(|d| d.rule_id == "PLAN-002")
            .collect();
        assert_eq!(diags.len(), 2);

        let lines = source_to_lines(source);
        let fixes = fixes_for_diagnostics(&diags, &lines, &FixRegistry::new());
        let outcome = apply_fixes(source, &fixes);

        // Inserted after the Given: run, before the task heading.
        assert_eq!(outcome.output.lines().nth(5), Some("Then:  [MUST]"));
        assert_eq!(outcome.output.lines().nth(6), Some("When: "));
        assert_eq!(remaining(&outcome.output, "PLAN-002"), 0);
    }

    #[test]
    fn plan_003_fix_inserts_assign_after_task_heading() {
        let source =
            "# Feature: F\nGoal: g\nMetric: m\n## Story: S\nWhen: w\nThen: t [MUST]\nEdge: \"e\"\n### Task: T\nVerify: v";
        let (fixed, _) = fix_rule(source, "PLAN-003");
        let lines: Vec<&str> = fixed.lines().collect();
        assert_eq!(lines[8], "Assign: @");
        assert_eq!(remaining(&fixed, "PLAN-003"), 0);
    }

    #[test]
    fn plan_006_fix_appends_must_in_place() {
        let source = "# Feature: F\nGoal: g\nMetric: m\n## Story: S\nWhen: w\nThen: outcome  ";
        let (fixed, _) = fix_rule(source, "PLAN-006");
        assert!(fixed.lines().nth(5) == Some("Then: outcome [MUST]"));
        assert_eq!(remaining(&fixed, "PLAN-006"), 0);
    }

    #[test]
    fn plan_010_fix_inserts_metric_after_intent_run() {
        let source = "# Feature: F\nGoal: g\nPersona: @p";
        let (fixed, _) = fix_rule(source, "PLAN-010");
        let lines: Vec<&str> = fixed.lines().collect();
        assert_eq!(lines[3], "Metric: ");
        assert_eq!(remaining(&fixed, "PLAN-010"), 0);
    }

    #[test]
    fn fixes_apply_bottom_up_and_report_top_down() {
        let source = "# Feature: F\n## Story: S\nWhen: w\nThen: bare";
        let doc = parse_plan_file(source, None);
        let diags: Vec<Diagnostic> = LintEngine::new()
            .lint(&doc, &LintOptions::default())
            .into_iter()
            .filter(|d| d.rule_id == "PLAN-001" || d.rule_id == "PLAN-006")
            .collect();

        let lines = source_to_lines(source);
        let fixes = fixes_for_diagnostics(&diags, &lines, &FixRegistry::new());
        let outcome = apply_fixes(source, &fixes);

        // The Goal insertion at the top must not shift the Then fix target.
        assert!(outcome.output.contains("Goal: "));
        assert!(outcome.output.contains("Then: bare [MUST]"));
        // Reported top-to-bottom: the Goal insertion first.
        assert!(outcome.applied[0].contains("Goal"));
    }

    #[test]
    fn unfixable_rules_produce_no_fixes() {
        let source = "# Feature: F\nGoal: g\nMetric: m\n## Story: S\nWhen: w\nThen: t [MUST]";
        let doc = parse_plan_file(source, None);
        let diags = LintEngine::new().lint(&doc, &LintOptions::default());
        // PLAN-005 / PLAN-014 have no providers.
        let lines = source_to_lines(source);
        let fixes = fixes_for_diagnostics(&diags, &lines, &FixRegistry::new());
        assert!(fixes.is_empty());
    }
}
