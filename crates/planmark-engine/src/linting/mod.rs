//! Rule-based lint engine with directive suppression and fault isolation.

pub mod graph;
pub mod rule;
pub mod rules;

pub use rule::{LintContext, LintRule};

use std::collections::{BTreeMap, HashSet};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Diagnostic, PlanDocument};
use crate::parsing::scanner::split_lines;

#[derive(Debug, Clone, Default)]
pub struct LintOptions {
    /// Rule ids skipped entirely for this run.
    pub disabled_rules: Vec<String>,
    /// Raw source text, needed to honor `@lint-disable` directives.
    pub source: Option<String>,
}

static LINT_DISABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--\s*@lint-disable\s+([\w-]+)\s*-->").unwrap());
static LINT_ENABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--\s*@lint-enable\s+([\w-]+)\s*-->").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
struct DisableRange {
    rule_id: String,
    start_line: usize,
    /// `None` when the disable is never re-enabled: extends to end of file.
    end_line: Option<usize>,
}

/// Parse `<!-- @lint-disable RULE -->` / `<!-- @lint-enable RULE -->`
/// markers (`all` as a wildcard id) into line ranges.
fn parse_directives(source: &str) -> Vec<DisableRange> {
    let mut ranges = Vec::new();
    let mut open_disables: BTreeMap<String, usize> = BTreeMap::new();

    for (i, line) in split_lines(source).iter().enumerate() {
        let line_num = i + 1;
        if let Some(caps) = LINT_DISABLE.captures(line) {
            open_disables.insert(caps[1].to_string(), line_num);
            continue;
        }
        if let Some(caps) = LINT_ENABLE.captures(line)
            && let Some(start_line) = open_disables.remove(&caps[1])
        {
            ranges.push(DisableRange {
                rule_id: caps[1].to_string(),
                start_line,
                end_line: Some(line_num),
            });
        }
    }

    for (rule_id, start_line) in open_disables {
        ranges.push(DisableRange {
            rule_id,
            start_line,
            end_line: None,
        });
    }

    ranges
}

fn is_suppressed(diagnostic: &Diagnostic, directives: &[DisableRange]) -> bool {
    directives.iter().any(|dir| {
        (dir.rule_id == diagnostic.rule_id || dir.rule_id == "all")
            && diagnostic.range.start.line >= dir.start_line
            && dir.end_line.is_none_or(|end| diagnostic.range.start.line <= end)
    })
}

/// The lint engine: a fixed rule registry executed against one document or
/// a project snapshot.
///
/// The registry is populated at construction and immutable thereafter;
/// inject a custom rule set with [`LintEngine::with_rules`] for testing.
pub struct LintEngine {
    rules: Vec<Box<dyn LintRule>>,
}

impl Default for LintEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LintEngine {
    pub fn new() -> Self {
        Self {
            rules: rules::all_rules(),
        }
    }

    pub fn with_rules(rules: Vec<Box<dyn LintRule>>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Box<dyn LintRule>] {
        &self.rules
    }

    /// Lint a single document. Cross-file rules are skipped.
    pub fn lint(&self, document: &PlanDocument, options: &LintOptions) -> Vec<Diagnostic> {
        let ctx = LintContext {
            document,
            project_files: None,
            duplicate_ids: None,
        };
        self.run_rules(&ctx, options)
    }

    /// Lint every document in a project snapshot, cross-file rules included.
    /// Returns a per-document-id diagnostic map.
    pub fn lint_project(
        &self,
        documents: &BTreeMap<String, PlanDocument>,
        sources: &BTreeMap<String, String>,
        options: &LintOptions,
        duplicate_ids: &BTreeMap<String, Vec<String>>,
    ) -> BTreeMap<String, Vec<Diagnostic>> {
        let mut results = BTreeMap::new();

        for (id, document) in documents {
            let ctx = LintContext {
                document,
                project_files: Some(documents),
                duplicate_ids: Some(duplicate_ids),
            };
            let file_options = LintOptions {
                disabled_rules: options.disabled_rules.clone(),
                source: sources.get(id).cloned(),
            };
            results.insert(id.clone(), self.run_rules(&ctx, &file_options));
        }

        results
    }

    fn run_rules(&self, ctx: &LintContext<'_>, options: &LintOptions) -> Vec<Diagnostic> {
        let disabled: HashSet<&str> = options.disabled_rules.iter().map(String::as_str).collect();
        let directives = options
            .source
            .as_deref()
            .map(parse_directives)
            .unwrap_or_default();

        let mut diagnostics = Vec::new();

        for rule in &self.rules {
            if disabled.contains(rule.id()) {
                continue;
            }
            if rule.cross_file() && ctx.project_files.is_none() {
                continue;
            }

            // A faulty rule must not abort the whole pass: its output for
            // this run is simply empty.
            match catch_unwind(AssertUnwindSafe(|| rule.check(ctx))) {
                Ok(results) => {
                    diagnostics.extend(
                        results
                            .into_iter()
                            .filter(|d| !is_suppressed(d, &directives)),
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        rule = rule.id(),
                        "lint rule panicked; skipping its output for this run"
                    );
                }
            }
        }

        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, Range, Severity};
    use crate::parsing::parse_plan_file;

    fn lint_source(source: &str) -> Vec<Diagnostic> {
        let doc = parse_plan_file(source, None);
        LintEngine::new().lint(
            &doc,
            &LintOptions {
                disabled_rules: Vec::new(),
                source: Some(source.to_string()),
            },
        )
    }

    fn has_rule(diags: &[Diagnostic], id: &str) -> bool {
        diags.iter().any(|d| d.rule_id == id)
    }

    const CLEAN: &str = "\
---
type: feature
id: feat-clean
status: draft
---
# Feature: Clean
Goal: ship
Metric: 100%

## Story: Works
When: user acts
Then: outcome [MUST]
Edge: \"empty input\"
  Then: reject [MUST]

### Task: Build
Assign: @dev
";

    #[test]
    fn a_complete_document_is_clean() {
        assert!(lint_source(CLEAN).is_empty());
    }

    #[test]
    fn plan_001_fires_once_and_names_the_feature() {
        let diags = lint_source("# Feature: Missing Goal\nMetric: m");
        let hits: Vec<_> = diags.iter().filter(|d| d.rule_id == "PLAN-001").collect();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].message.contains("Missing Goal"));
        assert_eq!(hits[0].severity, Severity::Error);
    }

    #[test]
    fn plan_001_clears_once_a_goal_exists() {
        let diags = lint_source("# Feature: F\nGoal: g\nMetric: m");
        assert!(!has_rule(&diags, "PLAN-001"));
    }

    #[test]
    fn plan_002_reports_when_and_then_separately() {
        let diags = lint_source("# Feature: F\nGoal: g\nMetric: m\n## Story: Bare");
        let hits: Vec<_> = diags.iter().filter(|d| d.rule_id == "PLAN-002").collect();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].message.contains("When:"));
        assert!(hits[1].message.contains("Then:"));
    }

    #[test]
    fn plan_002_accepts_behaviors_inside_uncertainty_blocks() {
        let diags = lint_source(
            "# Feature: F\nGoal: g\nMetric: m\n## Story: S\n?pending \"flow\"\nWhen: w\nThen: t [MUST]\n?end",
        );
        assert!(!has_rule(&diags, "PLAN-002"));
    }

    #[test]
    fn plan_003_flags_unassigned_tasks() {
        let diags = lint_source(
            "# Feature: F\nGoal: g\nMetric: m\n## Story: S\nWhen: w\nThen: t [MUST]\n### Task: Orphan\nVerify: v",
        );
        let hits: Vec<_> = diags.iter().filter(|d| d.rule_id == "PLAN-003").collect();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].message.contains("Orphan"));
    }

    #[test]
    fn plan_004_counts_pending_markers_when_ready() {
        let diags = lint_source(
            "---\ntype: feature\nid: f\nstatus: ready\n---\n# Feature: F\nGoal: g ?pending(\"who\")\nMetric: m",
        );
        let hits: Vec<_> = diags.iter().filter(|d| d.rule_id == "PLAN-004").collect();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].message.contains("ready"));
    }

    #[test]
    fn plan_004_is_silent_for_draft_documents() {
        let diags = lint_source(
            "---\ntype: feature\nid: f\nstatus: draft\n---\n# Feature: F\nGoal: g ?pending(\"who\")\nMetric: m",
        );
        assert!(!has_rule(&diags, "PLAN-004"));
    }

    #[test]
    fn plan_005_and_014_flag_bare_stories() {
        let diags = lint_source("# Feature: F\nGoal: g\nMetric: m\n## Story: S\nWhen: w\nThen: t [MUST]");
        assert!(has_rule(&diags, "PLAN-005"));
        assert!(has_rule(&diags, "PLAN-014"));
    }

    #[test]
    fn plan_006_fires_for_then_without_obligation_including_edges() {
        let diags = lint_source(
            "# Feature: F\nGoal: g\nMetric: m\n## Story: S\nWhen: w\nThen: bare\nEdge: \"e\"\n  Then: also bare",
        );
        let hits: Vec<_> = diags.iter().filter(|d| d.rule_id == "PLAN-006").collect();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn plan_010_requires_a_metric() {
        let diags = lint_source("# Feature: F\nGoal: g");
        assert!(has_rule(&diags, "PLAN-010"));
    }

    #[test]
    fn plan_013_flags_unreferenced_personas() {
        let diags = lint_source(
            "# Feature: F\nGoal: g\nMetric: m\nPersona: @ghost\n## Story: S\nWhen: w\nThen: t [MUST]",
        );
        let hits: Vec<_> = diags.iter().filter(|d| d.rule_id == "PLAN-013").collect();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].message.contains("@ghost"));
    }

    #[test]
    fn plan_013_accepts_personas_referenced_in_assigns() {
        let diags = lint_source(
            "# Feature: F\nGoal: g\nMetric: m\nPersona: @dev\n## Story: S\nWhen: w\nThen: t [MUST]\n### Task: T\nAssign: @dev",
        );
        assert!(!has_rule(&diags, "PLAN-013"));
    }

    #[test]
    fn cross_file_rules_are_skipped_without_project_context() {
        let diags = lint_source("---\ntype: feature\nid: a\nstatus: draft\n---\n# Feature: A\nGoal: g\nMetric: m\nNeeds: [nonexistent]");
        assert!(!has_rule(&diags, "PLAN-009"));
        assert!(!has_rule(&diags, "PLAN-012"));
    }

    #[test]
    fn disabled_rules_are_skipped() {
        let doc = parse_plan_file("# Feature: F\nMetric: m", None);
        let diags = LintEngine::new().lint(
            &doc,
            &LintOptions {
                disabled_rules: vec!["PLAN-001".to_string()],
                source: None,
            },
        );
        assert!(!has_rule(&diags, "PLAN-001"));
    }

    #[test]
    fn directives_suppress_inside_the_range_only() {
        let source = "\
# Feature: F
Goal: g
Metric: m
## Story: S
When: w
<!-- @lint-disable PLAN-006 -->
Then: suppressed
<!-- @lint-enable PLAN-006 -->
Then: reported
### Task: T
Assign: @dev
Edge: ignored";
        let diags = lint_source(source);
        let hits: Vec<_> = diags.iter().filter(|d| d.rule_id == "PLAN-006").collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].range.start.line, 9);
    }

    #[test]
    fn unclosed_disable_extends_to_end_of_file() {
        let source = "\
# Feature: F
Goal: g
Metric: m
<!-- @lint-disable all -->
## Story: S";
        assert!(lint_source(source).is_empty());
    }

    #[test]
    fn directive_parsing_shapes() {
        let ranges = parse_directives(
            "<!-- @lint-disable PLAN-005 -->\nx\n<!-- @lint-enable PLAN-005 -->\n<!-- @lint-disable all -->",
        );
        assert_eq!(ranges.len(), 2);
        assert_eq!(
            ranges[0],
            DisableRange {
                rule_id: "PLAN-005".to_string(),
                start_line: 1,
                end_line: Some(3),
            }
        );
        assert_eq!(ranges[1].end_line, None);
    }

    #[test]
    fn a_panicking_rule_does_not_abort_the_pass() {
        struct Panicker;
        impl LintRule for Panicker {
            fn id(&self) -> &'static str {
                "TEST-BOOM"
            }
            fn severity(&self) -> Severity {
                Severity::Error
            }
            fn description(&self) -> &'static str {
                "always panics"
            }
            fn check(&self, _ctx: &LintContext<'_>) -> Vec<Diagnostic> {
                panic!("boom");
            }
        }
        struct AlwaysOne;
        impl LintRule for AlwaysOne {
            fn id(&self) -> &'static str {
                "TEST-ONE"
            }
            fn severity(&self) -> Severity {
                Severity::Info
            }
            fn description(&self) -> &'static str {
                "always reports"
            }
            fn check(&self, ctx: &LintContext<'_>) -> Vec<Diagnostic> {
                vec![Diagnostic {
                    rule_id: "TEST-ONE".to_string(),
                    severity: Severity::Info,
                    message: "present".to_string(),
                    range: Range::new(Location::new(1, 1), Location::new(1, 1)),
                    file_path: ctx.document.file_path.clone(),
                }]
            }
        }

        let engine = LintEngine::with_rules(vec![Box::new(Panicker), Box::new(AlwaysOne)]);
        let doc = parse_plan_file("# Feature: F", None);
        let diags = engine.lint(&doc, &LintOptions::default());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].rule_id, "TEST-ONE");
    }
}
