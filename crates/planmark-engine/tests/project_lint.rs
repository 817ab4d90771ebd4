//! Project-level lint tests: the cross-file rules end to end, plus fixer
//! determinism against a freshly re-parsed document.

use std::fs;

use planmark_engine::fixing::{FixRegistry, apply_fixes, fixes_for_diagnostics, source_to_lines};
use planmark_engine::linting::{LintEngine, LintOptions};
use planmark_engine::models::Severity;
use planmark_engine::parse_plan_file;
use planmark_engine::project::load_project;
use tempfile::TempDir;

fn plan(id: &str, body: &str) -> String {
    format!(
        "---\ntype: feature\nid: {id}\nstatus: draft\n---\n# Feature: {id}\nGoal: g\nMetric: m\n{body}"
    )
}

fn write(dir: &TempDir, name: &str, content: &str) {
    fs::write(dir.path().join(name), content).unwrap();
}

fn lint_dir(dir: &TempDir) -> std::collections::BTreeMap<String, Vec<planmark_engine::Diagnostic>> {
    let project = load_project(dir.path());
    LintEngine::new().lint_project(
        &project.documents,
        &project.sources,
        &LintOptions::default(),
        &project.duplicate_ids,
    )
}

#[test]
fn plan_012_reports_the_cycle_for_every_participant() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.plan", &plan("a", "Needs: [b]"));
    write(&dir, "b.plan", &plan("b", "Needs: [c]"));
    write(&dir, "c.plan", &plan("c", "Needs: [a]"));

    let results = lint_dir(&dir);

    for id in ["a", "b", "c"] {
        let cycles: Vec<_> = results[id]
            .iter()
            .filter(|d| d.rule_id == "PLAN-012")
            .collect();
        assert!(!cycles.is_empty(), "no PLAN-012 for {id}");
        let mentioned = ["a", "b", "c"]
            .iter()
            .filter(|other| cycles[0].message.contains(&format!("{other} ->"))
                || cycles[0].message.ends_with(&format!("-> {other}")))
            .count();
        assert!(
            mentioned >= 2,
            "cycle message should mention at least two ids: {}",
            cycles[0].message
        );
        assert_eq!(cycles[0].severity, Severity::Error);
    }
}

#[test]
fn blocks_edges_also_close_cycles() {
    // a Needs b; b Blocks a is b -> a... which is a -> b -> a reversed:
    // b blocking a means a depends on b, so use Blocks from b to close it.
    let dir = TempDir::new().unwrap();
    write(&dir, "a.plan", &plan("a", "Needs: [b]"));
    write(&dir, "b.plan", &plan("b", "Blocks: [a]"));

    // Edges: a->b (needs), and Blocks: [a] in b gives a->b as well, so no
    // cycle. A real cycle needs b to depend on a:
    let results = lint_dir(&dir);
    assert!(results["a"].iter().all(|d| d.rule_id != "PLAN-012"));

    let dir2 = TempDir::new().unwrap();
    write(&dir2, "a.plan", &plan("a", "Needs: [b]"));
    write(&dir2, "b.plan", &plan("b", "Needs: [external]"));
    write(&dir2, "c.plan", &plan("c", "Blocks: [b]\nNeeds: [a]"));
    // c Blocks b means b depends on c (b->c); c Needs a (c->a); a Needs b
    // (a->b). Cycle: a -> b -> c -> a.
    let results2 = lint_dir(&dir2);
    for id in ["a", "b", "c"] {
        assert!(
            results2[id].iter().any(|d| d.rule_id == "PLAN-012"),
            "expected PLAN-012 for {id}"
        );
    }
}

#[test]
fn plan_009_fires_once_for_a_missing_needs_target() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.plan", &plan("a", "Needs: [ghost-id]"));
    write(&dir, "b.plan", &plan("b", ""));

    let results = lint_dir(&dir);
    let missing: Vec<_> = results["a"]
        .iter()
        .filter(|d| d.rule_id == "PLAN-009")
        .collect();
    assert_eq!(missing.len(), 1);
    assert!(missing[0].message.contains("ghost-id"));
    assert!(results["b"].iter().all(|d| d.rule_id != "PLAN-009"));
}

#[test]
fn plan_009_exempts_external_and_doc_references() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "a.plan",
        &plan("a", "Needs: [external]\nNeeds: [doc:wire-format]"),
    );

    let results = lint_dir(&dir);
    assert!(results["a"].iter().all(|d| d.rule_id != "PLAN-009"));
}

#[test]
fn plan_008_flags_blocking_relationships_into_drafts() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.plan", &plan("a", "Blocks: [b]"));
    write(&dir, "b.plan", &plan("b", ""));

    let results = lint_dir(&dir);
    let infos: Vec<_> = results["a"]
        .iter()
        .filter(|d| d.rule_id == "PLAN-008")
        .collect();
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].severity, Severity::Info);
    assert!(infos[0].message.contains("[b]"));
}

#[test]
fn plan_011_reports_duplicate_ids_with_the_other_files() {
    let dir = TempDir::new().unwrap();
    write(&dir, "one.plan", &plan("feat-dup", ""));
    write(&dir, "two.plan", &plan("feat-dup", ""));

    let results = lint_dir(&dir);
    let dups: Vec<_> = results["feat-dup"]
        .iter()
        .filter(|d| d.rule_id == "PLAN-011")
        .collect();
    assert_eq!(dups.len(), 1);
    assert!(dups[0].message.contains("feat-dup"));
    // The surviving document points at the other file, not itself.
    assert!(dups[0].message.contains("one.plan") || dups[0].message.contains("two.plan"));
}

#[test]
fn fixer_clears_each_fixable_rule_in_one_pass() {
    // One violation per fixable rule id, verified independently.
    let cases = [
        ("PLAN-001", "# Feature: F\nMetric: m\n## Story: S\nWhen: w\nThen: t [MUST]\nEdge: \"e\"\n### Task: T\nAssign: @a"),
        ("PLAN-003", "# Feature: F\nGoal: g\nMetric: m\n## Story: S\nWhen: w\nThen: t [MUST]\nEdge: \"e\"\n### Task: T\nVerify: v"),
        ("PLAN-006", "# Feature: F\nGoal: g\nMetric: m\n## Story: S\nWhen: w\nThen: bare outcome\nEdge: \"e\"\n### Task: T\nAssign: @a"),
        ("PLAN-010", "# Feature: F\nGoal: g\n## Story: S\nWhen: w\nThen: t [MUST]\nEdge: \"e\"\n### Task: T\nAssign: @a"),
    ];

    let engine = LintEngine::new();
    let registry = FixRegistry::new();

    for (rule_id, source) in cases {
        let doc = parse_plan_file(source, None);
        let before: Vec<_> = engine
            .lint(&doc, &LintOptions::default())
            .into_iter()
            .filter(|d| d.rule_id == rule_id)
            .collect();
        assert_eq!(before.len(), 1, "expected one {rule_id} violation");

        let fixes = fixes_for_diagnostics(&before, &source_to_lines(source), &registry);
        assert!(!fixes.is_empty());
        let outcome = apply_fixes(source, &fixes);

        let reparsed = parse_plan_file(&outcome.output, None);
        let after = engine
            .lint(&reparsed, &LintOptions::default())
            .into_iter()
            .filter(|d| d.rule_id == rule_id)
            .count();
        assert_eq!(after, 0, "{rule_id} should be clear after its fix");
    }
}

#[test]
fn edge_then_obligation_fix_lands_on_the_edge_line() {
    let source = "# Feature: F\nGoal: g\nMetric: m\n## Story: S\nWhen: w\nThen: t [MUST]\nEdge: \"boundary\"\n  Then: unhandled\n### Task: T\nAssign: @a";
    let engine = LintEngine::new();
    let doc = parse_plan_file(source, None);
    let diags: Vec<_> = engine
        .lint(&doc, &LintOptions::default())
        .into_iter()
        .filter(|d| d.rule_id == "PLAN-006")
        .collect();
    assert_eq!(diags.len(), 1);

    let fixes = fixes_for_diagnostics(&diags, &source_to_lines(source), &FixRegistry::new());
    let outcome = apply_fixes(source, &fixes);
    assert!(outcome.output.contains("  Then: unhandled [MUST]"));
}
