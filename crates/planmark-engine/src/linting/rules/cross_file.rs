//! Cross-file rules. These only run when the lint context carries the full
//! project document set.

use std::collections::HashSet;

use crate::models::{
    Diagnostic, FeatureBlock, DependencyLine, Location, Range, Severity, Status,
};

use super::super::graph::{build_dependency_graph, detect_cycles};
use super::super::rule::{LintContext, LintRule};
use super::diag;

fn for_each_dependency<'a>(feature: &'a FeatureBlock, mut f: impl FnMut(&'a DependencyLine)) {
    for dep in &feature.dependencies {
        f(dep);
    }
    for story in &feature.stories {
        for dep in &story.dependencies {
            f(dep);
        }
        for task in &story.tasks {
            for dep in &task.dependencies {
                f(dep);
            }
        }
    }
}

fn point_range() -> Range {
    Range::new(Location::new(1, 1), Location::new(1, 1))
}

/// PLAN-008: a `Blocks:` target that is still in draft.
pub struct BlocksDraft;

impl LintRule for BlocksDraft {
    fn id(&self) -> &'static str {
        "PLAN-008"
    }

    fn severity(&self) -> Severity {
        Severity::Info
    }

    fn description(&self) -> &'static str {
        "Blocks: target document is still draft"
    }

    fn cross_file(&self) -> bool {
        true
    }

    fn check(&self, ctx: &LintContext<'_>) -> Vec<Diagnostic> {
        let (Some(project_files), Some(feature)) = (ctx.project_files, &ctx.document.feature)
        else {
            return Vec::new();
        };

        let mut diagnostics = Vec::new();
        for_each_dependency(feature, |dep| {
            if dep.is_needs() {
                return;
            }
            let Some(target_id) = dep.reference().and_then(|r| r.plan_id()) else {
                return;
            };
            let target_status = project_files
                .get(target_id)
                .and_then(|doc| doc.frontmatter.as_ref())
                .map(|fm| fm.status);
            if target_status == Some(Status::Draft) {
                diagnostics.push(diag(
                    self,
                    format!("Blocks: target [{target_id}] is still draft"),
                    dep.range(),
                    ctx,
                ));
            }
        });
        diagnostics
    }
}

/// PLAN-009: a `Needs:` plan reference that resolves to nothing.
/// External and doc references are exempt.
pub struct NeedsExists;

impl LintRule for NeedsExists {
    fn id(&self) -> &'static str {
        "PLAN-009"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn description(&self) -> &'static str {
        "Needs: reference does not exist in the project"
    }

    fn cross_file(&self) -> bool {
        true
    }

    fn check(&self, ctx: &LintContext<'_>) -> Vec<Diagnostic> {
        let (Some(project_files), Some(feature)) = (ctx.project_files, &ctx.document.feature)
        else {
            return Vec::new();
        };

        let mut diagnostics = Vec::new();
        for_each_dependency(feature, |dep| {
            if !dep.is_needs() {
                return;
            }
            let Some(target_id) = dep.reference().and_then(|r| r.plan_id()) else {
                return;
            };
            if !project_files.contains_key(target_id) {
                diagnostics.push(diag(
                    self,
                    format!("Needs: reference [{target_id}] does not exist in the project"),
                    dep.range(),
                    ctx,
                ));
            }
        });
        diagnostics
    }
}

/// PLAN-011: the same frontmatter id used by more than one file.
/// Requires the externally-supplied duplicate map from the project loader.
pub struct DuplicateId;

impl LintRule for DuplicateId {
    fn id(&self) -> &'static str {
        "PLAN-011"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn description(&self) -> &'static str {
        "Plan id appears in more than one file"
    }

    fn cross_file(&self) -> bool {
        true
    }

    fn check(&self, ctx: &LintContext<'_>) -> Vec<Diagnostic> {
        let Some(duplicate_ids) = ctx.duplicate_ids else {
            return Vec::new();
        };
        let Some(id) = ctx.document.frontmatter.as_ref().map(|fm| fm.id.as_str()) else {
            return Vec::new();
        };
        let Some(files) = duplicate_ids.get(id) else {
            return Vec::new();
        };
        if files.len() <= 1 {
            return Vec::new();
        }

        let own = ctx.document.file_path.as_deref();
        let others: Vec<&str> = files
            .iter()
            .map(String::as_str)
            .filter(|f| Some(*f) != own)
            .collect();
        if others.is_empty() {
            return Vec::new();
        }

        vec![diag(
            self,
            format!(
                "Plan id \"{id}\" is duplicated in other files: {}",
                others.join(", ")
            ),
            point_range(),
            ctx,
        )]
    }
}

/// PLAN-012: this document participates in a dependency cycle.
/// Cycles are deduplicated by their string path before reporting.
pub struct CircularDependency;

impl LintRule for CircularDependency {
    fn id(&self) -> &'static str {
        "PLAN-012"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn description(&self) -> &'static str {
        "Circular dependency detected in the project"
    }

    fn cross_file(&self) -> bool {
        true
    }

    fn check(&self, ctx: &LintContext<'_>) -> Vec<Diagnostic> {
        let Some(project_files) = ctx.project_files else {
            return Vec::new();
        };
        let Some(doc_id) = ctx.document.frontmatter.as_ref().map(|fm| fm.id.as_str()) else {
            return Vec::new();
        };

        let graph = build_dependency_graph(project_files);
        let cycles = detect_cycles(&graph, doc_id);
        if cycles.is_empty() {
            return Vec::new();
        }

        let range = ctx
            .document
            .feature
            .as_ref()
            .map(|f| f.range)
            .unwrap_or_else(point_range);

        let mut seen = HashSet::new();
        cycles
            .into_iter()
            .filter_map(|cycle| {
                let path = cycle.join(" -> ");
                seen.insert(path.clone()).then_some(path)
            })
            .map(|path| {
                diag(
                    self,
                    format!("Circular dependency detected: {path}"),
                    range,
                    ctx,
                )
            })
            .collect()
    }
}
