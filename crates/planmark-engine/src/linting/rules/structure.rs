//! Structural completeness rules: required intents, behaviors, assignments,
//! edge cases, and tasks.

use crate::models::{BehaviorLine, Diagnostic, Severity, StoryBlock, UncertaintyChild};

use super::super::rule::{LintContext, LintRule};
use super::diag;

/// PLAN-001: a Feature must state at least one Goal.
pub struct FeatureGoal;

impl LintRule for FeatureGoal {
    fn id(&self) -> &'static str {
        "PLAN-001"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn description(&self) -> &'static str {
        "Feature has no Goal: intent"
    }

    fn check(&self, ctx: &LintContext<'_>) -> Vec<Diagnostic> {
        let Some(feature) = &ctx.document.feature else {
            return Vec::new();
        };
        if feature.intents.iter().any(|i| i.is_goal()) {
            return Vec::new();
        }
        vec![diag(
            self,
            format!("Feature \"{}\" has no Goal: intent", feature.title),
            feature.range,
            ctx,
        )]
    }
}

/// PLAN-002: a Story must describe a When and a Then, counting behaviors
/// nested inside its uncertainty blocks. Each missing kind is its own
/// diagnostic.
pub struct StoryBehavior;

fn block_behaviors(story: &StoryBlock) -> impl Iterator<Item = &BehaviorLine> {
    story
        .uncertainty_blocks
        .iter()
        .flat_map(|ub| ub.children.iter())
        .filter_map(UncertaintyChild::as_behavior)
}

impl LintRule for StoryBehavior {
    fn id(&self) -> &'static str {
        "PLAN-002"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn description(&self) -> &'static str {
        "Story has no When: or Then: behavior"
    }

    fn check(&self, ctx: &LintContext<'_>) -> Vec<Diagnostic> {
        let Some(feature) = &ctx.document.feature else {
            return Vec::new();
        };

        let mut diagnostics = Vec::new();
        for story in &feature.stories {
            let has_when = story.behaviors.iter().any(BehaviorLine::is_when)
                || block_behaviors(story).any(BehaviorLine::is_when);
            let has_then = story.behaviors.iter().any(BehaviorLine::is_then)
                || block_behaviors(story).any(BehaviorLine::is_then);

            if !has_when {
                diagnostics.push(diag(
                    self,
                    format!("Story \"{}\" has no When: behavior", story.title),
                    story.range,
                    ctx,
                ));
            }
            if !has_then {
                diagnostics.push(diag(
                    self,
                    format!("Story \"{}\" has no Then: behavior", story.title),
                    story.range,
                    ctx,
                ));
            }
        }
        diagnostics
    }
}

/// PLAN-003: a Task must have an assignee.
pub struct TaskAssign;

impl LintRule for TaskAssign {
    fn id(&self) -> &'static str {
        "PLAN-003"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn description(&self) -> &'static str {
        "Task has no Assign: line"
    }

    fn check(&self, ctx: &LintContext<'_>) -> Vec<Diagnostic> {
        let Some(feature) = &ctx.document.feature else {
            return Vec::new();
        };

        feature
            .stories
            .iter()
            .flat_map(|story| story.tasks.iter())
            .filter(|task| task.assigns.is_empty())
            .map(|task| {
                diag(
                    self,
                    format!("Task \"{}\" has no Assign: line", task.title),
                    task.range,
                    ctx,
                )
            })
            .collect()
    }
}

/// PLAN-005: a Story without Edge cases only covers the happy path.
pub struct StoryEdge;

impl LintRule for StoryEdge {
    fn id(&self) -> &'static str {
        "PLAN-005"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn description(&self) -> &'static str {
        "Story defines no Edge cases"
    }

    fn check(&self, ctx: &LintContext<'_>) -> Vec<Diagnostic> {
        let Some(feature) = &ctx.document.feature else {
            return Vec::new();
        };

        feature
            .stories
            .iter()
            .filter(|story| story.edges.is_empty())
            .map(|story| {
                diag(
                    self,
                    format!("Story \"{}\" defines no Edge cases", story.title),
                    story.range,
                    ctx,
                )
            })
            .collect()
    }
}

/// PLAN-010: a Feature should define a measurable Metric.
pub struct FeatureMetric;

impl LintRule for FeatureMetric {
    fn id(&self) -> &'static str {
        "PLAN-010"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn description(&self) -> &'static str {
        "Feature has no Metric: intent"
    }

    fn check(&self, ctx: &LintContext<'_>) -> Vec<Diagnostic> {
        let Some(feature) = &ctx.document.feature else {
            return Vec::new();
        };
        if feature.intents.iter().any(|i| i.is_metric()) {
            return Vec::new();
        }
        vec![diag(
            self,
            format!("Feature \"{}\" has no Metric: intent", feature.title),
            feature.range,
            ctx,
        )]
    }
}

/// PLAN-014: a Story without Tasks has no implementation plan.
pub struct StoryTask;

impl LintRule for StoryTask {
    fn id(&self) -> &'static str {
        "PLAN-014"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn description(&self) -> &'static str {
        "Story has no Tasks"
    }

    fn check(&self, ctx: &LintContext<'_>) -> Vec<Diagnostic> {
        let Some(feature) = &ctx.document.feature else {
            return Vec::new();
        };

        feature
            .stories
            .iter()
            .filter(|story| story.tasks.is_empty())
            .map(|story| {
                diag(
                    self,
                    format!("Story \"{}\" has no Tasks", story.title),
                    story.range,
                    ctx,
                )
            })
            .collect()
    }
}
