use std::collections::HashSet;

use crate::models::{Diagnostic, IntentLine, Range, Severity};
use crate::parsing::inline;

use super::super::rule::{LintContext, LintRule};
use super::diag;

fn collect_actors(referenced: &mut HashSet<String>, text: &str) {
    for actor in inline::actor_references(text, 1) {
        referenced.insert(actor.name);
    }
}

/// PLAN-013: a declared Persona actor that nothing else mentions.
///
/// References are gathered from story behaviors, Edge behaviors, task
/// assigns, dependency texts, and uncertainty-block children.
pub struct UnusedPersona;

impl LintRule for UnusedPersona {
    fn id(&self) -> &'static str {
        "PLAN-013"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn description(&self) -> &'static str {
        "Persona actor is declared but never referenced"
    }

    fn check(&self, ctx: &LintContext<'_>) -> Vec<Diagnostic> {
        let Some(feature) = &ctx.document.feature else {
            return Vec::new();
        };

        let personas: Vec<(&str, Range)> = feature
            .intents
            .iter()
            .filter_map(|intent| match intent {
                IntentLine::Persona {
                    actor: Some(actor),
                    range,
                    ..
                } => Some((actor.name.as_str(), *range)),
                _ => None,
            })
            .collect();

        if personas.is_empty() {
            return Vec::new();
        }

        let mut referenced: HashSet<String> = HashSet::new();

        for story in &feature.stories {
            for b in &story.behaviors {
                collect_actors(&mut referenced, b.text());
            }
            for edge in &story.edges {
                for b in &edge.behaviors {
                    collect_actors(&mut referenced, b.text());
                }
            }
            for task in &story.tasks {
                for assign in &task.assigns {
                    if let Some(actor) = &assign.actor {
                        referenced.insert(actor.name.clone());
                    }
                }
                for dep in &task.dependencies {
                    collect_actors(&mut referenced, dep.text());
                }
            }
            for ub in &story.uncertainty_blocks {
                for child in &ub.children {
                    collect_actors(&mut referenced, child.text());
                }
            }
            for dep in &story.dependencies {
                collect_actors(&mut referenced, dep.text());
            }
        }

        for dep in &feature.dependencies {
            collect_actors(&mut referenced, dep.text());
        }
        for ub in &feature.uncertainty_blocks {
            for child in &ub.children {
                collect_actors(&mut referenced, child.text());
            }
        }

        personas
            .into_iter()
            .filter(|(name, _)| !referenced.contains(*name))
            .map(|(name, range)| {
                diag(
                    self,
                    format!("Persona @{name} is declared but never referenced in this document"),
                    range,
                    ctx,
                )
            })
            .collect()
    }
}
