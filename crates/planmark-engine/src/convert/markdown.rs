//! Plain-Markdown projection: metadata table, headings, and bold keyword
//! bullets, with inline uncertainty markers and obligation tags stripped.

use crate::models::{BehaviorLine, DependencyLine, PlanDocument};
use crate::parsing::inline::{strip_obligation, strip_uncertainty};

fn clean(text: &str) -> String {
    strip_obligation(&strip_uncertainty(text))
}

fn behavior_label(b: &BehaviorLine) -> &'static str {
    match b {
        BehaviorLine::Given { .. } => "Given",
        BehaviorLine::When { .. } => "When",
        BehaviorLine::Then { .. } => "Then",
    }
}

fn dependency_label(dep: &DependencyLine) -> &'static str {
    if dep.is_needs() { "Needs" } else { "Blocks" }
}

fn push_behavior(lines: &mut Vec<String>, b: &BehaviorLine) {
    lines.push(format!("- **{}**: {}", behavior_label(b), clean(b.text())));
}

pub(super) fn convert(doc: &PlanDocument) -> String {
    let mut lines: Vec<String> = Vec::new();

    if let Some(fm) = &doc.frontmatter {
        lines.push("| Field | Value |".to_string());
        lines.push("|-------|-------|".to_string());
        lines.push(format!("| ID | {} |", fm.id));
        lines.push(format!("| Status | {} |", fm.status));
        if let Some(version) = &fm.version {
            lines.push(format!("| Version | {version} |"));
        }
        if let Some(owner) = &fm.owner {
            lines.push(format!("| Owner | {owner} |"));
        }
        if let Some(priority) = &fm.priority {
            lines.push(format!("| Priority | {priority} |"));
        }
        if let Some(tags) = &fm.tags {
            lines.push(format!("| Tags | {} |", tags.join(", ")));
        }
        lines.push(String::new());
    }

    let Some(feature) = &doc.feature else {
        return lines.join("\n");
    };

    lines.push(format!("# {}", feature.title));
    lines.push(String::new());

    for intent in &feature.intents {
        use crate::models::IntentLine;
        match intent {
            IntentLine::Goal { text, .. } => lines.push(format!("**Goal**: {}", clean(text))),
            IntentLine::Persona { text, .. } => {
                lines.push(format!("**Persona**: {}", clean(text)))
            }
            IntentLine::Metric { text, .. } => lines.push(format!("**Metric**: {}", clean(text))),
        }
    }

    if !feature.dependencies.is_empty() {
        lines.push(String::new());
        for dep in &feature.dependencies {
            lines.push(format!(
                "- **{}**: {}",
                dependency_label(dep),
                clean(dep.text())
            ));
        }
    }

    for story in &feature.stories {
        lines.push(String::new());
        lines.push(format!("## {}", story.title));
        lines.push(String::new());

        for intent in &story.intents {
            if intent.is_goal() {
                lines.push(format!("**Goal**: {}", clean(intent.text())));
            }
        }

        if !story.behaviors.is_empty() {
            lines.push(String::new());
            for b in &story.behaviors {
                push_behavior(&mut lines, b);
            }
        }

        for edge in &story.edges {
            lines.push(String::new());
            lines.push(format!("### Edge: {}", edge.description));
            lines.push(String::new());
            for b in &edge.behaviors {
                push_behavior(&mut lines, b);
            }
        }

        for task in &story.tasks {
            lines.push(String::new());
            lines.push(format!("### {}", task.title));
            lines.push(String::new());
            if !task.assigns.is_empty() {
                let assignees: Vec<String> = task
                    .assigns
                    .iter()
                    .map(|a| match &a.actor {
                        Some(actor) => format!("@{}", actor.name),
                        None => clean(&a.text),
                    })
                    .collect();
                lines.push(format!("**Assignee**: {}", assignees.join(", ")));
            }
            if !task.verifies.is_empty() {
                lines.push(String::new());
                lines.push("**Verification**:".to_string());
                for v in &task.verifies {
                    lines.push(format!("- {}", clean(&v.text)));
                }
            }
            if !task.dependencies.is_empty() {
                lines.push(String::new());
                for dep in &task.dependencies {
                    lines.push(format!(
                        "- **{}**: {}",
                        dependency_label(dep),
                        clean(dep.text())
                    ));
                }
            }
        }
    }

    lines.push(String::new());
    lines.join("\n")
}
