//! "Clean" JSON projection: the hierarchy without ranges or raw markers.

use serde::Serialize;

use crate::models::{
    BehaviorLine, DependencyLine, EdgeBlock, FeatureBlock, PlanDocument, Reference, StoryBlock,
    TaskBlock,
};

use super::ConvertError;

#[derive(Serialize)]
struct CleanDocument<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a crate::models::Frontmatter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    feature: Option<CleanFeature>,
}

#[derive(Serialize)]
struct CleanFeature {
    title: String,
    goals: Vec<String>,
    personas: Vec<CleanPersona>,
    metrics: Vec<String>,
    dependencies: Vec<CleanDependency>,
    stories: Vec<CleanStory>,
}

#[derive(Serialize)]
struct CleanPersona {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    actor: Option<String>,
}

#[derive(Serialize)]
struct CleanStory {
    title: String,
    goals: Vec<String>,
    behaviors: Vec<CleanBehavior>,
    edges: Vec<CleanEdge>,
    tasks: Vec<CleanTask>,
}

#[derive(Serialize)]
struct CleanBehavior {
    kind: &'static str,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    obligation: Option<String>,
}

#[derive(Serialize)]
struct CleanEdge {
    description: String,
    behaviors: Vec<CleanBehavior>,
}

#[derive(Serialize)]
struct CleanTask {
    title: String,
    assignees: Vec<String>,
    verifications: Vec<String>,
    dependencies: Vec<CleanDependency>,
}

#[derive(Serialize)]
struct CleanDependency {
    kind: &'static str,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<String>,
}

fn map_dependency(dep: &DependencyLine) -> CleanDependency {
    let target = match dep.reference() {
        Some(Reference::Plan { id, fragment, .. }) => Some(match fragment {
            Some(fragment) => format!("{id}#{fragment}"),
            None => id.clone(),
        }),
        _ => None,
    };
    CleanDependency {
        kind: if dep.is_needs() { "needs" } else { "blocks" },
        text: dep.text().to_string(),
        target,
    }
}

fn map_behavior(b: &BehaviorLine) -> CleanBehavior {
    let (kind, obligation) = match b {
        BehaviorLine::Given { .. } => ("given", None),
        BehaviorLine::When { .. } => ("when", None),
        BehaviorLine::Then { obligation, .. } => {
            ("then", obligation.as_ref().map(|o| o.level.to_string()))
        }
    };
    CleanBehavior {
        kind,
        text: b.text().to_string(),
        obligation,
    }
}

fn map_edge(edge: &EdgeBlock) -> CleanEdge {
    CleanEdge {
        description: edge.description.clone(),
        behaviors: edge.behaviors.iter().map(map_behavior).collect(),
    }
}

fn map_task(task: &TaskBlock) -> CleanTask {
    CleanTask {
        title: task.title.clone(),
        assignees: task
            .assigns
            .iter()
            .map(|a| match &a.actor {
                Some(actor) => actor.name.clone(),
                None => a.text.clone(),
            })
            .collect(),
        verifications: task.verifies.iter().map(|v| v.text.clone()).collect(),
        dependencies: task.dependencies.iter().map(map_dependency).collect(),
    }
}

fn map_story(story: &StoryBlock) -> CleanStory {
    CleanStory {
        title: story.title.clone(),
        goals: story
            .intents
            .iter()
            .filter(|i| i.is_goal())
            .map(|i| i.text().to_string())
            .collect(),
        behaviors: story.behaviors.iter().map(map_behavior).collect(),
        edges: story.edges.iter().map(map_edge).collect(),
        tasks: story.tasks.iter().map(map_task).collect(),
    }
}

fn map_feature(feature: &FeatureBlock) -> CleanFeature {
    CleanFeature {
        title: feature.title.clone(),
        goals: feature
            .intents
            .iter()
            .filter(|i| i.is_goal())
            .map(|i| i.text().to_string())
            .collect(),
        personas: feature
            .intents
            .iter()
            .filter_map(|i| match i {
                crate::models::IntentLine::Persona { text, actor, .. } => Some(CleanPersona {
                    text: text.clone(),
                    actor: actor.as_ref().map(|a| a.name.clone()),
                }),
                _ => None,
            })
            .collect(),
        metrics: feature
            .intents
            .iter()
            .filter(|i| i.is_metric())
            .map(|i| i.text().to_string())
            .collect(),
        dependencies: feature.dependencies.iter().map(map_dependency).collect(),
        stories: feature.stories.iter().map(map_story).collect(),
    }
}

pub(super) fn convert(doc: &PlanDocument) -> Result<String, ConvertError> {
    let clean = CleanDocument {
        metadata: doc.frontmatter.as_ref(),
        feature: doc.feature.as_ref().map(map_feature),
    };
    Ok(serde_json::to_string_pretty(&clean)?)
}
