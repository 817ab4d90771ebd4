//! Dependency graph construction and cycle detection over Needs/Blocks
//! edges.
//!
//! Edge direction is "depends on": `Needs: [B]` in document A yields the
//! edge A->B. `Blocks: [B]` in A yields B->A; A blocking B means B cannot proceed
//! until A does.

use std::collections::{BTreeMap, HashSet};

use crate::models::{DependencyLine, PlanDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Needs,
    Blocks,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    pub source_id: String,
    pub target_id: String,
    pub kind: EdgeKind,
}

/// Collect the directed dependency edges contributed by one document.
///
/// Only plan references count; external/doc references and self references
/// (fragment links back into the same document) are skipped.
pub fn collect_all_dependencies(doc_id: &str, doc: &PlanDocument) -> Vec<DependencyEdge> {
    let mut edges = Vec::new();

    let mut process = |deps: &[DependencyLine]| {
        for dep in deps {
            let Some(target_id) = dep.reference().and_then(|r| r.plan_id()) else {
                continue;
            };
            if target_id == doc_id {
                continue;
            }
            if dep.is_needs() {
                edges.push(DependencyEdge {
                    source_id: doc_id.to_string(),
                    target_id: target_id.to_string(),
                    kind: EdgeKind::Needs,
                });
            } else {
                edges.push(DependencyEdge {
                    source_id: target_id.to_string(),
                    target_id: doc_id.to_string(),
                    kind: EdgeKind::Blocks,
                });
            }
        }
    };

    let Some(feature) = &doc.feature else {
        return edges;
    };

    process(&feature.dependencies);
    for story in &feature.stories {
        process(&story.dependencies);
        for task in &story.tasks {
            process(&task.dependencies);
        }
    }

    edges
}

/// Union all documents' edges into an adjacency list: source to targets.
pub fn build_dependency_graph(
    documents: &BTreeMap<String, PlanDocument>,
) -> BTreeMap<String, Vec<String>> {
    let mut graph: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (id, doc) in documents {
        for edge in collect_all_dependencies(id, doc) {
            graph.entry(edge.source_id).or_default().push(edge.target_id);
        }
    }

    graph
}

/// Detect cycles reachable from `start_id` that actually contain it.
///
/// Path-tracked DFS: a node is marked visited only after its subtree is
/// fully explored; global visited-on-entry would miss cycles revisited via
/// a different path. Cycles found during traversal that do not touch
/// `start_id` are discarded.
pub fn detect_cycles(graph: &BTreeMap<String, Vec<String>>, start_id: &str) -> Vec<Vec<String>> {
    let mut cycles = Vec::new();
    let mut visited = HashSet::new();
    let mut path = Vec::new();
    dfs(graph, start_id, start_id, &mut visited, &mut path, &mut cycles);
    cycles
}

fn dfs(
    graph: &BTreeMap<String, Vec<String>>,
    node: &str,
    start_id: &str,
    visited: &mut HashSet<String>,
    path: &mut Vec<String>,
    cycles: &mut Vec<Vec<String>>,
) {
    if let Some(first) = path.iter().position(|n| n == node) {
        let mut cycle: Vec<String> = path[first..].to_vec();
        cycle.push(node.to_string());
        if cycle.iter().any(|n| n == start_id) {
            cycles.push(cycle);
        }
        return;
    }

    if visited.contains(node) {
        return;
    }

    path.push(node.to_string());
    if let Some(neighbors) = graph.get(node) {
        for next in neighbors {
            dfs(graph, next, start_id, visited, path, cycles);
        }
    }
    path.pop();
    visited.insert(node.to_string());
}
