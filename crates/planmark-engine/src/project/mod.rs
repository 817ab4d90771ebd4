//! Project loading: recursive `.plan` discovery, parsing, duplicate-id
//! detection, and cross-file reference resolution.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use relative_path::RelativePathBuf;

use crate::models::{DependencyLine, PlanDocument, PlanFile};
use crate::parsing::parse_plan_file;

/// Directory names never descended into.
const SKIPPED_DIRS: [&str; 3] = [".git", "node_modules", "target"];

#[derive(Debug, Default)]
pub struct ProjectLoadResult {
    /// Documents keyed by frontmatter id, or by the relative path minus
    /// `.plan` when no id is available.
    pub documents: BTreeMap<String, PlanDocument>,
    /// Raw sources under the same keys (needed for lint directives and
    /// fixing).
    pub sources: BTreeMap<String, String>,
    /// Files that could not be read. Loading never aborts.
    pub errors: Vec<String>,
    /// Ids that appear in more than one file, with the files involved.
    pub duplicate_ids: BTreeMap<String, Vec<String>>,
}

/// Recursively discover and parse every `.plan` file under `dir`.
///
/// When two files share an id, the later one (in sorted path order) wins
/// the `documents` slot; both paths are recorded in `duplicate_ids` so
/// PLAN-011 can report the collision.
pub fn load_project(dir: &Path) -> ProjectLoadResult {
    let mut result = ProjectLoadResult::default();
    let mut id_to_files: BTreeMap<String, Vec<String>> = BTreeMap::new();

    let mut plan_files = Vec::new();
    find_plan_files(dir, &mut plan_files);
    plan_files.sort();

    for path in plan_files {
        let path_str = path.to_string_lossy().to_string();
        let source = match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) => {
                result.errors.push(format!("Failed to load {path_str}: {e}"));
                continue;
            }
        };

        let doc = parse_plan_file(&source, Some(&path_str));
        let key = match doc.frontmatter.as_ref().map(|fm| fm.id.clone()) {
            Some(id) => {
                id_to_files.entry(id.clone()).or_default().push(path_str);
                id
            }
            None => fallback_key(dir, &path),
        };

        result.documents.insert(key.clone(), doc);
        result.sources.insert(key, source);
    }

    for (id, files) in id_to_files {
        if files.len() > 1 {
            result.duplicate_ids.insert(id, files);
        }
    }

    result
}

/// Document key for a file without a usable frontmatter id: the
/// root-relative path minus the `.plan` extension.
fn fallback_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let relative = RelativePathBuf::from_path(relative)
        .unwrap_or_else(|_| RelativePathBuf::from(relative.to_string_lossy().as_ref()));
    PlanFile::new(relative).display_path().to_string()
}

fn find_plan_files(dir: &Path, results: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        // Unreadable directory: skip, per the loader's never-abort policy.
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            let name = entry.file_name();
            if !SKIPPED_DIRS.iter().any(|s| name == *s) {
                find_plan_files(&path, results);
            }
        } else if path.extension().is_some_and(|ext| ext == "plan") {
            results.push(path);
        }
    }
}

// --- Cross-file reference resolution -----------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedReference<'a> {
    pub source_id: String,
    pub target_id: String,
    pub target_doc: &'a PlanDocument,
    pub line: &'a DependencyLine,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedReference<'a> {
    pub source_id: String,
    pub target_id: String,
    pub line: &'a DependencyLine,
}

#[derive(Debug, Default)]
pub struct ReferenceResolution<'a> {
    pub resolved: Vec<ResolvedReference<'a>>,
    pub unresolved: Vec<UnresolvedReference<'a>>,
}

/// Resolve every plan reference in every document against the project set.
pub fn resolve_references(documents: &BTreeMap<String, PlanDocument>) -> ReferenceResolution<'_> {
    let mut resolution = ReferenceResolution::default();

    for (source_id, doc) in documents {
        for dep in all_dependency_lines(doc) {
            let Some(target_id) = dep.reference().and_then(|r| r.plan_id()) else {
                continue;
            };
            match documents.get(target_id) {
                Some(target_doc) => resolution.resolved.push(ResolvedReference {
                    source_id: source_id.clone(),
                    target_id: target_id.to_string(),
                    target_doc,
                    line: dep,
                }),
                None => resolution.unresolved.push(UnresolvedReference {
                    source_id: source_id.clone(),
                    target_id: target_id.to_string(),
                    line: dep,
                }),
            }
        }
    }

    resolution
}

fn all_dependency_lines(doc: &PlanDocument) -> Vec<&DependencyLine> {
    let mut deps = Vec::new();
    let Some(feature) = &doc.feature else {
        return deps;
    };

    deps.extend(feature.dependencies.iter());
    for story in &feature.stories {
        deps.extend(story.dependencies.iter());
        for task in &story.tasks {
            deps.extend(task.dependencies.iter());
        }
    }
    deps
}
