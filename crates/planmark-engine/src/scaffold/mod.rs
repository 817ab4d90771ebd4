//! Boilerplate generation: built-in and custom `.plan` templates with
//! `{{variable}}` substitution.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDefinition {
    pub name: String,
    pub description: String,
    pub content: String,
}

/// Variables available to templates. Unknown `{{placeholders}}` are left
/// as-is.
#[derive(Debug, Clone)]
pub struct TemplateVariables {
    pub id: String,
    pub date: String,
    pub owner: String,
}

impl TemplateVariables {
    fn get(&self, key: &str) -> Option<&str> {
        match key {
            "id" => Some(&self.id),
            "date" => Some(&self.date),
            "owner" => Some(&self.owner),
            _ => None,
        }
    }
}

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").unwrap());
static ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9]*(-[a-z0-9]+)*$").unwrap());
static NON_ID_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Substitute `{{variable}}` placeholders in a template string.
pub fn render_template(template: &str, variables: &TemplateVariables) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures<'_>| {
            variables
                .get(&caps[1])
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .to_string()
}

/// Validate a plan id (kebab-case). Returns an error message with a
/// suggested fix when invalid.
pub fn validate_id(id: &str) -> Option<String> {
    if ID_PATTERN.is_match(id) {
        return None;
    }
    let suggested = NON_ID_CHARS
        .replace_all(&id.to_lowercase(), "-")
        .trim_matches('-')
        .to_string();
    let suggested = if suggested.is_empty() {
        "feat-my-feature".to_string()
    } else {
        suggested
    };
    Some(format!(
        "Invalid ID: \"{id}\". IDs must be kebab-case (e.g., \"{suggested}\")."
    ))
}

pub fn builtin_templates() -> Vec<TemplateDefinition> {
    vec![
        TemplateDefinition {
            name: "default".to_string(),
            description: "Feature with Story and Task skeleton".to_string(),
            content: DEFAULT_TEMPLATE.to_string(),
        },
        TemplateDefinition {
            name: "minimal".to_string(),
            description: "Frontmatter and Feature heading only".to_string(),
            content: MINIMAL_TEMPLATE.to_string(),
        },
        TemplateDefinition {
            name: "full".to_string(),
            description: "Full template with Edge, dependencies, and uncertainty examples"
                .to_string(),
            content: FULL_TEMPLATE.to_string(),
        },
    ]
}

/// Look up a template by name, built-ins first, then the custom directory.
pub fn get_template(name: &str, custom_dir: Option<&Path>) -> Option<TemplateDefinition> {
    if let Some(t) = builtin_templates().into_iter().find(|t| t.name == name) {
        return Some(t);
    }
    custom_dir.and_then(|dir| {
        load_custom_templates(dir)
            .into_iter()
            .find(|t| t.name == name)
    })
}

/// All available templates: built-ins plus any custom directory entries.
pub fn list_templates(custom_dir: Option<&Path>) -> Vec<TemplateDefinition> {
    let mut all = builtin_templates();
    if let Some(dir) = custom_dir {
        all.extend(load_custom_templates(dir));
    }
    all
}

/// Load custom templates from a directory: each `.plan-template` or `.txt`
/// file becomes a template named after the file stem.
pub fn load_custom_templates(dir: &Path) -> Vec<TemplateDefinition> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut templates = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if ext != "plan-template" && ext != "txt" {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        templates.push(TemplateDefinition {
            name: name.to_string(),
            description: format!("Custom template: {name}"),
            content,
        });
    }

    templates.sort_by(|a, b| a.name.cmp(&b.name));
    templates
}

/// Suggest a similar template name: exact prefix match first, then
/// substring either way.
pub fn find_similar_template(name: &str, available: &[String]) -> Option<String> {
    let lower = name.to_lowercase();
    if let Some(m) = available.iter().find(|a| a.starts_with(&lower)) {
        return Some(m.clone());
    }
    available
        .iter()
        .find(|a| a.contains(&lower) || lower.contains(a.as_str()))
        .cloned()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateResult {
    pub content: String,
    pub template_name: String,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown template: \"{0}\".")]
pub struct UnknownTemplate(pub String);

/// Generate `.plan` file content from a template. No filesystem I/O
/// beyond the optional custom template directory lookup.
pub fn generate_plan_file(
    id: &str,
    template: Option<&str>,
    owner: Option<&str>,
    date: &str,
    custom_dir: Option<&Path>,
) -> Result<GenerateResult, UnknownTemplate> {
    let template_name = template.unwrap_or("default");
    let template = get_template(template_name, custom_dir)
        .ok_or_else(|| UnknownTemplate(template_name.to_string()))?;

    let variables = TemplateVariables {
        id: id.to_string(),
        date: date.to_string(),
        owner: owner.unwrap_or("owner").to_string(),
    };

    Ok(GenerateResult {
        content: render_template(&template.content, &variables),
        template_name: template_name.to_string(),
    })
}

const DEFAULT_TEMPLATE: &str = r#"---
type: feature
id: {{id}}
status: draft
version: 0.1.0
owner: @{{owner}}
created: {{date}}
updated: {{date}}
---

# Feature: {{id}}

Goal: (describe the goal of this feature)
Persona: @(target user or actor)
Metric: (measurable success criterion)

## Story: (story title)

Goal: (what this story achieves)
Given: (precondition)
When: (user action or trigger)
Then: (expected outcome) [MUST]

### Task: (task title)

Assign: @(assignee)
Verify: (verification criteria)
"#;

const MINIMAL_TEMPLATE: &str = r#"---
type: feature
id: {{id}}
status: draft
created: {{date}}
updated: {{date}}
---

# Feature: {{id}}

Goal: (describe the goal of this feature)
"#;

const FULL_TEMPLATE: &str = r#"---
type: feature
id: {{id}}
status: draft
version: 0.1.0
owner: @{{owner}}
priority: normal
tags: []
created: {{date}}
updated: {{date}}
---

# Feature: {{id}}

Goal: (describe the goal of this feature)
Persona: @(target user or actor)
Metric: (measurable success criterion)

Needs: [dependency-id]
Blocks: [blocked-id]

## Story: (story title)

Goal: (what this story achieves)
Given: (precondition)
When: (user action or trigger)
Then: (expected outcome) [MUST]
Then: (recommended outcome) [SHOULD]
Then: (optional outcome) [MAY]

Edge: "(edge case description)"
  When: (edge condition)
  Then: (expected handling) [MUST]

### Task: (task title)

Assign: @(assignee)
Verify: (verification criteria)

?pending "(describe what's undecided)"
(details about the pending item)
?end
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn vars() -> TemplateVariables {
        TemplateVariables {
            id: "feat-x".to_string(),
            date: "2026-08-07".to_string(),
            owner: "amy".to_string(),
        }
    }

    #[test]
    fn substitutes_known_placeholders() {
        let out = render_template("id={{id}} date={{date}} owner={{owner}}", &vars());
        assert_eq!(out, "id=feat-x date=2026-08-07 owner=amy");
    }

    #[test]
    fn leaves_unknown_placeholders_intact() {
        assert_eq!(render_template("{{mystery}}", &vars()), "{{mystery}}");
    }

    #[test]
    fn validates_kebab_case_ids() {
        assert!(validate_id("feat-social-login").is_none());
        assert!(validate_id("a").is_none());
        let err = validate_id("Feat Social Login").unwrap();
        assert!(err.contains("feat-social-login"));
        assert!(validate_id("-leading").is_some());
    }

    #[test]
    fn generated_default_template_parses_clean() {
        let result = generate_plan_file("feat-new", None, Some("amy"), "2026-08-07", None).unwrap();
        assert_eq!(result.template_name, "default");

        let doc = crate::parsing::parse_plan_file(&result.content, None);
        assert!(doc.errors.is_empty());
        let fm = doc.frontmatter.unwrap();
        assert_eq!(fm.id, "feat-new");
        assert_eq!(fm.owner.as_deref(), Some("@amy"));
        let feature = doc.feature.unwrap();
        assert_eq!(feature.title, "feat-new");
        assert_eq!(feature.stories.len(), 1);
        assert_eq!(feature.stories[0].tasks.len(), 1);
    }

    #[test]
    fn full_template_exercises_every_construct() {
        let result =
            generate_plan_file("feat-full", Some("full"), None, "2026-08-07", None).unwrap();
        let doc = crate::parsing::parse_plan_file(&result.content, None);
        let feature = doc.feature.unwrap();
        assert_eq!(feature.dependencies.len(), 2);
        let story = &feature.stories[0];
        assert_eq!(story.edges.len(), 1);
        assert_eq!(story.tasks.len(), 1);
        assert_eq!(story.tasks[0].uncertainty_blocks.len(), 1);
    }

    #[test]
    fn unknown_template_is_an_error_with_suggestion_support() {
        let err = generate_plan_file("x", Some("ful"), None, "2026-08-07", None).unwrap_err();
        assert!(err.to_string().contains("ful"));

        let names: Vec<String> = builtin_templates().into_iter().map(|t| t.name).collect();
        assert_eq!(find_similar_template("ful", &names).as_deref(), Some("full"));
        assert_eq!(find_similar_template("xyz", &names), None);
    }

    #[test]
    fn loads_custom_templates_from_a_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("team.plan-template"), "# Feature: {{id}}\n").unwrap();
        std::fs::write(dir.path().join("ignored.md"), "nope").unwrap();

        let templates = load_custom_templates(dir.path());
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].name, "team");

        let found = get_template("team", Some(dir.path())).unwrap();
        assert!(found.content.contains("{{id}}"));
    }
}
