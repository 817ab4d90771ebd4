use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Frontmatter, Location, ParseError, PlanType, Priority, Range, Status};

use super::scanner::FrontmatterBounds;

#[derive(Debug, Clone, PartialEq)]
pub struct FrontmatterResult {
    pub frontmatter: Option<Frontmatter>,
    pub errors: Vec<ParseError>,
}

// A bare `@` scalar (`owner: @alice`) collides with YAML anchor syntax, so
// such values are auto-quoted before parsing.
static AT_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(\s*\w+:\s+)(@[^\s,\]]+.*)$").unwrap());

const KNOWN_KEYS: [&str; 9] = [
    "type", "id", "status", "version", "owner", "priority", "tags", "created", "updated",
];

/// Parse and validate the frontmatter block.
///
/// The YAML parse and the mapping check are fatal. Field validation is
/// collected: if `type`, `id`, or `status` cannot be established the whole
/// result is `None`, otherwise the parsed mapping is returned alongside any
/// non-fatal errors (an invalid `priority` does not null out the object).
///
/// All validation errors share a synthetic range spanning the block; there
/// is no per-field position tracking.
pub fn parse_frontmatter(bounds: &FrontmatterBounds) -> FrontmatterResult {
    let block_range = Range::new(
        Location::new(bounds.start_line, 1),
        Location::new(bounds.end_line, 4),
    );
    let mk_error = |message: String| ParseError {
        message,
        range: block_range,
    };
    let mut errors = Vec::new();

    let safe_content = AT_VALUE.replace_all(&bounds.content, |caps: &regex::Captures<'_>| {
        format!("{}\"{}\"", &caps[1], &caps[2])
    });

    let parsed: serde_yaml::Value = match serde_yaml::from_str(&safe_content) {
        Ok(value) => value,
        Err(e) => {
            errors.push(mk_error(format!("Invalid YAML in frontmatter: {e}")));
            return FrontmatterResult {
                frontmatter: None,
                errors,
            };
        }
    };

    let Some(mapping) = parsed.as_mapping() else {
        errors.push(mk_error("Frontmatter must be a YAML mapping".to_string()));
        return FrontmatterResult {
            frontmatter: None,
            errors,
        };
    };

    let field = |key: &str| -> Option<String> {
        mapping
            .get(&serde_yaml::Value::String(key.to_string()))
            .and_then(scalar_to_string)
            .filter(|s| !s.is_empty())
    };

    // Required: type
    let plan_type = match field("type") {
        None => {
            errors.push(mk_error(
                "Frontmatter missing required field: type".to_string(),
            ));
            None
        }
        Some(raw) => match raw.parse::<PlanType>() {
            Ok(t) => Some(t),
            Err(()) => {
                errors.push(mk_error(format!(
                    "Invalid type \"{raw}\". Must be one of: {}",
                    PlanType::ALL.join(", ")
                )));
                None
            }
        },
    };

    // Required: id
    let id = field("id");
    if id.is_none() {
        errors.push(mk_error(
            "Frontmatter missing required field: id".to_string(),
        ));
    }

    // Required: status
    let status = match field("status") {
        None => {
            errors.push(mk_error(
                "Frontmatter missing required field: status".to_string(),
            ));
            None
        }
        Some(raw) => match raw.parse::<Status>() {
            Ok(s) => Some(s),
            Err(()) => {
                errors.push(mk_error(format!(
                    "Invalid status \"{raw}\". Must be one of: {}",
                    Status::ALL.join(", ")
                )));
                None
            }
        },
    };

    // Optional: priority
    let priority = match field("priority") {
        None => None,
        Some(raw) => match raw.parse::<Priority>() {
            Ok(p) => Some(p),
            Err(()) => {
                errors.push(mk_error(format!(
                    "Invalid priority \"{raw}\". Must be one of: {}",
                    Priority::ALL.join(", ")
                )));
                None
            }
        },
    };

    let (Some(plan_type), Some(id), Some(status)) = (plan_type, id, status) else {
        return FrontmatterResult {
            frontmatter: None,
            errors,
        };
    };

    let tags = mapping
        .get(&serde_yaml::Value::String("tags".to_string()))
        .and_then(|v| match v {
            serde_yaml::Value::Sequence(items) => {
                Some(items.iter().filter_map(scalar_to_string).collect())
            }
            serde_yaml::Value::String(s) => Some(vec![s.clone()]),
            _ => None,
        });

    let mut extra = BTreeMap::new();
    for (key, value) in mapping {
        if let Some(key) = key.as_str()
            && !KNOWN_KEYS.contains(&key)
        {
            extra.insert(key.to_string(), value.clone());
        }
    }

    FrontmatterResult {
        frontmatter: Some(Frontmatter {
            plan_type,
            id,
            status,
            version: field("version"),
            owner: field("owner"),
            priority,
            tags,
            created: field("created"),
            updated: field("updated"),
            extra,
        }),
        errors,
    }
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(content: &str) -> FrontmatterBounds {
        FrontmatterBounds {
            start_line: 1,
            end_line: content.lines().count() + 2,
            content: content.to_string(),
        }
    }

    #[test]
    fn parses_a_complete_block() {
        let result = parse_frontmatter(&bounds(
            "type: feature\nid: feat-login\nstatus: draft\npriority: high\ntags:\n  - auth\n  - oauth",
        ));
        assert!(result.errors.is_empty());
        let fm = result.frontmatter.unwrap();
        assert_eq!(fm.plan_type, PlanType::Feature);
        assert_eq!(fm.id, "feat-login");
        assert_eq!(fm.status, Status::Draft);
        assert_eq!(fm.priority, Some(Priority::High));
        assert_eq!(fm.tags, Some(vec!["auth".to_string(), "oauth".to_string()]));
    }

    #[test]
    fn auto_quotes_at_prefixed_values() {
        let result = parse_frontmatter(&bounds(
            "type: feature\nid: feat-x\nstatus: draft\nowner: @alice",
        ));
        assert!(result.errors.is_empty());
        assert_eq!(result.frontmatter.unwrap().owner.as_deref(), Some("@alice"));
    }

    #[test]
    fn missing_required_fields_null_the_result() {
        let result = parse_frontmatter(&bounds("type: feature"));
        assert!(result.frontmatter.is_none());
        let messages: Vec<&str> = result.errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            [
                "Frontmatter missing required field: id",
                "Frontmatter missing required field: status",
            ]
        );
    }

    #[test]
    fn invalid_status_is_reported() {
        let result = parse_frontmatter(&bounds("type: feature\nid: x\nstatus: shipped"));
        assert!(result.frontmatter.is_none());
        assert!(result.errors[0].message.contains("Invalid status \"shipped\""));
    }

    #[test]
    fn invalid_priority_does_not_null_the_object() {
        let result =
            parse_frontmatter(&bounds("type: feature\nid: x\nstatus: draft\npriority: asap"));
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.contains("Invalid priority"));
        let fm = result.frontmatter.unwrap();
        assert_eq!(fm.priority, None);
        assert_eq!(fm.id, "x");
    }

    #[test]
    fn unknown_keys_pass_through() {
        let result = parse_frontmatter(&bounds(
            "type: feature\nid: x\nstatus: draft\nsprint: 14\nepic: billing",
        ));
        let fm = result.frontmatter.unwrap();
        assert_eq!(fm.extra.len(), 2);
        assert!(fm.extra.contains_key("sprint"));
        assert!(fm.extra.contains_key("epic"));
    }

    #[test]
    fn non_mapping_content_is_fatal() {
        let result = parse_frontmatter(&bounds("- just\n- a list"));
        assert!(result.frontmatter.is_none());
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.contains("YAML mapping"));
    }

    #[test]
    fn malformed_yaml_is_fatal_with_block_range() {
        let result = parse_frontmatter(&bounds("type: [unclosed"));
        assert!(result.frontmatter.is_none());
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.starts_with("Invalid YAML"));
        assert_eq!(result.errors[0].range.start, Location::new(1, 1));
    }
}
