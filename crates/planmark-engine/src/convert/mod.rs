//! Tree-to-text converters: JSON, Markdown, and CSV projections of a
//! parsed document.

mod csv;
mod json;
mod markdown;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::models::PlanDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertFormat {
    Json,
    Markdown,
    Csv,
}

impl ConvertFormat {
    pub const ALL: [ConvertFormat; 3] = [Self::Json, Self::Markdown, Self::Csv];
}

impl fmt::Display for ConvertFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Markdown => "markdown",
            Self::Csv => "csv",
        })
    }
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Unsupported format: {0}. Supported: json, markdown, csv")]
    UnsupportedFormat(String),
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl FromStr for ConvertFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "markdown" => Ok(Self::Markdown),
            "csv" => Ok(Self::Csv),
            other => Err(ConvertError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Convert a parsed document to the requested output format.
pub fn convert(doc: &PlanDocument, format: ConvertFormat) -> Result<String, ConvertError> {
    match format {
        ConvertFormat::Json => json::convert(doc),
        ConvertFormat::Markdown => Ok(markdown::convert(doc)),
        ConvertFormat::Csv => Ok(csv::convert(doc)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::parse_plan_file;

    const SOURCE: &str = "\
---
type: feature
id: feat-convert
status: draft
priority: high
tags:
  - auth
---
# Feature: Conversion
Goal: convert things ?pending(\"format set\")
Persona: @dev
Metric: all formats work

Needs: [feat-base]

## Story: Round trip
Goal: keep data
When: converting
Then: output matches [MUST]

Edge: \"empty document\"
  Then: header only [MUST]

### Task: Wire converters
Assign: @amy
Verify: golden files
Needs: [feat-base#story-setup]
";

    #[test]
    fn format_parses_from_str() {
        assert_eq!("json".parse::<ConvertFormat>().unwrap(), ConvertFormat::Json);
        assert!(matches!(
            "yaml".parse::<ConvertFormat>(),
            Err(ConvertError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn json_projection_has_metadata_and_feature() {
        let doc = parse_plan_file(SOURCE, None);
        let out = convert(&doc, ConvertFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["metadata"]["id"], "feat-convert");
        assert_eq!(value["feature"]["title"], "Conversion");
        assert_eq!(value["feature"]["stories"][0]["title"], "Round trip");
        assert_eq!(
            value["feature"]["stories"][0]["behaviors"][1]["obligation"],
            "MUST"
        );
        assert_eq!(
            value["feature"]["stories"][0]["tasks"][0]["assignees"][0],
            "amy"
        );
        assert_eq!(
            value["feature"]["stories"][0]["tasks"][0]["dependencies"][0]["target"],
            "feat-base#story-setup"
        );
    }

    #[test]
    fn markdown_projection_strips_inline_markup() {
        let doc = parse_plan_file(SOURCE, None);
        let out = convert(&doc, ConvertFormat::Markdown).unwrap();

        assert!(out.contains("| ID | feat-convert |"));
        assert!(out.contains("# Conversion"));
        assert!(out.contains("**Goal**: convert things\n"));
        assert!(!out.contains("?pending"));
        assert!(out.contains("- **Then**: output matches"));
        assert!(!out.contains("[MUST]"));
        assert!(out.contains("### Edge: empty document"));
        assert!(out.contains("**Assignee**: @amy"));
    }

    #[test]
    fn csv_projection_has_one_row_per_block() {
        let doc = parse_plan_file(SOURCE, None);
        let out = convert(&doc, ConvertFormat::Csv).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(
            lines[0],
            "Level,Title,Goal,When,Then,Assignee,Status,Dependencies"
        );
        assert!(lines[1].starts_with("Feature,Conversion,"));
        assert!(lines[2].starts_with("Story,Round trip,"));
        assert!(lines[3].starts_with("Task,Wire converters,"));
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn documents_without_a_feature_still_convert() {
        let doc = parse_plan_file("---\ntype: feature\nid: x\nstatus: draft\n---", None);
        let csv = convert(&doc, ConvertFormat::Csv).unwrap();
        assert_eq!(csv, "Level,Title,Goal,When,Then,Assignee,Status,Dependencies");

        let md = convert(&doc, ConvertFormat::Markdown).unwrap();
        assert!(md.contains("| ID | x |"));
    }
}
