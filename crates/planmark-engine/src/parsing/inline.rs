//! Regex-driven scanners for sub-line constructs.
//!
//! All scanners take arbitrary text plus a 1-based line number and return
//! position-tagged results. Column ranges are 1-based and half-open:
//! `[match_start + 1, match_start + match_len + 1)`.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{
    ActorReference, Location, Obligation, ObligationLevel, Range, Reference, UncertaintyKind,
    UncertaintyMarker,
};

// Inline uncertainty is the parenthesized, quoted form `?kind("message")`,
// deliberately distinct from the block-opening `?kind "message"` surface.
static UNCERTAINTY_INLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\?(pending|assumption|alternative|risk)\(["“]([^"”]*)["”]\)"#).unwrap()
});
static OBLIGATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[(MUST|SHOULD|MAY)\]").unwrap());
static ACTOR_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([a-zA-Z_][a-zA-Z0-9_-]*)").unwrap());
static BRACKET_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([a-zA-Z][a-zA-Z0-9_:-]*(?:#[a-zA-Z0-9_-]+)?)\]").unwrap());
static STRIP_UNCERTAINTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s*\?(pending|assumption|alternative|risk)\(["“][^"”]*["”]\)"#).unwrap()
});
static STRIP_OBLIGATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\[(MUST|SHOULD|MAY)\]").unwrap());

fn span(line: usize, start: usize, len: usize) -> Range {
    Range::new(
        Location::new(line, start + 1),
        Location::new(line, start + len + 1),
    )
}

/// Find every `?kind("message")` marker on a line.
pub fn uncertainty_markers(text: &str, line_number: usize) -> Vec<UncertaintyMarker> {
    UNCERTAINTY_INLINE
        .captures_iter(text)
        .map(|caps| {
            let m = caps.get(0).unwrap();
            // The alternation only admits the four recognized kinds.
            let kind: UncertaintyKind = caps[1].parse().unwrap_or(UncertaintyKind::Pending);
            UncertaintyMarker {
                kind,
                message: caps[2].to_string(),
                range: span(line_number, m.start(), m.len()),
            }
        })
        .collect()
}

/// Find the first `[MUST]` / `[SHOULD]` / `[MAY]` tag on a line.
///
/// Only the first occurrence is surfaced for structural attachment; all tags
/// remain discoverable by re-scanning.
pub fn obligation(text: &str, line_number: usize) -> Option<Obligation> {
    let caps = OBLIGATION.captures(text)?;
    let m = caps.get(0).unwrap();
    let level = match &caps[1] {
        "MUST" => ObligationLevel::Must,
        "SHOULD" => ObligationLevel::Should,
        _ => ObligationLevel::May,
    };
    Some(Obligation {
        level,
        range: span(line_number, m.start(), m.len()),
    })
}

/// Find every `@name` actor mention on a line.
pub fn actor_references(text: &str, line_number: usize) -> Vec<ActorReference> {
    ACTOR_REF
        .captures_iter(text)
        .map(|caps| {
            let m = caps.get(0).unwrap();
            ActorReference {
                name: caps[1].to_string(),
                range: span(line_number, m.start(), m.len()),
            }
        })
        .collect()
}

/// Find every bracketed reference on a line.
///
/// `[MUST]`/`[SHOULD]`/`[MAY]` are obligations, not references, and are
/// skipped. `[external]` yields an external reference, `[doc:id]` a doc
/// reference, anything else a plan reference split on the first `#` into
/// id and optional fragment.
pub fn references(text: &str, line_number: usize) -> Vec<Reference> {
    BRACKET_REF
        .captures_iter(text)
        .filter_map(|caps| {
            let m = caps.get(0).unwrap();
            let content = &caps[1];
            let range = span(line_number, m.start(), m.len());

            match content {
                "MUST" | "SHOULD" | "MAY" => None,
                "external" => Some(Reference::External { range }),
                _ => {
                    if let Some(id) = content.strip_prefix("doc:") {
                        Some(Reference::Doc {
                            id: id.to_string(),
                            range,
                        })
                    } else if let Some((id, fragment)) = content.split_once('#') {
                        Some(Reference::Plan {
                            id: id.to_string(),
                            fragment: Some(fragment.to_string()),
                            range,
                        })
                    } else {
                        Some(Reference::Plan {
                            id: content.to_string(),
                            fragment: None,
                            range,
                        })
                    }
                }
            }
        })
        .collect()
}

/// Strip inline uncertainty markers from text for clean rendering.
pub fn strip_uncertainty(text: &str) -> String {
    STRIP_UNCERTAINTY.replace_all(text, "").trim().to_string()
}

/// Strip obligation tags from text for clean rendering.
pub fn strip_obligation(text: &str) -> String {
    STRIP_OBLIGATION.replace_all(text, "").trim().to_string()
}
