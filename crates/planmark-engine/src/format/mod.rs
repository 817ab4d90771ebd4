//! Source formatter: canonical frontmatter key order plus body whitespace
//! normalization. Line-level only; values are never re-serialized.

use std::sync::LazyLock;

use regex::Regex;

/// Canonical frontmatter key order. Unknown keys sort alphabetically after
/// the canonical ones.
const KEY_ORDER: [&str; 9] = [
    "type", "id", "status", "version", "owner", "priority", "tags", "created", "updated",
];

static KEY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)([a-zA-Z_][a-zA-Z0-9_-]*)\s*:").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatResult {
    pub file_path: Option<String>,
    pub original: String,
    pub formatted: String,
    pub changed: bool,
}

/// Reorder frontmatter keys, preserving each entry's original text.
/// Continuation lines (array items, folded scalars) stay attached to the
/// key line above them.
fn format_frontmatter(fm_lines: &[&str]) -> Vec<String> {
    struct Entry {
        key: String,
        text: String,
    }

    let mut entries: Vec<Entry> = Vec::new();
    for line in fm_lines {
        if let Some(caps) = KEY_LINE.captures(line) {
            entries.push(Entry {
                key: caps[2].to_string(),
                text: (*line).to_string(),
            });
        } else if let Some(last) = entries.last_mut() {
            last.text.push('\n');
            last.text.push_str(line);
        }
    }

    entries.sort_by(|a, b| {
        let a_idx = KEY_ORDER.iter().position(|k| *k == a.key);
        let b_idx = KEY_ORDER.iter().position(|k| *k == b.key);
        match (a_idx, b_idx) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.key.cmp(&b.key),
        }
    });

    entries
        .iter()
        .flat_map(|e| e.text.split('\n'))
        .map(|l| l.trim_end().to_string())
        .collect()
}

/// Normalize body whitespace: trim trailing whitespace, collapse
/// consecutive blank lines, drop trailing blanks.
fn format_body(body_lines: &[&str]) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    let mut prev_blank = false;

    for line in body_lines {
        let line = line.trim_end();
        let is_blank = line.is_empty();
        if is_blank && prev_blank {
            continue;
        }
        result.push(line.to_string());
        prev_blank = is_blank;
    }

    while result.last().is_some_and(|l| l.is_empty()) {
        result.pop();
    }

    result
}

/// Format a `.plan` source string. The output always ends with exactly one
/// newline.
pub fn format_source(source: &str, file_path: Option<&str>) -> FormatResult {
    let lines: Vec<&str> = source.split('\n').collect();

    // Locate the frontmatter delimiters, if both are present.
    let mut fm_start = None;
    let mut fm_end = None;
    for (i, line) in lines.iter().enumerate() {
        if line.trim() == "---" {
            if fm_start.is_none() {
                fm_start = Some(i);
            } else {
                fm_end = Some(i);
                break;
            }
        }
    }

    let result_lines = match (fm_start, fm_end) {
        (Some(start), Some(end)) => {
            let mut out = vec!["---".to_string()];
            out.extend(format_frontmatter(&lines[start + 1..end]));
            out.push("---".to_string());
            out.extend(format_body(&lines[end + 1..]));
            out
        }
        _ => format_body(&lines),
    };

    let formatted = format!("{}\n", result_lines.join("\n"));

    FormatResult {
        file_path: file_path.map(String::from),
        original: source.to_string(),
        formatted: formatted.clone(),
        changed: source != formatted,
    }
}
