use std::sync::LazyLock;

use regex::Regex;

use crate::models::UncertaintyKind;

use super::scanner::RawLine;

/// Recognized line keywords, grouped by [`KeywordCategory`] for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Goal,
    Persona,
    Metric,
    Given,
    When,
    Then,
    Needs,
    Blocks,
    Assign,
    Verify,
    Edge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordCategory {
    /// `Goal:` / `Persona:` / `Metric:`
    Intent,
    /// `Given:` / `When:` / `Then:`
    Behavior,
    /// `Needs:` / `Blocks:`
    Dependency,
    /// `Assign:` / `Verify:`
    TaskKeyword,
    /// `Edge:`
    Edge,
}

impl Keyword {
    pub fn category(self) -> KeywordCategory {
        match self {
            Self::Goal | Self::Persona | Self::Metric => KeywordCategory::Intent,
            Self::Given | Self::When | Self::Then => KeywordCategory::Behavior,
            Self::Needs | Self::Blocks => KeywordCategory::Dependency,
            Self::Assign | Self::Verify => KeywordCategory::TaskKeyword,
            Self::Edge => KeywordCategory::Edge,
        }
    }

    fn from_match(s: &str) -> Option<Self> {
        Some(match s {
            "Goal" => Self::Goal,
            "Persona" => Self::Persona,
            "Metric" => Self::Metric,
            "Given" => Self::Given,
            "When" => Self::When,
            "Then" => Self::Then,
            "Needs" => Self::Needs,
            "Blocks" => Self::Blocks,
            "Assign" => Self::Assign,
            "Verify" => Self::Verify,
            "Edge" => Self::Edge,
            _ => return None,
        })
    }
}

/// Semantic classification of a single body line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    Blank,
    /// `---` alone (indentation tolerated).
    Separator,
    /// `<!-- ... -->` on one line.
    CommentFull,
    /// `<!--` with no `-->` on the same line.
    CommentOpen,
    /// `-->` with no `<!--` on the same line.
    CommentClose,
    /// `?end` alone.
    UncertaintyClose,
    /// `?kind "message"` (trailing quote optional).
    UncertaintyOpen {
        kind: UncertaintyKind,
        message: String,
    },
    FeatureHeading { title: String },
    StoryHeading { title: String },
    TaskHeading { title: String },
    /// A recognized keyword line; `value` is the trimmed text after `Keyword:`.
    Keyword { keyword: Keyword, value: String },
    Text,
}

/// A body line labeled with its semantic type.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedLine {
    pub line_number: usize,
    pub text: String,
    /// Leading whitespace length (bytes).
    pub indent: usize,
    pub kind: LineKind,
}

static COMMENT_FULL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*<!--.*-->\s*$").unwrap());
static COMMENT_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*<!--").unwrap());
static COMMENT_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-->\s*$").unwrap());
static UNCERTAINTY_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\?(pending|assumption|alternative|risk)\s+["“”]([^"“”]*)["“”]?\s*$"#).unwrap()
});
static FEATURE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#\s+Feature:\s*(.+)$").unwrap());
static STORY_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^##\s+Story:\s*(.+)$").unwrap());
static TASK_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^###\s+Task:\s*(.+)$").unwrap());
static KEYWORD_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(Goal|Persona|Metric|Given|When|Then|Needs|Blocks|Assign|Verify|Edge):\s*(.*)$")
        .unwrap()
});

/// Classify a single line. First match wins, in the documented precedence
/// order: blank, separator, full comment, comment-open, comment-close,
/// uncertainty-close, uncertainty-open, headings, keywords, text.
///
/// Keyword matching tolerates leading indentation; headings must start at
/// column 1 with the exact `#` arity. Stateless and side-effect-free so
/// consumers can re-classify extracted lines ad hoc.
pub fn classify_line(raw: &RawLine) -> ClassifiedLine {
    let text = raw.text.clone();
    let indent = text.len() - text.trim_start().len();
    let trimmed = text.trim();

    let kind = classify_text(&text, trimmed);

    ClassifiedLine {
        line_number: raw.line_number,
        text,
        indent,
        kind,
    }
}

fn classify_text(text: &str, trimmed: &str) -> LineKind {
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if trimmed == "---" {
        return LineKind::Separator;
    }
    if COMMENT_FULL.is_match(text) {
        return LineKind::CommentFull;
    }
    if COMMENT_OPEN.is_match(text) && !COMMENT_CLOSE.is_match(text) {
        return LineKind::CommentOpen;
    }
    if COMMENT_CLOSE.is_match(text) && !COMMENT_OPEN.is_match(text) {
        return LineKind::CommentClose;
    }
    if trimmed == "?end" {
        return LineKind::UncertaintyClose;
    }
    if let Some(caps) = UNCERTAINTY_OPEN.captures(trimmed) {
        // The alternation only admits the four recognized kinds.
        let kind = caps[1].parse().unwrap_or(UncertaintyKind::Pending);
        return LineKind::UncertaintyOpen {
            kind,
            message: caps[2].to_string(),
        };
    }

    // Headings are matched on the untrimmed text: they must start at column 1.
    if let Some(caps) = FEATURE_HEADING.captures(text) {
        return LineKind::FeatureHeading {
            title: caps[1].trim().to_string(),
        };
    }
    if let Some(caps) = STORY_HEADING.captures(text) {
        return LineKind::StoryHeading {
            title: caps[1].trim().to_string(),
        };
    }
    if let Some(caps) = TASK_HEADING.captures(text) {
        return LineKind::TaskHeading {
            title: caps[1].trim().to_string(),
        };
    }

    if let Some(caps) = KEYWORD_LINE.captures(text)
        && let Some(keyword) = Keyword::from_match(&caps[1])
    {
        return LineKind::Keyword {
            keyword,
            value: caps[2].trim().to_string(),
        };
    }

    LineKind::Text
}

pub fn classify_lines(lines: &[RawLine]) -> Vec<ClassifiedLine> {
    lines.iter().map(classify_line).collect()
}
