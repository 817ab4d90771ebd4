use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// A 1-based line/column position in a `.plan` source file.
///
/// Both axes are 1-based throughout the engine. Editor integrations
/// (which are 0-based) convert at the boundary via [`Location::to_editor`]
/// and [`Location::from_editor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

/// A 0-based position as used by editor protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EditorPosition {
    pub line: usize,
    pub character: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Convert to a 0-based editor position.
    pub fn to_editor(self) -> EditorPosition {
        EditorPosition {
            line: self.line - 1,
            character: self.column - 1,
        }
    }

    /// Convert back from a 0-based editor position.
    pub fn from_editor(pos: EditorPosition) -> Self {
        Self {
            line: pos.line + 1,
            column: pos.character + 1,
        }
    }
}

/// A source span. The end column is exclusive (half-open on the column axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Range {
    pub start: Location,
    pub end: Location,
}

impl Range {
    pub fn new(start: Location, end: Location) -> Self {
        Self { start, end }
    }

    /// Span a whole 1-based line given its text length.
    pub fn line_span(line: usize, text_len: usize) -> Self {
        Self {
            start: Location::new(line, 1),
            end: Location::new(line, text_len + 1),
        }
    }

    /// Half-open containment check against a 0-based editor position.
    ///
    /// A position exactly at `end.column` is not contained. Only meaningful
    /// for single-line ranges (inline elements); a multi-line range checks
    /// the start line only.
    pub fn contains_editor_position(&self, pos: EditorPosition) -> bool {
        pos.line + 1 == self.start.line
            && self.start.column <= pos.character + 1
            && pos.character + 1 < self.end.column
    }
}

// --- Frontmatter -------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Feature,
    Story,
    Task,
}

impl PlanType {
    pub const ALL: [&'static str; 3] = ["feature", "story", "task"];
}

impl FromStr for PlanType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "feature" => Ok(Self::Feature),
            "story" => Ok(Self::Story),
            "task" => Ok(Self::Task),
            _ => Err(()),
        }
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Feature => "feature",
            Self::Story => "story",
            Self::Task => "task",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Draft,
    Ready,
    InProgress,
    Blocked,
    Done,
    Deprecated,
}

impl Status {
    pub const ALL: [&'static str; 6] = [
        "draft",
        "ready",
        "in_progress",
        "blocked",
        "done",
        "deprecated",
    ];
}

impl FromStr for Status {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "draft" => Ok(Self::Draft),
            "ready" => Ok(Self::Ready),
            "in_progress" => Ok(Self::InProgress),
            "blocked" => Ok(Self::Blocked),
            "done" => Ok(Self::Done),
            "deprecated" => Ok(Self::Deprecated),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Draft => "draft",
            Self::Ready => "ready",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::Done => "done",
            Self::Deprecated => "deprecated",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Urgent,
    High,
    Normal,
    Low,
}

impl Priority {
    pub const ALL: [&'static str; 4] = ["urgent", "high", "normal", "low"];
}

impl FromStr for Priority {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "urgent" => Ok(Self::Urgent),
            "high" => Ok(Self::High),
            "normal" => Ok(Self::Normal),
            "low" => Ok(Self::Low),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Urgent => "urgent",
            Self::High => "high",
            Self::Normal => "normal",
            Self::Low => "low",
        })
    }
}

/// Parsed and validated frontmatter metadata.
///
/// Unknown keys are carried through in `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frontmatter {
    #[serde(rename = "type")]
    pub plan_type: PlanType,
    pub id: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    /// Unknown passthrough keys, serialized inline alongside the known ones.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

// --- Inline elements ---------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UncertaintyKind {
    Pending,
    Assumption,
    Alternative,
    Risk,
}

impl UncertaintyKind {
    pub const ALL: [UncertaintyKind; 4] = [
        Self::Pending,
        Self::Assumption,
        Self::Alternative,
        Self::Risk,
    ];
}

impl FromStr for UncertaintyKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "pending" => Ok(Self::Pending),
            "assumption" => Ok(Self::Assumption),
            "alternative" => Ok(Self::Alternative),
            "risk" => Ok(Self::Risk),
            _ => Err(()),
        }
    }
}

impl fmt::Display for UncertaintyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Assumption => "assumption",
            Self::Alternative => "alternative",
            Self::Risk => "risk",
        })
    }
}

/// An inline `?kind("message")` annotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UncertaintyMarker {
    #[serde(rename = "type")]
    pub kind: UncertaintyKind,
    pub message: String,
    pub range: Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ObligationLevel {
    Must,
    Should,
    May,
}

impl fmt::Display for ObligationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Must => "MUST",
            Self::Should => "SHOULD",
            Self::May => "MAY",
        })
    }
}

/// A `[MUST]` / `[SHOULD]` / `[MAY]` tag on a Then outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Obligation {
    pub level: ObligationLevel,
    pub range: Range,
}

/// An `@name` actor mention.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActorReference {
    pub name: String,
    pub range: Range,
}

/// A bracketed reference: `[id]`, `[id#fragment]`, `[external]`, `[doc:id]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Reference {
    #[serde(rename = "plan-reference")]
    Plan {
        id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        fragment: Option<String>,
        range: Range,
    },
    #[serde(rename = "external-reference")]
    External { range: Range },
    #[serde(rename = "doc-reference")]
    Doc { id: String, range: Range },
}

impl Reference {
    pub fn range(&self) -> Range {
        match self {
            Self::Plan { range, .. } | Self::External { range } | Self::Doc { range, .. } => *range,
        }
    }

    /// Target id for plan references; `None` for external/doc references.
    pub fn plan_id(&self) -> Option<&str> {
        match self {
            Self::Plan { id, .. } => Some(id),
            _ => None,
        }
    }
}

// --- Keyword lines -----------------------------------------------------

/// `Goal:` / `Persona:` / `Metric:` intent lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IntentLine {
    Goal {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        uncertainty: Option<UncertaintyMarker>,
        range: Range,
    },
    Persona {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        actor: Option<ActorReference>,
        #[serde(skip_serializing_if = "Option::is_none")]
        uncertainty: Option<UncertaintyMarker>,
        range: Range,
    },
    Metric {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        uncertainty: Option<UncertaintyMarker>,
        range: Range,
    },
}

impl IntentLine {
    pub fn text(&self) -> &str {
        match self {
            Self::Goal { text, .. } | Self::Persona { text, .. } | Self::Metric { text, .. } => {
                text
            }
        }
    }

    pub fn range(&self) -> Range {
        match self {
            Self::Goal { range, .. } | Self::Persona { range, .. } | Self::Metric { range, .. } => {
                *range
            }
        }
    }

    pub fn uncertainty(&self) -> Option<&UncertaintyMarker> {
        match self {
            Self::Goal { uncertainty, .. }
            | Self::Persona { uncertainty, .. }
            | Self::Metric { uncertainty, .. } => uncertainty.as_ref(),
        }
    }

    pub fn is_goal(&self) -> bool {
        matches!(self, Self::Goal { .. })
    }

    pub fn is_metric(&self) -> bool {
        matches!(self, Self::Metric { .. })
    }
}

/// `Given:` / `When:` / `Then:` behavior lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BehaviorLine {
    Given {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        uncertainty: Option<UncertaintyMarker>,
        range: Range,
    },
    When {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        uncertainty: Option<UncertaintyMarker>,
        range: Range,
    },
    Then {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        obligation: Option<Obligation>,
        #[serde(skip_serializing_if = "Option::is_none")]
        uncertainty: Option<UncertaintyMarker>,
        range: Range,
    },
}

impl BehaviorLine {
    pub fn text(&self) -> &str {
        match self {
            Self::Given { text, .. } | Self::When { text, .. } | Self::Then { text, .. } => text,
        }
    }

    pub fn range(&self) -> Range {
        match self {
            Self::Given { range, .. } | Self::When { range, .. } | Self::Then { range, .. } => {
                *range
            }
        }
    }

    pub fn uncertainty(&self) -> Option<&UncertaintyMarker> {
        match self {
            Self::Given { uncertainty, .. }
            | Self::When { uncertainty, .. }
            | Self::Then { uncertainty, .. } => uncertainty.as_ref(),
        }
    }

    pub fn is_when(&self) -> bool {
        matches!(self, Self::When { .. })
    }

    pub fn is_then(&self) -> bool {
        matches!(self, Self::Then { .. })
    }
}

/// `Needs:` / `Blocks:` dependency lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DependencyLine {
    Needs {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reference: Option<Reference>,
        #[serde(skip_serializing_if = "Option::is_none")]
        uncertainty: Option<UncertaintyMarker>,
        range: Range,
    },
    Blocks {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reference: Option<Reference>,
        #[serde(skip_serializing_if = "Option::is_none")]
        uncertainty: Option<UncertaintyMarker>,
        range: Range,
    },
}

impl DependencyLine {
    pub fn text(&self) -> &str {
        match self {
            Self::Needs { text, .. } | Self::Blocks { text, .. } => text,
        }
    }

    pub fn reference(&self) -> Option<&Reference> {
        match self {
            Self::Needs { reference, .. } | Self::Blocks { reference, .. } => reference.as_ref(),
        }
    }

    pub fn uncertainty(&self) -> Option<&UncertaintyMarker> {
        match self {
            Self::Needs { uncertainty, .. } | Self::Blocks { uncertainty, .. } => {
                uncertainty.as_ref()
            }
        }
    }

    pub fn range(&self) -> Range {
        match self {
            Self::Needs { range, .. } | Self::Blocks { range, .. } => *range,
        }
    }

    pub fn is_needs(&self) -> bool {
        matches!(self, Self::Needs { .. })
    }
}

/// `Assign:` line within a Task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignLine {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<ActorReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uncertainty: Option<UncertaintyMarker>,
    pub range: Range,
}

/// `Verify:` line within a Task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifyLine {
    pub text: String,
    pub range: Range,
}

/// A line that carries no recognized keyword.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLine {
    pub text: String,
    pub range: Range,
}

// --- Blocks ------------------------------------------------------------

/// Heterogeneous children collected inside an uncertainty block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UncertaintyChild {
    Behavior(BehaviorLine),
    Intent(IntentLine),
    Dependency(DependencyLine),
    Text(TextLine),
}

impl UncertaintyChild {
    pub fn text(&self) -> &str {
        match self {
            Self::Behavior(b) => b.text(),
            Self::Intent(i) => i.text(),
            Self::Dependency(d) => d.text(),
            Self::Text(t) => &t.text,
        }
    }

    pub fn as_behavior(&self) -> Option<&BehaviorLine> {
        match self {
            Self::Behavior(b) => Some(b),
            _ => None,
        }
    }
}

/// A `?kind "message" … ?end` block annotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UncertaintyBlock {
    #[serde(rename = "type")]
    pub kind: UncertaintyKind,
    pub message: String,
    pub children: Vec<UncertaintyChild>,
    pub range: Range,
}

/// An `Edge: "description"` sub-block with its own behaviors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeBlock {
    pub description: String,
    pub behaviors: Vec<BehaviorLine>,
    pub range: Range,
}

/// A `### Task:` block, owned by a Story.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskBlock {
    pub title: String,
    pub assigns: Vec<AssignLine>,
    pub verifies: Vec<VerifyLine>,
    pub dependencies: Vec<DependencyLine>,
    pub uncertainty_markers: Vec<UncertaintyMarker>,
    pub uncertainty_blocks: Vec<UncertaintyBlock>,
    pub range: Range,
}

/// A `## Story:` block, owned by a Feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryBlock {
    pub title: String,
    pub intents: Vec<IntentLine>,
    pub behaviors: Vec<BehaviorLine>,
    pub edges: Vec<EdgeBlock>,
    pub tasks: Vec<TaskBlock>,
    pub dependencies: Vec<DependencyLine>,
    pub uncertainty_markers: Vec<UncertaintyMarker>,
    pub uncertainty_blocks: Vec<UncertaintyBlock>,
    pub range: Range,
}

/// The single `# Feature:` block of a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureBlock {
    pub title: String,
    pub intents: Vec<IntentLine>,
    pub stories: Vec<StoryBlock>,
    pub dependencies: Vec<DependencyLine>,
    pub uncertainty_markers: Vec<UncertaintyMarker>,
    pub uncertainty_blocks: Vec<UncertaintyBlock>,
    pub range: Range,
}

// --- Document ----------------------------------------------------------

/// A structural anomaly recorded during parsing. Never fatal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseError {
    pub message: String,
    pub range: Range,
}

/// The root of a parsed `.plan` document.
///
/// A document with no recognized Feature heading has `feature = None` but
/// may still carry frontmatter and parse errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    pub frontmatter: Option<Frontmatter>,
    pub feature: Option<FeatureBlock>,
    pub errors: Vec<ParseError>,
    pub comments: Vec<Range>,
}
