//! Cursor-based recursive-descent parser over the classified line stream.
//!
//! The parser never fails: every anomaly becomes a [`ParseError`] on the
//! document and consumption continues to end of input, so a best-effort AST
//! is always produced, even for badly malformed input.

use crate::models::{
    AssignLine, BehaviorLine, DependencyLine, EdgeBlock, FeatureBlock, Frontmatter, IntentLine,
    Location, ParseError, PlanDocument, Range, StoryBlock, TaskBlock, TextLine, UncertaintyBlock,
    UncertaintyChild, UncertaintyMarker, VerifyLine,
};

use super::classify::{ClassifiedLine, Keyword, KeywordCategory, LineKind};
use super::inline;

fn line_range(line: &ClassifiedLine) -> Range {
    Range::line_span(line.line_number, line.text.len())
}

/// Wire-style name of a line kind, used in error messages.
fn kind_name(line: &ClassifiedLine) -> &'static str {
    match &line.kind {
        LineKind::Blank => "blank",
        LineKind::Separator => "separator",
        LineKind::CommentFull => "comment",
        LineKind::CommentOpen => "comment-open",
        LineKind::CommentClose => "comment-close",
        LineKind::UncertaintyClose => "uncertainty-close",
        LineKind::UncertaintyOpen { .. } => "uncertainty-open",
        LineKind::FeatureHeading { .. } => "feature-heading",
        LineKind::StoryHeading { .. } => "story-heading",
        LineKind::TaskHeading { .. } => "task-heading",
        LineKind::Keyword { keyword, .. } => match keyword.category() {
            KeywordCategory::Intent => "intent",
            KeywordCategory::Behavior => "behavior",
            KeywordCategory::Dependency => "dependency",
            KeywordCategory::TaskKeyword => "task-keyword",
            KeywordCategory::Edge => "edge",
        },
        LineKind::Text => "text",
    }
}

struct ParserState<'a> {
    lines: &'a [ClassifiedLine],
    pos: usize,
    errors: Vec<ParseError>,
    comments: Vec<Range>,
}

impl<'a> ParserState<'a> {
    fn new(lines: &'a [ClassifiedLine]) -> Self {
        Self {
            lines,
            pos: 0,
            errors: Vec::new(),
            comments: Vec::new(),
        }
    }

    fn peek(&self) -> Option<&'a ClassifiedLine> {
        self.lines.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a ClassifiedLine> {
        let line = self.lines.get(self.pos);
        if line.is_some() {
            self.pos += 1;
        }
        line
    }

    fn previous(&self) -> Option<&'a ClassifiedLine> {
        self.pos.checked_sub(1).and_then(|i| self.lines.get(i))
    }

    fn add_error(&mut self, message: impl Into<String>, line: &ClassifiedLine) {
        self.errors.push(ParseError {
            message: message.into(),
            range: line_range(line),
        });
    }

    /// Consume blank/separator lines, recording full-line comments along
    /// the way. Stops at the first line of any other kind.
    fn skip_blanks_and_separators(&mut self) {
        while let Some(cur) = self.peek() {
            match cur.kind {
                LineKind::Blank | LineKind::Separator => {
                    self.pos += 1;
                }
                LineKind::CommentFull => {
                    self.comments.push(line_range(cur));
                    self.pos += 1;
                }
                LineKind::CommentOpen => self.skip_multiline_comment(),
                _ => break,
            }
        }
    }

    fn skip_multiline_comment(&mut self) {
        let Some(start) = self.advance() else { return };
        let start_range = line_range(start);
        while let Some(cur) = self.advance() {
            if cur.kind == LineKind::CommentClose {
                self.comments.push(Range::new(
                    start_range.start,
                    Location::new(cur.line_number, cur.text.len() + 1),
                ));
                return;
            }
        }
        // Unclosed: record just the opening line.
        self.comments.push(start_range);
    }

    /// End location of the most recently consumed line.
    fn consumed_end(&self) -> Option<Location> {
        self.previous().map(|p| line_range(p).end)
    }
}

// --- Feature -----------------------------------------------------------

fn parse_feature(state: &mut ParserState<'_>) -> Option<FeatureBlock> {
    state.skip_blanks_and_separators();
    state.peek()?;

    if !matches!(
        state.peek().map(|l| &l.kind),
        Some(LineKind::FeatureHeading { .. })
    ) {
        // Scan forward for the heading, flagging non-trivial content.
        while let Some(cur) = state.peek() {
            if matches!(cur.kind, LineKind::FeatureHeading { .. }) {
                break;
            }
            state.pos += 1;
            if !matches!(
                cur.kind,
                LineKind::Blank
                    | LineKind::Separator
                    | LineKind::CommentFull
                    | LineKind::CommentOpen
            ) {
                state.add_error("Unexpected line before Feature heading", cur);
            }
        }
        state.peek()?;
    }

    let heading = state.advance()?;
    let title = match &heading.kind {
        LineKind::FeatureHeading { title } => title.clone(),
        _ => String::new(),
    };

    let mut feature = FeatureBlock {
        title,
        intents: Vec::new(),
        stories: Vec::new(),
        dependencies: Vec::new(),
        uncertainty_markers: Vec::new(),
        uncertainty_blocks: Vec::new(),
        range: line_range(heading),
    };
    let mut end = line_range(heading).end;

    loop {
        state.skip_blanks_and_separators();
        let Some(cur) = state.peek() else { break };

        match &cur.kind {
            LineKind::FeatureHeading { .. } => break,
            LineKind::StoryHeading { .. } => {
                if let Some(story) = parse_story(state) {
                    end = story.range.end;
                    feature.stories.push(story);
                }
            }
            LineKind::UncertaintyOpen { .. } => {
                if let Some(block) = parse_uncertainty_block(state) {
                    end = block.range.end;
                    feature.uncertainty_blocks.push(block);
                }
            }
            LineKind::Keyword { keyword, .. } => match keyword.category() {
                KeywordCategory::Intent => {
                    if let Some(intent) = parse_intent_line(state) {
                        collect_marker(intent.uncertainty(), &mut feature.uncertainty_markers);
                        feature.intents.push(intent);
                    }
                    end = state.consumed_end().unwrap_or(end);
                }
                KeywordCategory::Dependency => {
                    if let Some(dep) = parse_dependency_line(state) {
                        collect_marker(dep.uncertainty(), &mut feature.uncertainty_markers);
                        feature.dependencies.push(dep);
                    }
                    end = state.consumed_end().unwrap_or(end);
                }
                _ => {
                    state.add_error(
                        format!(
                            "Unexpected {} at feature level: \"{}\"",
                            kind_name(cur),
                            cur.text.trim()
                        ),
                        cur,
                    );
                    state.pos += 1;
                    end = state.consumed_end().unwrap_or(end);
                }
            },
            LineKind::Text => {
                // Plain prose at feature level is silently absorbed.
                state.pos += 1;
                end = state.consumed_end().unwrap_or(end);
            }
            _ => {
                state.add_error(
                    format!(
                        "Unexpected {} at feature level: \"{}\"",
                        kind_name(cur),
                        cur.text.trim()
                    ),
                    cur,
                );
                state.pos += 1;
                end = state.consumed_end().unwrap_or(end);
            }
        }
    }

    feature.range = Range::new(feature.range.start, end);
    Some(feature)
}

// --- Story -------------------------------------------------------------

fn parse_story(state: &mut ParserState<'_>) -> Option<StoryBlock> {
    let heading = state.advance()?;
    let title = match &heading.kind {
        LineKind::StoryHeading { title } => title.clone(),
        _ => String::new(),
    };

    let mut story = StoryBlock {
        title,
        intents: Vec::new(),
        behaviors: Vec::new(),
        edges: Vec::new(),
        tasks: Vec::new(),
        dependencies: Vec::new(),
        uncertainty_markers: Vec::new(),
        uncertainty_blocks: Vec::new(),
        range: line_range(heading),
    };
    let mut end = line_range(heading).end;

    loop {
        state.skip_blanks_and_separators();
        let Some(cur) = state.peek() else { break };

        match &cur.kind {
            // Story siblings are flat: exit on the next story or feature.
            LineKind::FeatureHeading { .. } | LineKind::StoryHeading { .. } => break,
            LineKind::TaskHeading { .. } => {
                if let Some(task) = parse_task(state) {
                    end = task.range.end;
                    story.tasks.push(task);
                }
            }
            LineKind::UncertaintyOpen { .. } => {
                if let Some(block) = parse_uncertainty_block(state) {
                    end = block.range.end;
                    story.uncertainty_blocks.push(block);
                }
            }
            LineKind::Keyword { keyword, .. } => match keyword.category() {
                KeywordCategory::Edge => {
                    if let Some(edge) = parse_edge(state) {
                        end = edge.range.end;
                        story.edges.push(edge);
                    }
                }
                KeywordCategory::Intent => {
                    if let Some(intent) = parse_intent_line(state) {
                        collect_marker(intent.uncertainty(), &mut story.uncertainty_markers);
                        story.intents.push(intent);
                    }
                    end = state.consumed_end().unwrap_or(end);
                }
                KeywordCategory::Behavior => {
                    if let Some(behavior) = parse_behavior_line(state) {
                        collect_marker(behavior.uncertainty(), &mut story.uncertainty_markers);
                        story.behaviors.push(behavior);
                    }
                    end = state.consumed_end().unwrap_or(end);
                }
                KeywordCategory::Dependency => {
                    if let Some(dep) = parse_dependency_line(state) {
                        collect_marker(dep.uncertainty(), &mut story.uncertainty_markers);
                        story.dependencies.push(dep);
                    }
                    end = state.consumed_end().unwrap_or(end);
                }
                // Stray Assign/Verify at story level is absorbed without error.
                KeywordCategory::TaskKeyword => {
                    state.pos += 1;
                    end = state.consumed_end().unwrap_or(end);
                }
            },
            _ => {
                // Stories are more permissive than the top level: text and
                // anything else unexpected is absorbed silently.
                state.pos += 1;
                end = state.consumed_end().unwrap_or(end);
            }
        }
    }

    story.range = Range::new(story.range.start, end);
    Some(story)
}

// --- Task --------------------------------------------------------------

fn parse_task(state: &mut ParserState<'_>) -> Option<TaskBlock> {
    let heading = state.advance()?;
    let title = match &heading.kind {
        LineKind::TaskHeading { title } => title.clone(),
        _ => String::new(),
    };

    let mut task = TaskBlock {
        title,
        assigns: Vec::new(),
        verifies: Vec::new(),
        dependencies: Vec::new(),
        uncertainty_markers: Vec::new(),
        uncertainty_blocks: Vec::new(),
        range: line_range(heading),
    };
    let mut end = line_range(heading).end;

    loop {
        state.skip_blanks_and_separators();
        let Some(cur) = state.peek() else { break };

        match &cur.kind {
            // Tasks cannot contain edges or nested headings.
            LineKind::FeatureHeading { .. }
            | LineKind::StoryHeading { .. }
            | LineKind::TaskHeading { .. } => break,
            LineKind::Keyword { keyword, .. } if *keyword == Keyword::Edge => break,
            LineKind::Keyword { keyword, .. } => match keyword {
                Keyword::Assign => {
                    if let Some(assign) = parse_assign_line(state) {
                        collect_marker(assign.uncertainty.as_ref(), &mut task.uncertainty_markers);
                        task.assigns.push(assign);
                    }
                    end = state.consumed_end().unwrap_or(end);
                }
                Keyword::Verify => {
                    if let Some(verify) = parse_verify_line(state) {
                        task.verifies.push(verify);
                    }
                    end = state.consumed_end().unwrap_or(end);
                }
                Keyword::Needs | Keyword::Blocks => {
                    if let Some(dep) = parse_dependency_line(state) {
                        collect_marker(dep.uncertainty(), &mut task.uncertainty_markers);
                        task.dependencies.push(dep);
                    }
                    end = state.consumed_end().unwrap_or(end);
                }
                _ => {
                    // Intents/behaviors inside a task are absorbed silently.
                    state.pos += 1;
                    end = state.consumed_end().unwrap_or(end);
                }
            },
            LineKind::UncertaintyOpen { .. } => {
                if let Some(block) = parse_uncertainty_block(state) {
                    end = block.range.end;
                    task.uncertainty_blocks.push(block);
                }
            }
            _ => {
                state.pos += 1;
                end = state.consumed_end().unwrap_or(end);
            }
        }
    }

    task.range = Range::new(task.range.start, end);
    Some(task)
}

// --- Edge --------------------------------------------------------------

fn strip_symmetric_quotes(s: &str) -> &str {
    if s.chars().count() >= 2 {
        for (open, close) in [('"', '"'), ('“', '”')] {
            if let Some(inner) = s.strip_prefix(open).and_then(|t| t.strip_suffix(close)) {
                return inner;
            }
        }
    }
    s
}

fn parse_edge(state: &mut ParserState<'_>) -> Option<EdgeBlock> {
    let edge_line = state.advance()?;
    let value = match &edge_line.kind {
        LineKind::Keyword { value, .. } => value.as_str(),
        _ => "",
    };
    let description = strip_symmetric_quotes(value).to_string();

    let mut edge = EdgeBlock {
        description,
        behaviors: Vec::new(),
        range: line_range(edge_line),
    };
    let mut end = line_range(edge_line).end;

    loop {
        state.skip_blanks_and_separators();
        let Some(cur) = state.peek() else { break };

        match &cur.kind {
            LineKind::FeatureHeading { .. }
            | LineKind::StoryHeading { .. }
            | LineKind::TaskHeading { .. }
            | LineKind::UncertaintyOpen { .. } => break,
            LineKind::Keyword { keyword, .. } => match keyword.category() {
                KeywordCategory::Behavior => {
                    if let Some(behavior) = parse_behavior_line(state) {
                        edge.behaviors.push(behavior);
                    }
                    end = state.consumed_end().unwrap_or(end);
                }
                // An Edge body is exclusively behaviors plus plain text.
                _ => break,
            },
            LineKind::Text => {
                state.pos += 1;
                end = state.consumed_end().unwrap_or(end);
            }
            _ => break,
        }
    }

    edge.range = Range::new(edge.range.start, end);
    Some(edge)
}

// --- Uncertainty block -------------------------------------------------

fn parse_uncertainty_block(state: &mut ParserState<'_>) -> Option<UncertaintyBlock> {
    let open_line = state.advance()?;
    let (kind, message) = match &open_line.kind {
        LineKind::UncertaintyOpen { kind, message } => (*kind, message.clone()),
        _ => (crate::models::UncertaintyKind::Pending, String::new()),
    };

    let mut block = UncertaintyBlock {
        kind,
        message,
        children: Vec::new(),
        range: line_range(open_line),
    };
    let mut end = line_range(open_line).end;

    // Closing `?end` is best-effort: an unterminated block runs to end of
    // input, swallowing everything as generic children.
    while let Some(cur) = state.peek() {
        match &cur.kind {
            LineKind::UncertaintyClose => {
                state.pos += 1;
                end = state.consumed_end().unwrap_or(end);
                break;
            }
            LineKind::Blank => {
                state.pos += 1;
            }
            LineKind::Keyword { keyword, .. }
                if keyword.category() == KeywordCategory::Behavior =>
            {
                if let Some(behavior) = parse_behavior_line(state) {
                    block.children.push(UncertaintyChild::Behavior(behavior));
                }
                end = state.consumed_end().unwrap_or(end);
            }
            LineKind::Keyword { keyword, .. } if keyword.category() == KeywordCategory::Intent => {
                if let Some(intent) = parse_intent_line(state) {
                    block.children.push(UncertaintyChild::Intent(intent));
                }
                end = state.consumed_end().unwrap_or(end);
            }
            LineKind::Keyword { keyword, .. }
                if keyword.category() == KeywordCategory::Dependency =>
            {
                if let Some(dep) = parse_dependency_line(state) {
                    block.children.push(UncertaintyChild::Dependency(dep));
                }
                end = state.consumed_end().unwrap_or(end);
            }
            _ => {
                block.children.push(UncertaintyChild::Text(TextLine {
                    text: cur.text.clone(),
                    range: line_range(cur),
                }));
                state.pos += 1;
                end = state.consumed_end().unwrap_or(end);
            }
        }
    }

    block.range = Range::new(block.range.start, end);
    Some(block)
}

// --- Line parsers ------------------------------------------------------

fn parse_intent_line(state: &mut ParserState<'_>) -> Option<IntentLine> {
    let line = state.advance()?;
    let LineKind::Keyword { keyword, value } = &line.kind else {
        return None;
    };
    let uncertainty = inline::uncertainty_markers(value, line.line_number)
        .into_iter()
        .next();
    let range = line_range(line);

    match keyword {
        Keyword::Goal => Some(IntentLine::Goal {
            text: value.clone(),
            uncertainty,
            range,
        }),
        Keyword::Persona => {
            let actor = inline::actor_references(value, line.line_number)
                .into_iter()
                .next();
            Some(IntentLine::Persona {
                text: value.clone(),
                actor,
                uncertainty,
                range,
            })
        }
        Keyword::Metric => Some(IntentLine::Metric {
            text: value.clone(),
            uncertainty,
            range,
        }),
        _ => None,
    }
}

fn parse_behavior_line(state: &mut ParserState<'_>) -> Option<BehaviorLine> {
    let line = state.advance()?;
    let LineKind::Keyword { keyword, value } = &line.kind else {
        return None;
    };
    let uncertainty = inline::uncertainty_markers(value, line.line_number)
        .into_iter()
        .next();
    let range = line_range(line);

    match keyword {
        Keyword::Given => Some(BehaviorLine::Given {
            text: value.clone(),
            uncertainty,
            range,
        }),
        Keyword::When => Some(BehaviorLine::When {
            text: value.clone(),
            uncertainty,
            range,
        }),
        Keyword::Then => Some(BehaviorLine::Then {
            text: value.clone(),
            obligation: inline::obligation(value, line.line_number),
            uncertainty,
            range,
        }),
        _ => None,
    }
}

fn parse_dependency_line(state: &mut ParserState<'_>) -> Option<DependencyLine> {
    let line = state.advance()?;
    let LineKind::Keyword { keyword, value } = &line.kind else {
        return None;
    };
    let reference = inline::references(value, line.line_number)
        .into_iter()
        .next();
    let uncertainty = inline::uncertainty_markers(value, line.line_number)
        .into_iter()
        .next();
    let range = line_range(line);

    match keyword {
        Keyword::Needs => Some(DependencyLine::Needs {
            text: value.clone(),
            reference,
            uncertainty,
            range,
        }),
        Keyword::Blocks => Some(DependencyLine::Blocks {
            text: value.clone(),
            reference,
            uncertainty,
            range,
        }),
        _ => None,
    }
}

fn parse_assign_line(state: &mut ParserState<'_>) -> Option<AssignLine> {
    let line = state.advance()?;
    let LineKind::Keyword { value, .. } = &line.kind else {
        return None;
    };
    Some(AssignLine {
        text: value.clone(),
        actor: inline::actor_references(value, line.line_number)
            .into_iter()
            .next(),
        uncertainty: inline::uncertainty_markers(value, line.line_number)
            .into_iter()
            .next(),
        range: line_range(line),
    })
}

fn parse_verify_line(state: &mut ParserState<'_>) -> Option<VerifyLine> {
    let line = state.advance()?;
    let LineKind::Keyword { value, .. } = &line.kind else {
        return None;
    };
    Some(VerifyLine {
        text: value.clone(),
        range: line_range(line),
    })
}

fn collect_marker(marker: Option<&UncertaintyMarker>, markers: &mut Vec<UncertaintyMarker>) {
    if let Some(m) = marker {
        markers.push(m.clone());
    }
}

// --- Entry point -------------------------------------------------------

/// Build a [`PlanDocument`] from pre-classified body lines.
///
/// Frontmatter lines must already be excluded upstream; see
/// [`super::parse_plan_file`] for the full pipeline.
pub fn parse(
    classified: &[ClassifiedLine],
    frontmatter: Option<Frontmatter>,
    file_path: Option<String>,
) -> PlanDocument {
    let mut state = ParserState::new(classified);
    let feature = parse_feature(&mut state);

    PlanDocument {
        file_path,
        frontmatter,
        feature,
        errors: state.errors,
        comments: state.comments,
    }
}
