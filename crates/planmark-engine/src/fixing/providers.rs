//! The built-in fix providers, keyed by rule id.

use std::collections::BTreeMap;

use crate::models::Diagnostic;

use super::{Fix, FixEdit, FixProvider, insertion_index_after_run};

const INTENT_PREFIXES: [&str; 3] = ["Goal:", "Persona:", "Metric:"];
const INTENT_AND_BEHAVIOR_PREFIXES: [&str; 6] =
    ["Goal:", "Persona:", "Metric:", "Given:", "When:", "Then:"];

/// PLAN-001: insert a blank `Goal: ` line right after the Feature heading.
struct FeatureGoalFix;

impl FixProvider for FeatureGoalFix {
    fn rule_id(&self) -> &'static str {
        "PLAN-001"
    }

    fn fixes(&self, diagnostic: &Diagnostic, _source_lines: &[String]) -> Vec<Fix> {
        let heading_line = diagnostic.range.start.line;
        vec![Fix {
            rule_id: self.rule_id(),
            range: diagnostic.range,
            description: "Insert Goal: after the Feature heading".to_string(),
            edit: FixEdit::InsertLine {
                index: heading_line,
                text: "Goal: ".to_string(),
            },
        }]
    }
}

/// PLAN-002: insert the missing `When: ` / `Then:  [MUST]` after the
/// Story's existing intent/behavior run.
struct StoryBehaviorFix;

impl FixProvider for StoryBehaviorFix {
    fn rule_id(&self) -> &'static str {
        "PLAN-002"
    }

    fn fixes(&self, diagnostic: &Diagnostic, source_lines: &[String]) -> Vec<Fix> {
        let heading_line = diagnostic.range.start.line;
        let insert_index =
            insertion_index_after_run(source_lines, heading_line, &INTENT_AND_BEHAVIOR_PREFIXES);

        let mut fixes = Vec::new();
        if diagnostic.message.contains("When:") {
            fixes.push(Fix {
                rule_id: self.rule_id(),
                range: diagnostic.range,
                description: "Insert When: into the Story".to_string(),
                edit: FixEdit::InsertLine {
                    index: insert_index,
                    text: "When: ".to_string(),
                },
            });
        }
        if diagnostic.message.contains("Then:") {
            fixes.push(Fix {
                rule_id: self.rule_id(),
                range: diagnostic.range,
                description: "Insert Then: into the Story".to_string(),
                edit: FixEdit::InsertLine {
                    index: insert_index,
                    text: "Then:  [MUST]".to_string(),
                },
            });
        }
        fixes
    }
}

/// PLAN-003: insert `Assign: @` right after the Task heading.
struct TaskAssignFix;

impl FixProvider for TaskAssignFix {
    fn rule_id(&self) -> &'static str {
        "PLAN-003"
    }

    fn fixes(&self, diagnostic: &Diagnostic, _source_lines: &[String]) -> Vec<Fix> {
        let heading_line = diagnostic.range.start.line;
        vec![Fix {
            rule_id: self.rule_id(),
            range: diagnostic.range,
            description: "Insert Assign: @ after the Task heading".to_string(),
            edit: FixEdit::InsertLine {
                index: heading_line,
                text: "Assign: @".to_string(),
            },
        }]
    }
}

/// PLAN-006: append ` [MUST]` to the offending Then line in place.
struct ThenObligationFix;

impl FixProvider for ThenObligationFix {
    fn rule_id(&self) -> &'static str {
        "PLAN-006"
    }

    fn fixes(&self, diagnostic: &Diagnostic, _source_lines: &[String]) -> Vec<Fix> {
        let Some(line_index) = diagnostic.range.start.line.checked_sub(1) else {
            return Vec::new();
        };
        vec![Fix {
            rule_id: self.rule_id(),
            range: diagnostic.range,
            description: "Append [MUST] to the Then: line".to_string(),
            edit: FixEdit::AppendToLine {
                index: line_index,
                suffix: " [MUST]".to_string(),
            },
        }]
    }
}

/// PLAN-010: insert `Metric: ` after the Feature's intent run.
struct FeatureMetricFix;

impl FixProvider for FeatureMetricFix {
    fn rule_id(&self) -> &'static str {
        "PLAN-010"
    }

    fn fixes(&self, diagnostic: &Diagnostic, source_lines: &[String]) -> Vec<Fix> {
        let heading_line = diagnostic.range.start.line;
        let insert_index = insertion_index_after_run(source_lines, heading_line, &INTENT_PREFIXES);
        vec![Fix {
            rule_id: self.rule_id(),
            range: diagnostic.range,
            description: "Insert Metric: into the Feature".to_string(),
            edit: FixEdit::InsertLine {
                index: insert_index,
                text: "Metric: ".to_string(),
            },
        }]
    }
}

/// Provider registry: populated once at construction, read thereafter.
pub struct FixRegistry {
    providers: BTreeMap<&'static str, Box<dyn FixProvider>>,
}

impl Default for FixRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FixRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            providers: BTreeMap::new(),
        };
        registry.register(Box::new(FeatureGoalFix));
        registry.register(Box::new(StoryBehaviorFix));
        registry.register(Box::new(TaskAssignFix));
        registry.register(Box::new(ThenObligationFix));
        registry.register(Box::new(FeatureMetricFix));
        registry
    }

    fn register(&mut self, provider: Box<dyn FixProvider>) {
        self.providers.insert(provider.rule_id(), provider);
    }

    pub fn provider(&self, rule_id: &str) -> Option<&dyn FixProvider> {
        self.providers.get(rule_id).map(Box::as_ref)
    }

    pub fn fixable_rule_ids(&self) -> Vec<&'static str> {
        self.providers.keys().copied().collect()
    }
}
