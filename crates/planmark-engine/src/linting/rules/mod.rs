//! The built-in rule catalog, PLAN-001 through PLAN-014.

mod cross_file;
mod obligation;
mod persona;
mod structure;
mod uncertainty;

pub use cross_file::{BlocksDraft, CircularDependency, DuplicateId, NeedsExists};
pub use obligation::ThenObligation;
pub use persona::UnusedPersona;
pub use structure::{FeatureGoal, FeatureMetric, StoryBehavior, StoryEdge, StoryTask, TaskAssign};
pub use uncertainty::{ReadyPending, StaleAssumption};

use crate::models::{Diagnostic, Range};

use super::rule::{LintContext, LintRule};

/// The default registry, in catalog order.
pub fn all_rules() -> Vec<Box<dyn LintRule>> {
    vec![
        Box::new(FeatureGoal),
        Box::new(StoryBehavior),
        Box::new(TaskAssign),
        Box::new(ReadyPending),
        Box::new(StoryEdge),
        Box::new(ThenObligation),
        Box::new(StaleAssumption),
        Box::new(BlocksDraft),
        Box::new(NeedsExists),
        Box::new(FeatureMetric),
        Box::new(DuplicateId),
        Box::new(CircularDependency),
        Box::new(UnusedPersona),
        Box::new(StoryTask),
    ]
}

pub(super) fn diag(
    rule: &dyn LintRule,
    message: String,
    range: Range,
    ctx: &LintContext<'_>,
) -> Diagnostic {
    Diagnostic {
        rule_id: rule.id().to_string(),
        severity: rule.severity(),
        message,
        range,
        file_path: ctx.document.file_path.clone(),
    }
}
