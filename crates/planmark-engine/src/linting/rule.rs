use std::collections::BTreeMap;

use crate::models::{Diagnostic, PlanDocument, Severity};

/// Everything a rule can see. `project_files` and `duplicate_ids` are only
/// populated during project-level linting; cross-file rules are skipped when
/// they are absent.
pub struct LintContext<'a> {
    pub document: &'a PlanDocument,
    pub project_files: Option<&'a BTreeMap<String, PlanDocument>>,
    pub duplicate_ids: Option<&'a BTreeMap<String, Vec<String>>>,
}

/// A single lint rule. Implementations must be pure: same context in, same
/// diagnostics out.
pub trait LintRule {
    fn id(&self) -> &'static str;
    fn severity(&self) -> Severity;
    fn description(&self) -> &'static str;
    /// Whether the rule needs visibility into the whole project document set.
    fn cross_file(&self) -> bool {
        false
    }
    fn check(&self, ctx: &LintContext<'_>) -> Vec<Diagnostic>;
}
