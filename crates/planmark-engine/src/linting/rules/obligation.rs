use crate::models::{BehaviorLine, Diagnostic, Severity, UncertaintyChild};

use super::super::rule::{LintContext, LintRule};
use super::diag;

/// PLAN-006: every Then outcome needs a normative strength tag.
///
/// Checks story behaviors, Edge behaviors, and Then lines nested inside
/// story uncertainty blocks.
pub struct ThenObligation;

impl LintRule for ThenObligation {
    fn id(&self) -> &'static str {
        "PLAN-006"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn description(&self) -> &'static str {
        "Then: clause has no [MUST/SHOULD/MAY] obligation"
    }

    fn check(&self, ctx: &LintContext<'_>) -> Vec<Diagnostic> {
        let Some(feature) = &ctx.document.feature else {
            return Vec::new();
        };

        let mut diagnostics = Vec::new();
        let mut check_behaviors = |behaviors: &mut dyn Iterator<Item = &BehaviorLine>| {
            for b in behaviors {
                if let BehaviorLine::Then {
                    obligation: None,
                    range,
                    ..
                } = b
                {
                    diagnostics.push(diag(
                        self,
                        "Then: clause has no obligation level ([MUST], [SHOULD], [MAY])"
                            .to_string(),
                        *range,
                        ctx,
                    ));
                }
            }
        };

        for story in &feature.stories {
            check_behaviors(&mut story.behaviors.iter());
            for edge in &story.edges {
                check_behaviors(&mut edge.behaviors.iter());
            }
            for ub in &story.uncertainty_blocks {
                check_behaviors(
                    &mut ub
                        .children
                        .iter()
                        .filter_map(UncertaintyChild::as_behavior),
                );
            }
        }

        diagnostics
    }
}
