//! Rules over uncertainty annotations: readiness gating and staleness.

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{
    Diagnostic, FeatureBlock, Range, Severity, Status, UncertaintyBlock, UncertaintyKind,
    UncertaintyMarker,
};

use super::super::rule::{LintContext, LintRule};
use super::diag;

/// Visit every uncertainty marker and block in the feature tree.
fn visit_uncertainty<'a>(
    feature: &'a FeatureBlock,
    mut on_marker: impl FnMut(&'a UncertaintyMarker),
    mut on_block: impl FnMut(&'a UncertaintyBlock),
) {
    let mut visit = |markers: &'a [UncertaintyMarker], blocks: &'a [UncertaintyBlock]| {
        markers.iter().for_each(&mut on_marker);
        blocks.iter().for_each(&mut on_block);
    };

    visit(&feature.uncertainty_markers, &feature.uncertainty_blocks);
    for story in &feature.stories {
        visit(&story.uncertainty_markers, &story.uncertainty_blocks);
        for task in &story.tasks {
            visit(&task.uncertainty_markers, &task.uncertainty_blocks);
        }
    }
}

/// PLAN-004: a document cannot be `ready` while any `?pending` remains.
pub struct ReadyPending;

impl LintRule for ReadyPending {
    fn id(&self) -> &'static str {
        "PLAN-004"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn description(&self) -> &'static str {
        "status is ready but ?pending markers remain"
    }

    fn check(&self, ctx: &LintContext<'_>) -> Vec<Diagnostic> {
        let document = ctx.document;
        if document.frontmatter.as_ref().map(|fm| fm.status) != Some(Status::Ready) {
            return Vec::new();
        }
        let Some(feature) = &document.feature else {
            return Vec::new();
        };

        let pending = std::cell::Cell::new(0usize);
        visit_uncertainty(
            feature,
            |m| {
                if m.kind == UncertaintyKind::Pending {
                    pending.set(pending.get() + 1);
                }
            },
            |b| {
                if b.kind == UncertaintyKind::Pending {
                    pending.set(pending.get() + 1);
                }
            },
        );
        let pending = pending.get();

        if pending == 0 {
            return Vec::new();
        }

        vec![diag(
            self,
            format!(
                "status is \"ready\" but {pending} ?pending marker(s) remain; resolve all ?pending before moving draft -> ready"
            ),
            feature.range,
            ctx,
        )]
    }
}

/// Parse a frontmatter date: plain `YYYY-MM-DD` or RFC 3339.
fn parse_plan_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// Whole days elapsed since the given date string; `None` if unparseable.
pub(crate) fn days_since(date: &str, now: DateTime<Utc>) -> Option<i64> {
    parse_plan_date(date).map(|d| (now - d).num_days())
}

const STALE_AFTER_DAYS: i64 = 30;

/// PLAN-007: `?assumption` annotations unrevisited for 30 days or more.
///
/// Uses `updated` (falling back to `created`) as the document's last-touched
/// date; documents without either are skipped.
pub struct StaleAssumption;

impl StaleAssumption {
    fn check_at(&self, ctx: &LintContext<'_>, now: DateTime<Utc>) -> Vec<Diagnostic> {
        let document = ctx.document;
        let Some(frontmatter) = &document.frontmatter else {
            return Vec::new();
        };
        let Some(date) = frontmatter.updated.as_ref().or(frontmatter.created.as_ref()) else {
            return Vec::new();
        };
        let Some(days) = days_since(date, now) else {
            return Vec::new();
        };
        if days < STALE_AFTER_DAYS {
            return Vec::new();
        }
        let Some(feature) = &document.feature else {
            return Vec::new();
        };

        let stale: std::cell::RefCell<Vec<(Range, bool)>> = std::cell::RefCell::new(Vec::new());
        visit_uncertainty(
            feature,
            |m| {
                if m.kind == UncertaintyKind::Assumption {
                    stale.borrow_mut().push((m.range, false));
                }
            },
            |b| {
                if b.kind == UncertaintyKind::Assumption {
                    stale.borrow_mut().push((b.range, true));
                }
            },
        );
        let stale = stale.into_inner();

        stale
            .into_iter()
            .map(|(range, is_block)| {
                let what = if is_block {
                    "?assumption block"
                } else {
                    "?assumption marker"
                };
                diag(
                    self,
                    format!("{what} unresolved for {days} days (last updated: {date})"),
                    range,
                    ctx,
                )
            })
            .collect()
    }
}

impl LintRule for StaleAssumption {
    fn id(&self) -> &'static str {
        "PLAN-007"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn description(&self) -> &'static str {
        "?assumption unresolved for 30 days or more"
    }

    fn check(&self, ctx: &LintContext<'_>) -> Vec<Diagnostic> {
        self.check_at(ctx, Utc::now())
    }
}
