//! Uncertainty report: what is still undecided, assumed, or at risk across
//! a set of documents, and which draft to ready transitions are blocked.

use serde::Serialize;

use crate::models::{PlanDocument, UncertaintyBlock, UncertaintyKind, UncertaintyMarker};

#[derive(Debug, Clone, Serialize)]
pub struct UncertaintyDetail {
    #[serde(rename = "type")]
    pub kind: UncertaintyKind,
    pub message: String,
    pub line: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UncertaintySummary {
    pub file_path: String,
    pub id: String,
    pub status: String,
    pub pending: usize,
    pub assumption: usize,
    pub alternative: usize,
    pub risk: usize,
    pub details: Vec<UncertaintyDetail>,
}

impl UncertaintySummary {
    pub fn count(&self, kind: UncertaintyKind) -> usize {
        match kind {
            UncertaintyKind::Pending => self.pending,
            UncertaintyKind::Assumption => self.assumption,
            UncertaintyKind::Alternative => self.alternative,
            UncertaintyKind::Risk => self.risk,
        }
    }

    fn bump(&mut self, kind: UncertaintyKind) {
        match kind {
            UncertaintyKind::Pending => self.pending += 1,
            UncertaintyKind::Assumption => self.assumption += 1,
            UncertaintyKind::Alternative => self.alternative += 1,
            UncertaintyKind::Risk => self.risk += 1,
        }
    }
}

/// Collect every uncertainty annotation in a document into a flat summary.
pub fn collect_uncertainty(doc: &PlanDocument) -> UncertaintySummary {
    let mut summary = UncertaintySummary {
        file_path: doc.file_path.clone().unwrap_or_else(|| "<unknown>".to_string()),
        id: doc
            .frontmatter
            .as_ref()
            .map(|fm| fm.id.clone())
            .unwrap_or_else(|| "<no-id>".to_string()),
        status: doc
            .frontmatter
            .as_ref()
            .map(|fm| fm.status.to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        pending: 0,
        assumption: 0,
        alternative: 0,
        risk: 0,
        details: Vec::new(),
    };

    let add_marker = |summary: &mut UncertaintySummary, m: &UncertaintyMarker| {
        summary.bump(m.kind);
        summary.details.push(UncertaintyDetail {
            kind: m.kind,
            message: m.message.clone(),
            line: m.range.start.line,
        });
    };
    let add_block = |summary: &mut UncertaintySummary, b: &UncertaintyBlock| {
        summary.bump(b.kind);
        summary.details.push(UncertaintyDetail {
            kind: b.kind,
            message: b.message.clone(),
            line: b.range.start.line,
        });
    };

    if let Some(feature) = &doc.feature {
        for m in &feature.uncertainty_markers {
            add_marker(&mut summary, m);
        }
        for b in &feature.uncertainty_blocks {
            add_block(&mut summary, b);
        }
        for story in &feature.stories {
            for m in &story.uncertainty_markers {
                add_marker(&mut summary, m);
            }
            for b in &story.uncertainty_blocks {
                add_block(&mut summary, b);
            }
            for task in &story.tasks {
                for m in &task.uncertainty_markers {
                    add_marker(&mut summary, m);
                }
                for b in &task.uncertainty_blocks {
                    add_block(&mut summary, b);
                }
            }
        }
    }

    summary
}

pub fn format_uncertainty_report(summaries: &[UncertaintySummary]) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("[UNCERTAINTY REPORT]".to_string());
    lines.push(String::new());

    let mut totals = [0usize; 4];

    for s in summaries {
        lines.push(format!("{} ({})", s.id, s.status));

        for (i, kind) in UncertaintyKind::ALL.into_iter().enumerate() {
            let count = s.count(kind);
            if count > 0 {
                let label = format!("  ?{kind}:");
                lines.push(format!("{label:<20}{count}"));
                totals[i] += count;
            }
        }

        for d in &s.details {
            lines.push(format!("    L{}: ?{} - {}", d.line, d.kind, d.message));
        }

        lines.push(String::new());
    }

    lines.push("-".repeat(40));

    let total_parts: Vec<String> = UncertaintyKind::ALL
        .into_iter()
        .enumerate()
        .filter(|(i, _)| totals[*i] > 0)
        .map(|(i, kind)| format!("?{kind} {}", totals[i]))
        .collect();
    lines.push(format!("Total: {}", total_parts.join(" | ")));

    // Draft documents with open ?pending cannot move to ready yet.
    let blocked: Vec<&UncertaintySummary> = summaries
        .iter()
        .filter(|s| s.status == "draft" && s.pending > 0)
        .collect();
    if !blocked.is_empty() {
        lines.push(String::new());
        for s in blocked {
            lines.push(format!(
                "! {}: resolve {} ?pending marker(s) before moving draft -> ready",
                s.id, s.pending
            ));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::parse_plan_file;

    #[test]
    fn collects_markers_and_blocks_across_the_tree() {
        let source = "\
---
type: feature
id: feat-u
status: draft
---
# Feature: U
Goal: g ?pending(\"scope\")
Metric: m

## Story: S
When: w ?risk(\"latency\")
Then: t [MUST]

?alternative \"two providers\"
Given: either works
?end

### Task: T
Assign: @dev ?assumption(\"amy is free\")
";
        let doc = parse_plan_file(source, Some("u.plan"));
        let summary = collect_uncertainty(&doc);

        assert_eq!(summary.id, "feat-u");
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.risk, 1);
        assert_eq!(summary.alternative, 1);
        assert_eq!(summary.assumption, 1);
        assert_eq!(summary.details.len(), 4);

        let report = format_uncertainty_report(&[summary]);
        assert!(report.contains("[UNCERTAINTY REPORT]"));
        assert!(report.contains("feat-u (draft)"));
        assert!(report.contains("?pending"));
        assert!(report.contains("resolve 1 ?pending marker(s)"));
    }
}
