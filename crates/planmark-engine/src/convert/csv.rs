//! CSV projection, RFC 4180: one row per feature/story/task.

use crate::models::PlanDocument;
use crate::parsing::inline::{strip_obligation, strip_uncertainty};

fn clean(text: &str) -> String {
    strip_obligation(&strip_uncertainty(text))
}

/// Fields containing a comma, double quote, CR, or LF are wrapped in double
/// quotes with internal quotes doubled; anything else is emitted unquoted.
fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn row(fields: &[String]) -> String {
    fields
        .iter()
        .map(|f| escape_csv(f))
        .collect::<Vec<_>>()
        .join(",")
}

const HEADERS: [&str; 8] = [
    "Level",
    "Title",
    "Goal",
    "When",
    "Then",
    "Assignee",
    "Status",
    "Dependencies",
];

pub(super) fn convert(doc: &PlanDocument) -> String {
    let header_row = HEADERS.map(String::from);
    let mut rows: Vec<String> = vec![row(&header_row)];

    let Some(feature) = &doc.feature else {
        return rows.remove(0);
    };

    let status = doc
        .frontmatter
        .as_ref()
        .map(|fm| fm.status.to_string())
        .unwrap_or_default();

    let joined = |parts: Vec<String>| parts.join("; ");

    let feature_goal = joined(
        feature
            .intents
            .iter()
            .filter(|i| i.is_goal())
            .map(|i| clean(i.text()))
            .collect(),
    );
    let feature_deps = joined(
        feature
            .dependencies
            .iter()
            .map(|d| clean(d.text()))
            .collect(),
    );
    rows.push(row(&[
        "Feature".to_string(),
        feature.title.clone(),
        feature_goal,
        String::new(),
        String::new(),
        String::new(),
        status,
        feature_deps,
    ]));

    for story in &feature.stories {
        let story_goal = joined(
            story
                .intents
                .iter()
                .filter(|i| i.is_goal())
                .map(|i| clean(i.text()))
                .collect(),
        );
        let whens = joined(
            story
                .behaviors
                .iter()
                .filter(|b| b.is_when())
                .map(|b| clean(b.text()))
                .collect(),
        );
        let thens = joined(
            story
                .behaviors
                .iter()
                .filter(|b| b.is_then())
                .map(|b| clean(b.text()))
                .collect(),
        );
        let story_deps = joined(
            story
                .dependencies
                .iter()
                .map(|d| clean(d.text()))
                .collect(),
        );
        rows.push(row(&[
            "Story".to_string(),
            story.title.clone(),
            story_goal,
            whens,
            thens,
            String::new(),
            String::new(),
            story_deps,
        ]));

        for task in &story.tasks {
            let assignees = joined(
                task.assigns
                    .iter()
                    .map(|a| match &a.actor {
                        Some(actor) => format!("@{}", actor.name),
                        None => clean(&a.text),
                    })
                    .collect(),
            );
            let task_deps = joined(
                task.dependencies
                    .iter()
                    .map(|d| clean(d.text()))
                    .collect(),
            );
            rows.push(row(&[
                "Task".to_string(),
                task.title.clone(),
                String::new(),
                String::new(),
                String::new(),
                assignees,
                String::new(),
                task_deps,
            ]));
        }
    }

    rows.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("plain", "plain")]
    #[case("has,comma", "\"has,comma\"")]
    #[case("has \"quote\"", "\"has \"\"quote\"\"\"")]
    #[case("has\nnewline", "\"has\nnewline\"")]
    #[case("has\rreturn", "\"has\rreturn\"")]
    fn escapes_per_rfc_4180(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(escape_csv(input), expected);
    }
}
