//! Full-file parsing tests over the fixture documents.

use planmark_engine::models::{
    BehaviorLine, PlanType, Priority, Reference, Status, UncertaintyChild, UncertaintyKind,
};
use planmark_engine::parse_plan_file;

fn fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn social_login_fixture_parses_without_errors() {
    let source = fixture("feat-social-login.plan");
    let doc = parse_plan_file(&source, Some("feat-social-login.plan"));

    assert!(doc.errors.is_empty(), "unexpected errors: {:?}", doc.errors);
    assert_eq!(doc.file_path.as_deref(), Some("feat-social-login.plan"));

    let fm = doc.frontmatter.as_ref().unwrap();
    assert_eq!(fm.plan_type, PlanType::Feature);
    assert_eq!(fm.id, "feat-social-login");
    assert_eq!(fm.status, Status::Draft);
    assert_eq!(fm.priority, Some(Priority::High));
    assert_eq!(fm.owner.as_deref(), Some("@identity-team"));
    assert_eq!(
        fm.tags.as_deref(),
        Some(&["auth".to_string(), "oauth".to_string()][..])
    );
    assert_eq!(fm.updated.as_deref(), Some("2026-07-15"));

    let feature = doc.feature.as_ref().unwrap();
    assert_eq!(feature.title, "Social Login");

    // One full-line comment was recorded.
    assert_eq!(doc.comments.len(), 1);
    assert_eq!(doc.comments[0].start.line, 17);
}

#[test]
fn social_login_feature_intents_and_dependencies() {
    let doc = parse_plan_file(&fixture("feat-social-login.plan"), None);
    let feature = doc.feature.unwrap();

    let goals = feature.intents.iter().filter(|i| i.is_goal()).count();
    let metrics = feature.intents.iter().filter(|i| i.is_metric()).count();
    assert_eq!(goals, 1);
    assert_eq!(metrics, 2);
    assert_eq!(feature.intents.len(), 4);

    assert_eq!(feature.dependencies.len(), 3);
    let needs = feature.dependencies.iter().filter(|d| d.is_needs()).count();
    assert_eq!(needs, 2);

    // The doc: reference keeps its own variant.
    assert!(matches!(
        feature.dependencies[1].reference(),
        Some(Reference::Doc { id, .. }) if id == "oauth-flows"
    ));
}

#[test]
fn social_login_stories_edges_and_tasks() {
    let doc = parse_plan_file(&fixture("feat-social-login.plan"), None);
    let feature = doc.feature.unwrap();
    assert_eq!(feature.stories.len(), 2);

    let google = &feature.stories[0];
    assert_eq!(google.title, "Sign up with Google");
    assert_eq!(google.behaviors.len(), 4);
    assert_eq!(
        google.behaviors.iter().filter(|b| b.is_then()).count(),
        2
    );

    assert_eq!(google.edges.len(), 2);
    assert_eq!(google.edges[0].description, "Google account has no email");
    assert_eq!(google.edges[0].behaviors.len(), 2);

    assert_eq!(google.tasks.len(), 2);
    let callback = &google.tasks[0];
    assert_eq!(callback.title, "Implement OAuth callback handler");
    assert_eq!(callback.assigns.len(), 1);
    assert_eq!(
        callback.assigns[0].actor.as_ref().unwrap().name,
        "priya"
    );
    assert_eq!(callback.verifies.len(), 2);
    assert_eq!(callback.dependencies.len(), 1);
    assert!(matches!(
        callback.dependencies[0].reference(),
        Some(Reference::Plan { id, fragment: Some(fragment), .. })
            if id == "feat-accounts" && fragment == "story-provisioning"
    ));
}

#[test]
fn social_login_uncertainty_block_collects_typed_children() {
    let doc = parse_plan_file(&fixture("feat-social-login.plan"), None);
    let feature = doc.feature.unwrap();

    let apple = &feature.stories[1];
    assert_eq!(apple.uncertainty_blocks.len(), 1);
    let block = &apple.uncertainty_blocks[0];
    assert_eq!(block.kind, UncertaintyKind::Pending);
    assert!(block.message.starts_with("Do we need Apple's"));
    assert_eq!(block.children.len(), 3);
    assert!(matches!(
        block.children[2],
        UncertaintyChild::Behavior(BehaviorLine::Then { .. })
    ));

    // The block's Then carries its obligation.
    let UncertaintyChild::Behavior(BehaviorLine::Then { obligation, .. }) = &block.children[2]
    else {
        panic!("expected a Then child");
    };
    assert!(obligation.is_some());
}

#[test]
fn block_ranges_span_heading_to_last_consumed_line() {
    let doc = parse_plan_file(&fixture("feat-social-login.plan"), None);
    let feature = doc.feature.unwrap();

    // Feature starts at its heading and ends at the last content line.
    assert_eq!(feature.range.start.line, 15);
    let last_story = feature.stories.last().unwrap();
    assert_eq!(feature.range.end.line, last_story.range.end.line);

    // Stories span into their last task.
    let google = &feature.stories[0];
    let last_task = google.tasks.last().unwrap();
    assert_eq!(google.range.end.line, last_task.range.end.line);
}

#[test]
fn second_feature_heading_stops_consumption() {
    let doc = parse_plan_file(
        "# Feature: First\nGoal: g\n# Feature: Second\nGoal: other",
        None,
    );
    let feature = doc.feature.unwrap();
    assert_eq!(feature.title, "First");
    assert_eq!(feature.intents.len(), 1);
    // Nothing after the second heading is reported or parsed.
    assert!(doc.errors.is_empty());
}

#[test]
fn unterminated_uncertainty_block_swallows_the_rest() {
    let doc = parse_plan_file(
        "# Feature: F\nGoal: g\n?risk \"open ended\"\nGiven: g\n## Story: Swallowed",
        None,
    );
    let feature = doc.feature.unwrap();
    assert!(feature.stories.is_empty());
    assert_eq!(feature.uncertainty_blocks.len(), 1);
    let block = &feature.uncertainty_blocks[0];
    // The story heading became a generic text child.
    assert_eq!(block.children.len(), 2);
    assert!(matches!(block.children[1], UncertaintyChild::Text(_)));
    assert!(doc.errors.is_empty());
}

#[test]
fn tasks_do_not_contain_edges() {
    let doc = parse_plan_file(
        "# Feature: F\nGoal: g\n## Story: S\nWhen: w\nThen: t [MUST]\n### Task: T\nAssign: @a\nEdge: \"belongs to the story\"\n  Then: handled [MUST]",
        None,
    );
    let feature = doc.feature.unwrap();
    let story = &feature.stories[0];
    assert_eq!(story.tasks.len(), 1);
    assert!(story.tasks[0].dependencies.is_empty());
    // The Edge after the task attaches to the story, not the task.
    assert_eq!(story.edges.len(), 1);
}

#[test]
fn multiline_comments_are_recorded_with_their_full_span() {
    let doc = parse_plan_file(
        "<!-- start\nmiddle\nend -->\n# Feature: F\nGoal: g",
        None,
    );
    assert_eq!(doc.comments.len(), 1);
    assert_eq!(doc.comments[0].start.line, 1);
    assert_eq!(doc.comments[0].end.line, 3);
    assert_eq!(doc.feature.unwrap().title, "F");
    assert!(doc.errors.is_empty());
}

#[test]
fn reparsing_identical_input_is_pure() {
    let source = fixture("feat-social-login.plan");
    let first = parse_plan_file(&source, Some("a.plan"));
    let second = parse_plan_file(&source, Some("a.plan"));
    assert_eq!(first, second);
    assert_eq!(first.errors.len(), second.errors.len());
}
