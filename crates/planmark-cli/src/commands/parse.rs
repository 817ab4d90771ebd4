use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use planmark_engine::parse_plan_file;

use crate::OutputFormat;

pub fn run(file: &Path, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let doc = parse_plan_file(&source, Some(&file.to_string_lossy()));

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&doc)?),
        OutputFormat::Text => {
            println!("File: {}", file.display());
            if let Some(fm) = &doc.frontmatter {
                println!("  type: {}", fm.plan_type);
                println!("  id: {}", fm.id);
                println!("  status: {}", fm.status);
            }
            if let Some(feature) = &doc.feature {
                println!("  Feature: {}", feature.title);
                println!("    Intents: {}", feature.intents.len());
                println!("    Dependencies: {}", feature.dependencies.len());
                println!("    Stories: {}", feature.stories.len());
                for story in &feature.stories {
                    println!("      Story: {}", story.title);
                    println!("        Behaviors: {}", story.behaviors.len());
                    println!("        Edges: {}", story.edges.len());
                    println!("        Tasks: {}", story.tasks.len());
                }
            }
            if !doc.errors.is_empty() {
                println!("  Parse errors: {}", doc.errors.len());
                for err in &doc.errors {
                    println!("    L{}: {}", err.range.start.line, err.message);
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
