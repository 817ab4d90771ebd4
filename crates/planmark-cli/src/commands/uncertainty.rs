use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use planmark_engine::parse_plan_file;
use planmark_engine::report::{
    UncertaintySummary, collect_uncertainty, format_uncertainty_report,
};

use crate::OutputFormat;

pub fn run(files: &[PathBuf], format: OutputFormat) -> anyhow::Result<ExitCode> {
    let mut summaries: Vec<UncertaintySummary> = Vec::new();

    for file in files {
        let source = std::fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let doc = parse_plan_file(&source, Some(&file.to_string_lossy()));
        summaries.push(collect_uncertainty(&doc));
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
        OutputFormat::Text => println!("{}", format_uncertainty_report(&summaries)),
    }

    Ok(ExitCode::SUCCESS)
}
