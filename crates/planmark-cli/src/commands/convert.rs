use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use planmark_engine::convert::{ConvertFormat, convert};
use planmark_engine::parse_plan_file;

pub fn run(file: &Path, to: &str, output: Option<PathBuf>) -> anyhow::Result<ExitCode> {
    let format: ConvertFormat = match to.parse() {
        Ok(format) => format,
        Err(e) => {
            eprintln!("{e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    let source = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let doc = parse_plan_file(&source, Some(&file.to_string_lossy()));
    let converted = convert(&doc, format)?;

    match output {
        Some(path) => {
            std::fs::write(&path, &converted)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Converted to {format}: {}", path.display());
        }
        None => print!("{converted}"),
    }

    Ok(ExitCode::SUCCESS)
}
