use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use planmark_engine::format::format_source;

pub fn run(files: &[PathBuf], write: bool, check: bool) -> anyhow::Result<ExitCode> {
    let mut needs_formatting = false;

    for file in files {
        let source = std::fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let result = format_source(&source, Some(&file.to_string_lossy()));

        if check {
            if result.changed {
                println!("{}: needs formatting", file.display());
                needs_formatting = true;
            }
        } else if write {
            if result.changed {
                std::fs::write(file, &result.formatted)
                    .with_context(|| format!("failed to write {}", file.display()))?;
                println!("{}: formatted", file.display());
            } else {
                println!("{}: already formatted", file.display());
            }
        } else {
            print!("{}", result.formatted);
        }
    }

    Ok(if check && needs_formatting {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
