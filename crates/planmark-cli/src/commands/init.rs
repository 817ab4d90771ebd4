use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use planmark_engine::scaffold::{
    find_similar_template, generate_plan_file, list_templates, validate_id,
};

/// Custom templates live next to the project in `.plan-templates/`.
pub(crate) fn custom_template_dir() -> PathBuf {
    PathBuf::from(".plan-templates")
}

pub fn run(
    id: &str,
    template: Option<&str>,
    owner: Option<&str>,
    force: bool,
) -> anyhow::Result<ExitCode> {
    if let Some(message) = validate_id(id) {
        eprintln!("{message}");
        return Ok(ExitCode::FAILURE);
    }

    let file_path = PathBuf::from(format!("{id}.plan"));
    if file_path.exists() && !force {
        eprintln!("File already exists: {}", file_path.display());
        eprintln!("Use --force to overwrite.");
        return Ok(ExitCode::FAILURE);
    }

    let custom_dir = custom_template_dir();
    let custom_dir: Option<&Path> = Some(custom_dir.as_path());
    let date = chrono::Utc::now().format("%Y-%m-%d").to_string();

    let result = match generate_plan_file(id, template, owner, &date, custom_dir) {
        Ok(result) => result,
        Err(e) => {
            let available: Vec<String> = list_templates(custom_dir)
                .into_iter()
                .map(|t| t.name)
                .collect();
            eprintln!("{e}");
            if let Some(suggestion) =
                find_similar_template(template.unwrap_or("default"), &available)
            {
                eprintln!("Did you mean \"{suggestion}\"?");
            }
            eprintln!("Available templates: {}", available.join(", "));
            return Ok(ExitCode::FAILURE);
        }
    };

    std::fs::write(&file_path, &result.content)
        .with_context(|| format!("failed to write {}", file_path.display()))?;
    println!(
        "Created: {} (template: {})",
        file_path.display(),
        result.template_name
    );

    Ok(ExitCode::SUCCESS)
}
