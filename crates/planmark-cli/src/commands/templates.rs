use std::process::ExitCode;

use planmark_engine::scaffold::list_templates;

use super::init::custom_template_dir;

pub fn run() -> anyhow::Result<ExitCode> {
    let custom_dir = custom_template_dir();
    let templates = list_templates(Some(custom_dir.as_path()));

    println!("Available templates:\n");
    for t in templates {
        let marker = if t.name == "default" { " (default)" } else { "" };
        println!("  {}{marker}", t.name);
        println!("    {}", t.description);
    }

    Ok(ExitCode::SUCCESS)
}
