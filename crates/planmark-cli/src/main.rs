mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "planmark")]
#[command(version)]
#[command(about = "Parser, linter, and tooling for the .plan specification language")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SeverityFilter {
    Error,
    Warning,
    Info,
}

impl SeverityFilter {
    fn rank(self) -> u8 {
        match self {
            Self::Error => 0,
            Self::Warning => 1,
            Self::Info => 2,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a .plan file and display the AST
    Parse {
        file: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Lint one or more .plan files (single-file rules only)
    Lint {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
        /// Only output if there are diagnostics
        #[arg(long)]
        quiet: bool,
        /// Disable specific rules (e.g. --disable PLAN-005 --disable PLAN-006)
        #[arg(long = "disable", value_name = "RULE")]
        disabled: Vec<String>,
        /// Minimum severity to report
        #[arg(long, value_enum, default_value = "info")]
        severity: SeverityFilter,
    },
    /// Lint all .plan files in a directory (includes cross-file rules)
    LintProject {
        /// Directory to scan (defaults to the configured plans path, then `.`)
        dir: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
        #[arg(long)]
        quiet: bool,
        #[arg(long = "disable", value_name = "RULE")]
        disabled: Vec<String>,
        #[arg(long, value_enum, default_value = "info")]
        severity: SeverityFilter,
        /// Apply available fixes and rewrite the files
        #[arg(long)]
        fix: bool,
    },
    /// Convert a .plan file to json, markdown, or csv
    Convert {
        file: PathBuf,
        /// Target format
        #[arg(long)]
        to: String,
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Normalize formatting of .plan files
    Format {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Write formatted output back to the files
        #[arg(long)]
        write: bool,
        /// Exit non-zero if any file needs formatting
        #[arg(long)]
        check: bool,
    },
    /// Report uncertainty annotations across .plan files
    Uncertainty {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Create a new .plan file from a template
    Init {
        /// Plan id (kebab-case); also the output file name
        id: String,
        #[arg(long)]
        template: Option<String>,
        #[arg(long)]
        owner: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// List available templates
    Templates,
}

fn init_tracing() {
    let filter = EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "planmark=warn".into()));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse { file, format } => commands::parse::run(&file, format),
        Commands::Lint {
            files,
            format,
            quiet,
            disabled,
            severity,
        } => commands::lint::run(&files, format, quiet, disabled, severity),
        Commands::LintProject {
            dir,
            format,
            quiet,
            disabled,
            severity,
            fix,
        } => commands::lint_project::run(dir, format, quiet, disabled, severity, fix),
        Commands::Convert { file, to, output } => commands::convert::run(&file, &to, output),
        Commands::Format {
            files,
            write,
            check,
        } => commands::format::run(&files, write, check),
        Commands::Uncertainty { files, format } => commands::uncertainty::run(&files, format),
        Commands::Init {
            id,
            template,
            owner,
            force,
        } => commands::init::run(&id, template.as_deref(), owner.as_deref(), force),
        Commands::Templates => commands::templates::run(),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
