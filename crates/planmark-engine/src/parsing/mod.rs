pub mod classify;
pub mod frontmatter;
pub mod inline;
pub mod parser;
pub mod scanner;

pub use classify::{
    ClassifiedLine, Keyword, KeywordCategory, LineKind, classify_line, classify_lines,
};
pub use frontmatter::{FrontmatterResult, parse_frontmatter};
pub use parser::parse;
pub use scanner::{FrontmatterBounds, RawLine, ScanResult, scan};

use crate::models::PlanDocument;

/// Parse a `.plan` source string into a [`PlanDocument`].
///
/// Pipeline: scan, classify, frontmatter parse, structural parse.
/// Frontmatter validation errors are prepended to the document's errors.
/// This function never fails; malformed input produces a best-effort AST
/// with recorded errors.
pub fn parse_plan_file(source: &str, file_path: Option<&str>) -> PlanDocument {
    let ScanResult {
        lines,
        frontmatter: fm_bounds,
    } = scan(source);
    let classified = classify_lines(&lines);

    let mut frontmatter = None;
    let mut errors = Vec::new();
    if let Some(bounds) = &fm_bounds {
        let result = parse_frontmatter(bounds);
        frontmatter = result.frontmatter;
        errors = result.errors;
    }

    // Frontmatter lines were parsed separately; the structural parser only
    // sees what follows the closing delimiter.
    let body: Vec<ClassifiedLine> = match &fm_bounds {
        Some(bounds) => classified
            .into_iter()
            .filter(|l| l.line_number > bounds.end_line)
            .collect(),
        None => classified,
    };

    let mut doc = parser::parse(&body, frontmatter, file_path.map(String::from));
    errors.append(&mut doc.errors);
    doc.errors = errors;
    doc
}
