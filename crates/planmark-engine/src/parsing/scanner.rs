/// A raw source line with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    pub line_number: usize,
    pub text: String,
}

/// Location of the frontmatter block, when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontmatterBounds {
    /// Line of the opening `---`.
    pub start_line: usize,
    /// Line of the closing `---`.
    pub end_line: usize,
    /// Verbatim joined text of the lines strictly between the delimiters.
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub lines: Vec<RawLine>,
    pub frontmatter: Option<FrontmatterBounds>,
}

/// Split source text into numbered lines and locate frontmatter bounds.
///
/// Frontmatter is valid only if line 1 trims to exactly `---` and some later
/// line also trims to `---`. An opening delimiter with no close is treated
/// as no frontmatter at all: the lines flow forward as body text and the
/// structural parser reports any stray content in its own terms.
pub fn scan(source: &str) -> ScanResult {
    let lines: Vec<RawLine> = split_lines(source)
        .into_iter()
        .enumerate()
        .map(|(i, text)| RawLine {
            line_number: i + 1,
            text,
        })
        .collect();

    let frontmatter = extract_frontmatter(&lines);
    ScanResult { lines, frontmatter }
}

/// Split on `\r?\n`, preserving empty trailing segments like the reference
/// implementation (an empty source yields one empty line).
pub fn split_lines(source: &str) -> Vec<String> {
    source
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
        .collect()
}

fn extract_frontmatter(lines: &[RawLine]) -> Option<FrontmatterBounds> {
    let first = lines.first()?;
    if first.text.trim() != "---" {
        return None;
    }

    for line in &lines[1..] {
        if line.text.trim() == "---" {
            let content: Vec<&str> = lines[1..line.line_number - 1]
                .iter()
                .map(|l| l.text.as_str())
                .collect();
            return Some(FrontmatterBounds {
                start_line: first.line_number,
                end_line: line.line_number,
                content: content.join("\n"),
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_source_into_one_based_lines() {
        let result = scan("line1\nline2\nline3");
        assert_eq!(result.lines.len(), 3);
        assert_eq!(result.lines[0].line_number, 1);
        assert_eq!(result.lines[0].text, "line1");
        assert_eq!(result.lines[2].line_number, 3);
        assert_eq!(result.lines[2].text, "line3");
    }

    #[test]
    fn handles_windows_line_endings() {
        let result = scan("line1\r\nline2\r\n");
        assert_eq!(result.lines[0].text, "line1");
        assert_eq!(result.lines[1].text, "line2");
    }

    #[test]
    fn extracts_frontmatter_bounds() {
        let source = "---\ntype: feature\nid: test\nstatus: draft\n---\n# Feature: Test";
        let result = scan(source);
        let fm = result.frontmatter.unwrap();
        assert_eq!(fm.start_line, 1);
        assert_eq!(fm.end_line, 5);
        assert!(fm.content.contains("type: feature"));
        assert!(!fm.content.contains("---"));
    }

    #[test]
    fn no_frontmatter_without_opening_delimiter() {
        let result = scan("# Feature: Test\nGoal: do stuff");
        assert!(result.frontmatter.is_none());
    }

    #[test]
    fn unterminated_frontmatter_is_treated_as_absent() {
        let result = scan("---\ntype: feature\nid: test");
        assert!(result.frontmatter.is_none());
    }

    #[test]
    fn empty_source_yields_one_empty_line() {
        let result = scan("");
        assert_eq!(result.lines.len(), 1);
        assert_eq!(result.lines[0].text, "");
        assert!(result.frontmatter.is_none());
    }

    #[test]
    fn indented_delimiters_still_count() {
        let result = scan("  ---\nid: x\n ---\nbody");
        let fm = result.frontmatter.unwrap();
        assert_eq!(fm.start_line, 1);
        assert_eq!(fm.end_line, 3);
        assert_eq!(fm.content, "id: x");
    }
}
