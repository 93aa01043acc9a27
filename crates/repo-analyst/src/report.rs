//! Markdown report assembly.

use std::path::Path;

/// Accumulates per-file sections, in insertion order, under one title.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    document: String,
    sections: usize,
    unavailable: usize,
}

impl ReportBuilder {
    pub fn new(repository_locator: &str) -> Self {
        Self {
            document: format!("# AI Analysis for `{}`\n\n", repository_locator),
            sections: 0,
            unavailable: 0,
        }
    }

    pub fn add_summary(&mut self, relative_path: &str, summary: &str) {
        self.push_section(relative_path, summary.trim());
    }

    /// Adds a section disclosing that `relative_path` has no summary.
    pub fn add_unavailable(&mut self, relative_path: &str, reason: &str) {
        let body = format!("> Summary unavailable: {}", reason.trim().replace('\n', "\n> "));
        self.push_section(relative_path, &body);
        self.unavailable += 1;
    }

    pub fn unavailable(&self) -> usize {
        self.unavailable
    }

    pub fn finish(mut self) -> String {
        if self.unavailable > 0 {
            self.document.push_str(&format!(
                "{} of {} files could not be summarized.\n",
                self.unavailable, self.sections
            ));
        }
        self.document
    }

    fn push_section(&mut self, relative_path: &str, body: &str) {
        self.document.push_str(&format!(
            "## Analysis of `{}`\n\n{}\n\n---\n\n",
            relative_path, body
        ));
        self.sections += 1;
    }
}

/// `file` relative to `root`, with `/` separators.
pub fn relative_path(file: &Path, root: &Path) -> String {
    let rel = file.strip_prefix(root).unwrap_or(file);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_layout() {
        let mut report = ReportBuilder::new("https://example.com/r.git");
        report.add_summary("a.py", "Summary A\n");
        report.add_summary("lib/b.py", "Summary B");

        assert_eq!(
            report.finish(),
            "# AI Analysis for `https://example.com/r.git`\n\n\
             ## Analysis of `a.py`\n\nSummary A\n\n---\n\n\
             ## Analysis of `lib/b.py`\n\nSummary B\n\n---\n\n"
        );
    }

    #[test]
    fn test_unavailable_sections_are_disclosed() {
        let mut report = ReportBuilder::new("repo");
        report.add_summary("a.py", "fine");
        report.add_unavailable("b.py", "Rate limited: quota\ntry later");
        assert_eq!(report.unavailable(), 1);

        let text = report.finish();
        assert!(text.contains(
            "## Analysis of `b.py`\n\n> Summary unavailable: Rate limited: quota\n> try later\n\n---\n\n"
        ));
        assert!(text.ends_with("1 of 2 files could not be summarized.\n"));
    }

    #[test]
    fn test_relative_path() {
        let root = Path::new("/tmp/job-1");
        assert_eq!(relative_path(&root.join("src").join("x.rs"), root), "src/x.rs");
        assert_eq!(relative_path(Path::new("elsewhere.py"), root), "elsewhere.py");
    }
}
