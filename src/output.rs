use colored::Colorize;
use indexmap::IndexMap;

use crate::app::{CheckReport, DYNAMIC_SQL_NOTE, SnippetReport, Verdict};

/// Longest SQL preview shown in text output, in characters
const SQL_PREVIEW_LEN: usize = 100;

/// Output format for results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
    /// Review report for pull request comments
    Markdown
}

/// Output options
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format:  OutputFormat,
    pub colored: bool
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format:  OutputFormat::Text,
            colored: true
        }
    }
}

/// Format a check report based on output options
pub fn format_check_report(report: &CheckReport, opts: &OutputOptions) -> String {
    match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(report).unwrap_or_default(),
        OutputFormat::Text => format_text_report(report, opts),
        OutputFormat::Markdown => format_markdown_report(report)
    }
}

/// Snippets grouped by source, sources in first-seen order
fn group_by_source(report: &CheckReport) -> IndexMap<&str, Vec<&SnippetReport>> {
    let mut by_source: IndexMap<&str, Vec<&SnippetReport>> = IndexMap::new();
    for snippet in &report.snippets {
        by_source
            .entry(snippet.source.as_str())
            .or_default()
            .push(snippet);
    }
    by_source
}

fn summary_line(report: &CheckReport) -> String {
    format!(
        "{} statement(s): {} blocked, {} to review, {} passed",
        report.snippets.len(),
        report.count(Verdict::Block),
        report.count(Verdict::Review),
        report.count(Verdict::Pass)
    )
}

fn format_text_report(report: &CheckReport, opts: &OutputOptions) -> String {
    let mut output = String::new();

    if report.snippets.is_empty() {
        output.push_str("No SQL statements found.\n");
        return output;
    }

    for (source, snippets) in &group_by_source(report) {
        if opts.colored {
            output.push_str(&source.bold().to_string());
        } else {
            output.push_str(source);
        }
        output.push('\n');

        for snippet in snippets {
            output.push_str(&format!(
                "  [{}] line {}\n",
                verdict_label(snippet.verdict, opts.colored),
                snippet.line
            ));
            output.push_str(&format!("    {}\n", sql_preview(&snippet.sql)));
            for note in snippet_notes(snippet) {
                output.push_str(&format!("    - {}\n", note));
            }
        }
        output.push('\n');
    }

    output.push_str(&format!("Summary: {}\n", summary_line(report)));
    output
}

/// Markdown report: overall status, then one section per snippet numbered
/// within its source.
fn format_markdown_report(report: &CheckReport) -> String {
    let mut output = String::from("# SQL Review Report\n\n");

    let status = match report.worst() {
        Some(Verdict::Block) => "**BLOCK**: unsafe SQL found",
        Some(Verdict::Review) => "**REVIEW**: some SQL needs a look",
        Some(Verdict::Pass) | None => "**PASS**: all SQL passed"
    };
    output.push_str(&format!("- Overall status: {}\n", status));

    if report.snippets.is_empty() {
        output.push_str("\nNo SQL statements found.\n");
        return output;
    }
    output.push_str(&format!("- {}\n", summary_line(report)));

    for (source, snippets) in &group_by_source(report) {
        for (index, snippet) in snippets.iter().enumerate() {
            output.push_str("\n---\n\n");
            output.push_str(&format!(
                "## `{}` (snippet #{})\n\n",
                source,
                index + 1
            ));
            output.push_str(&format!(
                "Line {}: **{}**\n\n",
                snippet.line, snippet.verdict
            ));
            output.push_str(&format!("```sql\n{}\n```\n", snippet.sql.trim()));
            let notes = snippet_notes(snippet);
            if !notes.is_empty() {
                output.push('\n');
                for note in notes {
                    output.push_str(&format!("- {}\n", note));
                }
            }
        }
    }
    output
}

fn verdict_label(verdict: Verdict, colored: bool) -> String {
    let label = verdict.to_string();
    if !colored {
        return label;
    }
    match verdict {
        Verdict::Pass => label.green().to_string(),
        Verdict::Review => label.yellow().to_string(),
        Verdict::Block => label.red().bold().to_string()
    }
}

/// Security warnings, the dynamic-SQL note, then linter findings
fn snippet_notes(snippet: &SnippetReport) -> Vec<String> {
    let mut notes = snippet.security_analysis.warnings.clone();
    if snippet.dynamic {
        notes.push(DYNAMIC_SQL_NOTE.to_string());
    }
    if let Some(syntax) = &snippet.syntax_analysis {
        notes.extend(syntax.details.iter().cloned());
    }
    notes
}

/// Collapse whitespace and cut to [`SQL_PREVIEW_LEN`] characters
pub fn sql_preview(sql: &str) -> String {
    let collapsed = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= SQL_PREVIEW_LEN {
        collapsed
    } else {
        let cut: String = collapsed.chars().take(SQL_PREVIEW_LEN).collect();
        format!("{}...", cut)
    }
}
