//! Helper functions for the `check` command.

use std::{
    fs::read_to_string,
    io::{self, Read},
    path::Path
};

use super::types::{CheckReport, Verdict};
use crate::{
    cli::Format,
    error::{AppResult, file_read_error, unsupported_source_error},
    extract::SourceKind,
    output::{OutputFormat, OutputOptions}
};

/// Calculates the process exit code from the most serious verdict.
///
/// - `0` - Nothing extracted, or every snippet passed
/// - `1` - At least one snippet needs review
/// - `2` - At least one snippet is blocked
///
/// # Example
///
/// ```
/// use sql_lint_gateway::app::{CheckReport, calculate_exit_code};
///
/// assert_eq!(calculate_exit_code(&CheckReport::default()), 0);
/// ```
pub fn calculate_exit_code(report: &CheckReport) -> i32 {
    match report.worst() {
        Some(Verdict::Block) => 2,
        Some(Verdict::Review) => 1,
        Some(Verdict::Pass) | None => 0
    }
}

/// Reads a source file, or raw SQL from stdin when the path is "-".
///
/// # Errors
///
/// Returns an error if the extension is not supported or reading fails.
pub fn read_source(path: &Path) -> AppResult<(String, SourceKind)> {
    if path.to_str() == Some("-") {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| file_read_error("stdin", e))?;
        return Ok((buffer, SourceKind::Sql));
    }
    let display = path.display().to_string();
    let kind = SourceKind::from_path(path).ok_or_else(|| unsupported_source_error(&display))?;
    let content = read_to_string(path).map_err(|e| file_read_error(&display, e))?;
    Ok((content, kind))
}

/// Label used for a path in reports
pub fn source_label(path: &Path) -> String {
    if path.to_str() == Some("-") {
        String::from("<stdin>")
    } else {
        path.display().to_string()
    }
}

/// Convert CLI format to internal OutputFormat
pub fn convert_format(format: Format) -> OutputFormat {
    match format {
        Format::Text => OutputFormat::Text,
        Format::Json => OutputFormat::Json,
        Format::Yaml => OutputFormat::Yaml,
        Format::Markdown => OutputFormat::Markdown
    }
}

/// Create output options from parameters
pub fn create_output_options(format: Format, no_color: bool) -> OutputOptions {
    OutputOptions {
        format:  convert_format(format),
        colored: !no_color
    }
}

/// The gateway URL from the command line wins over configuration
pub fn get_effective_url(url: Option<String>, config_url: Option<String>) -> Option<String> {
    url.or(config_url)
}
