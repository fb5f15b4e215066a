//! Shape of the linter's `--format json` output.
//!
//! Only the fields the gateway reads are modelled; anything else in the
//! output is ignored so newer linter releases keep working.

use serde::Deserialize;

/// One linted file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileReport {
    #[serde(default)]
    pub filepath:   Option<String>,
    #[serde(default)]
    pub violations: Vec<RawViolation>
}

/// One violation as reported by the linter.
///
/// Older releases report the line as `line_no`, newer ones as
/// `start_line_no`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawViolation {
    #[serde(default)]
    pub line_no:       Option<u64>,
    #[serde(default)]
    pub start_line_no: Option<u64>,
    #[serde(default)]
    pub code:          Option<String>,
    #[serde(default)]
    pub description:   Option<String>
}

impl RawViolation {
    pub fn line(&self) -> Option<u64> {
        self.line_no.or(self.start_line_no)
    }

    /// `Line {n}: {description} (Code: {code})`, with `?`, `Unknown` and
    /// `N/A` standing in for missing fields
    pub fn summary(&self) -> String {
        let line = self
            .line()
            .map(|n| n.to_string())
            .unwrap_or_else(|| String::from("?"));
        format!(
            "Line {}: {} (Code: {})",
            line,
            self.description.as_deref().unwrap_or("Unknown"),
            self.code.as_deref().unwrap_or("N/A")
        )
    }
}

/// Flatten every violation of every file into one summary line each
pub fn summarize(reports: &[FileReport]) -> Vec<String> {
    reports
        .iter()
        .flat_map(|r| r.violations.iter())
        .map(RawViolation::summary)
        .collect()
}
