//! Type definitions for the `check` command.

use std::path::PathBuf;

use serde::Serialize;

use crate::{
    cli::Format,
    extract::Snippet,
    lint::SyntaxAnalysis,
    security::{SecurityAnalysis, Severity}
};

/// Note attached to snippets assembled from runtime values.
pub const DYNAMIC_SQL_NOTE: &str =
    "SQL is assembled from runtime values; use bind parameters instead of concatenation";

/// Parameters for the check command
#[derive(Debug, Clone)]
pub struct CheckParams {
    pub paths:         Vec<PathBuf>,
    pub dialect:       Option<String>,
    pub url:           Option<String>,
    pub security_only: bool,
    /// Add the sources changed in the last commit to `paths`
    pub changed:       bool,
    pub output_format: Format,
    pub no_color:      bool
}

/// Result of a check run
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub exit_code: i32,
    pub output:    String,
    pub report:    CheckReport
}

/// Outcome for one snippet, ordered by seriousness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    /// Worth a human look: medium findings, dynamic SQL or linter hits
    Review,
    /// Unsafe statement
    Block
}

impl Verdict {
    pub fn decide(
        security: &SecurityAnalysis,
        syntax: Option<&SyntaxAnalysis>,
        dynamic: bool
    ) -> Self {
        if !security.is_safe {
            Self::Block
        } else if security.max_severity >= Severity::Medium
            || dynamic
            || syntax.is_some_and(|s| s.found_errors)
        {
            Self::Review
        } else {
            Self::Pass
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Review => write!(f, "REVIEW"),
            Self::Block => write!(f, "BLOCK")
        }
    }
}

/// Review of one extracted snippet
#[derive(Debug, Clone, Serialize)]
pub struct SnippetReport {
    /// File path, or `<stdin>`
    pub source:            String,
    pub line:              usize,
    pub sql:               String,
    pub dynamic:           bool,
    pub verdict:           Verdict,
    pub security_analysis: SecurityAnalysis,
    /// Absent when the linter was skipped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syntax_analysis:   Option<SyntaxAnalysis>
}

impl SnippetReport {
    pub fn new(
        source: impl Into<String>,
        snippet: Snippet,
        security_analysis: SecurityAnalysis,
        syntax_analysis: Option<SyntaxAnalysis>
    ) -> Self {
        let verdict = Verdict::decide(
            &security_analysis,
            syntax_analysis.as_ref(),
            snippet.dynamic
        );
        Self {
            source: source.into(),
            line: snippet.line,
            sql: snippet.sql,
            dynamic: snippet.dynamic,
            verdict,
            security_analysis,
            syntax_analysis
        }
    }
}

/// All snippet reviews of a check run, in input order
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    pub snippets: Vec<SnippetReport>
}

impl CheckReport {
    pub fn count(&self, verdict: Verdict) -> usize {
        self.snippets
            .iter()
            .filter(|s| s.verdict == verdict)
            .count()
    }

    /// Most serious verdict, `None` when nothing was extracted
    pub fn worst(&self) -> Option<Verdict> {
        self.snippets.iter().map(|s| s.verdict).max()
    }
}
