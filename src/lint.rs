//! Request/response pipeline shared by the HTTP endpoint and the `check`
//! command.
//!
//! ```text
//! LintRequest ──▶ SecurityScanner ──┐
//!             └─▶ SqlFluff ─────────┴─▶ LintResponse
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    error::AppResult,
    linter::{SqlFluff, summarize, validate_dialect},
    security::{SecurityAnalysis, SecurityScanner}
};

/// Body of `POST /lint`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintRequest {
    pub sql:     String,
    /// Linter dialect; the configured default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialect: Option<String>
}

impl LintRequest {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql:     sql.into(),
            dialect: None
        }
    }

    pub fn with_dialect(mut self, dialect: impl Into<String>) -> Self {
        self.dialect = Some(dialect.into());
        self
    }
}

/// Linter findings flattened to one line per violation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxAnalysis {
    pub found_errors: bool,
    pub details:      Vec<String>
}

impl SyntaxAnalysis {
    pub fn from_details(details: Vec<String>) -> Self {
        Self {
            found_errors: !details.is_empty(),
            details
        }
    }
}

/// Successful reply of `POST /lint`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintResponse {
    /// Always `"success"`; failures are reported through the error body
    pub status:            String,
    pub security_analysis: SecurityAnalysis,
    pub syntax_analysis:   SyntaxAnalysis
}

/// Security screening plus the external linter, behind one call.
pub struct LintService {
    linter:          SqlFluff,
    scanner:         SecurityScanner,
    default_dialect: String
}

impl LintService {
    pub fn new(linter: SqlFluff, scanner: SecurityScanner, default_dialect: impl Into<String>) -> Self {
        Self {
            linter,
            scanner,
            default_dialect: default_dialect.into()
        }
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        let linter = SqlFluff::from_config(&config.linter)?;
        validate_dialect(&config.linter.default_dialect)?;
        Ok(Self::new(
            linter,
            SecurityScanner::with_config(config.security.clone()),
            config.linter.default_dialect.clone()
        ))
    }

    pub fn default_dialect(&self) -> &str {
        &self.default_dialect
    }

    /// Security screening only; never starts the linter
    pub fn scan(&self, sql: &str) -> SecurityAnalysis {
        self.scanner.scan(sql)
    }

    /// Screen and lint one request
    pub async fn lint(&self, request: &LintRequest) -> AppResult<LintResponse> {
        let dialect = request
            .dialect
            .as_deref()
            .unwrap_or(&self.default_dialect);
        validate_dialect(dialect)?;

        let security_analysis = self.scanner.scan(&request.sql);
        let reports = self.linter.lint(&request.sql, dialect).await?;
        let syntax_analysis = SyntaxAnalysis::from_details(summarize(&reports));

        tracing::info!(
            dialect,
            is_safe = security_analysis.is_safe,
            max_severity = %security_analysis.max_severity,
            violations = syntax_analysis.details.len(),
            "lint completed"
        );

        Ok(LintResponse {
            status: String::from("success"),
            security_analysis,
            syntax_analysis
        })
    }
}
