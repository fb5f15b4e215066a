//! Type definitions for the security screening layer.
//!
//! - [`Severity`] - Finding severity levels (Low, Medium, High)
//! - [`Finding`] - A single rule hit with its message
//! - [`SecurityAnalysis`] - The summary returned to callers

use serde::{Deserialize, Serialize};

/// Severity level of a security finding.
///
/// Ordered from lowest to highest so the maximum over a set of findings
/// is the overall severity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Nothing worth flagging
    #[default]
    Low,
    /// Risky pattern that deserves a second look
    Medium,
    /// Destructive or privilege-changing statement; the SQL is not safe
    High
}

impl Severity {
    /// Parse a severity name from configuration
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high")
        }
    }
}

/// Metadata about a rule for identification and configuration.
#[derive(Debug, Clone)]
pub struct RuleInfo {
    /// Unique rule identifier (e.g., "SEC001")
    pub id:       &'static str,
    /// Human-readable rule name
    pub name:     &'static str,
    /// Default severity level
    pub severity: Severity
}

/// A single rule hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub rule_id:  &'static str,
    pub message:  String,
    pub severity: Severity
}

/// Summary of the security screening of one SQL text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityAnalysis {
    /// `false` when any finding is [`Severity::High`]
    pub is_safe:      bool,
    pub warnings:     Vec<String>,
    pub max_severity: Severity
}

impl SecurityAnalysis {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let max_severity = findings
            .iter()
            .map(|f| f.severity)
            .max()
            .unwrap_or_default();
        Self {
            is_safe: max_severity != Severity::High,
            warnings: findings.iter().map(|f| f.message.clone()).collect(),
            max_severity
        }
    }
}

impl Default for SecurityAnalysis {
    fn default() -> Self {
        Self::from_findings(&[])
    }
}
