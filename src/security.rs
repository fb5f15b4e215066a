//! Deterministic security screening of raw SQL text.
//!
//! Runs before the external linter and never depends on it: the text is
//! matched against a fixed set of regular-expression rules, so a request the
//! linter cannot parse is still screened.
//!
//! # Rules
//!
//! | ID | Severity | Detects |
//! |----|----------|---------|
//! | SEC001 | high | `DROP`, `TRUNCATE`, `DELETE`, `ALTER`, `GRANT` as whole words |
//! | SEC002 | medium | `SELECT *` |
//! | SEC003 | medium | Resident registration number (`######-#######`) |
//!
//! The overall severity is the highest severity found (`low` when nothing
//! matched) and the text is considered safe unless it is `high`.
//!
//! # Configuration
//!
//! ```toml
//! [security]
//! disabled = ["SEC002"]
//!
//! [security.severity]
//! SEC003 = "high"
//! ```

mod rules;
mod types;

use std::collections::HashMap;

use rayon::prelude::*;
pub use rules::DANGEROUS_KEYWORDS;
pub use types::{Finding, RuleInfo, SecurityAnalysis, Severity};

use crate::config::SecurityConfig;

/// A single screening rule over raw SQL text.
///
/// Rules are stateless and must be `Send + Sync` so the scanner can run
/// them in parallel.
pub trait SecurityRule: Send + Sync {
    /// Returns metadata about this rule.
    fn info(&self) -> RuleInfo;

    /// Returns every finding for `sql`, in a stable order.
    fn check(&self, sql: &str) -> Vec<Finding>;
}

/// Runs the enabled security rules and summarizes their findings.
pub struct SecurityScanner {
    rules:          Vec<Box<dyn SecurityRule>>,
    severity_cache: HashMap<&'static str, Severity>
}

impl Default for SecurityScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl SecurityScanner {
    /// Create a scanner with all built-in rules
    pub fn new() -> Self {
        Self::with_config(SecurityConfig::default())
    }

    /// Create a scanner honoring disabled rules and severity overrides
    pub fn with_config(config: SecurityConfig) -> Self {
        let all_rules: Vec<Box<dyn SecurityRule>> = vec![
            Box::new(rules::DangerousKeyword),
            Box::new(rules::SelectStar),
            Box::new(rules::ResidentNumberExposure),
        ];

        let rules: Vec<Box<dyn SecurityRule>> = all_rules
            .into_iter()
            .filter(|r| {
                !config
                    .disabled
                    .iter()
                    .any(|d| d.eq_ignore_ascii_case(r.info().id))
            })
            .collect();

        let mut severity_cache = HashMap::new();
        for rule in &rules {
            let rule_id = rule.info().id;
            let configured = config
                .severity
                .iter()
                .find(|(id, _)| id.eq_ignore_ascii_case(rule_id))
                .map(|(_, sev)| sev);
            if let Some(sev_str) = configured {
                match Severity::parse(sev_str) {
                    Some(sev) => {
                        severity_cache.insert(rule_id, sev);
                    }
                    None => {
                        tracing::warn!(rule = rule_id, severity = %sev_str, "ignoring unknown severity override");
                    }
                }
            }
        }

        Self {
            rules,
            severity_cache
        }
    }

    /// Number of enabled rules
    pub fn rules_count(&self) -> usize {
        self.rules.len()
    }

    /// Run every enabled rule, in rule order, with severity overrides applied
    pub fn findings(&self, sql: &str) -> Vec<Finding> {
        let mut findings: Vec<Finding> = self
            .rules
            .par_iter()
            .flat_map(|rule| rule.check(sql))
            .collect();

        for finding in &mut findings {
            if let Some(&severity) = self.severity_cache.get(finding.rule_id) {
                finding.severity = severity;
            }
        }

        findings
    }

    /// Screen `sql` and summarize the result
    pub fn scan(&self, sql: &str) -> SecurityAnalysis {
        SecurityAnalysis::from_findings(&self.findings(sql))
    }
}
