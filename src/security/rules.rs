use std::sync::LazyLock;

use regex::Regex;

use super::{Finding, RuleInfo, SecurityRule, Severity};

/// Statements that destroy data or change privileges.
pub const DANGEROUS_KEYWORDS: [&str; 5] = ["DROP", "TRUNCATE", "DELETE", "ALTER", "GRANT"];

/// Whole-word, case-insensitive matchers for [`DANGEROUS_KEYWORDS`], in the
/// same order.
static KEYWORD_REGEXES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    DANGEROUS_KEYWORDS
        .iter()
        .map(|word| {
            let re = Regex::new(&format!(r"(?i)\b{}\b", word)).expect("valid regex");
            (*word, re)
        })
        .collect()
});

/// Matches `SELECT *` with any whitespace between the tokens.
static SELECT_STAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)SELECT\s+\*").expect("valid regex"));

/// Korean resident registration number: `YYMMDD-NNNNNNN`.
static RESIDENT_NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{6}-\d{7}").expect("valid regex"));

/// Flags destructive or privilege-changing keywords anywhere in the text
///
/// The match is lexical: a keyword inside a string literal or comment is
/// reported too. One finding per keyword present.
pub struct DangerousKeyword;

impl SecurityRule for DangerousKeyword {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "SEC001",
            name:     "Dangerous keyword",
            severity: Severity::High
        }
    }

    fn check(&self, sql: &str) -> Vec<Finding> {
        let info = self.info();
        KEYWORD_REGEXES
            .iter()
            .filter(|(_, re)| re.is_match(sql))
            .map(|(word, _)| Finding {
                rule_id:  info.id,
                message:  format!("High-risk statement detected: {}", word),
                severity: info.severity
            })
            .collect()
    }
}

/// `SELECT *` pulls every column, including ones the caller should not see
pub struct SelectStar;

impl SecurityRule for SelectStar {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "SEC002",
            name:     "SELECT * usage",
            severity: Severity::Medium
        }
    }

    fn check(&self, sql: &str) -> Vec<Finding> {
        if !SELECT_STAR_REGEX.is_match(sql) {
            return vec![];
        }
        let info = self.info();
        vec![Finding {
            rule_id:  info.id,
            message:  String::from(
                "Performance/security warning: SELECT * used (list columns explicitly)"
            ),
            severity: info.severity
        }]
    }
}

/// Personal data embedded in the SQL text
pub struct ResidentNumberExposure;

impl SecurityRule for ResidentNumberExposure {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "SEC003",
            name:     "Resident registration number exposure",
            severity: Severity::Medium
        }
    }

    fn check(&self, sql: &str) -> Vec<Finding> {
        if !RESIDENT_NUMBER_REGEX.is_match(sql) {
            return vec![];
        }
        let info = self.info();
        vec![Finding {
            rule_id:  info.id,
            message:  String::from(
                "Possible PII exposure: resident registration number pattern"
            ),
            severity: info.severity
        }]
    }
}
