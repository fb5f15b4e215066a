//! SQL extraction from application source files.
//!
//! Data-access code embeds SQL as string literals. The extractor pulls those
//! literals out so each statement can be screened and linted on its own:
//!
//! ```java
//! String sql = "SELECT * FROM users WHERE name = '" + userName + "'";
//! ```
//!
//! becomes the snippet `SELECT * FROM users WHERE name = '?'`, flagged as
//! **dynamic** because part of it comes from a runtime value.
//!
//! # Supported Sources
//!
//! | Extension | Handling |
//! |-----------|----------|
//! | `.java` | String literals and text blocks, `+` chains |
//! | `.py` | All string forms including prefixed and triple-quoted, `+` chains, adjacent literals |
//! | `.sql` | Whole file is one snippet |
//!
//! A chain becomes a snippet only when it starts with a statement keyword
//! (see [`SQL_KEYWORDS`]). Later `sql += ...` and `sb.append(...)` calls on
//! the variable holding the chain extend the same snippet:
//!
//! ```java
//! StringBuilder sb = new StringBuilder("SELECT id FROM users WHERE name = '");
//! sb.append(name).append("'");
//! ```
//!
//! yields `SELECT id FROM users WHERE name = '?'`, also dynamic.

mod lexer;

use std::path::Path;

use lexer::{Token, TokenKind, tokenize};
use serde::Serialize;

/// Leading keywords that mark a literal as SQL.
pub const SQL_KEYWORDS: [&str; 13] = [
    "SELECT", "INSERT", "UPDATE", "DELETE", "WITH", "MERGE", "CREATE", "DROP", "ALTER",
    "TRUNCATE", "GRANT", "REVOKE", "REPLACE"
];

/// Placeholder substituted for non-literal operands.
pub const PLACEHOLDER: &str = "?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Java,
    Python
}

/// How a file is scanned for SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Code(Language),
    /// The file content is SQL
    Sql
}

impl SourceKind {
    /// Detect the kind from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "java" => Some(Self::Code(Language::Java)),
            "py" => Some(Self::Code(Language::Python)),
            "sql" => Some(Self::Sql),
            _ => None
        }
    }
}

/// One SQL statement found in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snippet {
    /// 1-based line of the first literal
    pub line:    usize,
    pub sql:     String,
    /// Built from runtime values (concatenation, interpolation or
    /// formatting)
    pub dynamic: bool
}

/// Extract every SQL snippet from `source`
pub fn extract(source: &str, kind: SourceKind) -> Vec<Snippet> {
    match kind {
        SourceKind::Sql => {
            if source.trim().is_empty() {
                vec![]
            } else {
                vec![Snippet {
                    line:    1,
                    sql:     source.to_string(),
                    dynamic: false
                }]
            }
        }
        SourceKind::Code(lang) => collect_chains(&tokenize(source, lang))
    }
}

/// Whether `text` starts with a statement keyword followed by more text
pub fn looks_like_sql(text: &str) -> bool {
    let mut words = text.split_whitespace();
    let Some(first) = words.next() else {
        return false;
    };
    let keyword = first
        .split(|c: char| !c.is_ascii_alphabetic())
        .next()
        .unwrap_or_default();
    let has_rest = first.len() > keyword.len() || words.next().is_some();
    has_rest
        && SQL_KEYWORDS
            .iter()
            .any(|k| k.eq_ignore_ascii_case(keyword))
}

fn kind_at(tokens: &[Token], i: usize) -> Option<&TokenKind> {
    tokens.get(i).map(|t| &t.kind)
}

fn word_at(tokens: &[Token], i: usize) -> Option<&str> {
    match kind_at(tokens, i) {
        Some(TokenKind::Word(w)) => Some(w.as_str()),
        _ => None
    }
}

fn punct_at(tokens: &[Token], i: usize, c: char) -> bool {
    matches!(kind_at(tokens, i), Some(TokenKind::Punct(p)) if *p == c)
}

fn collect_chains(tokens: &[Token]) -> Vec<Snippet> {
    let mut snippets = Vec::new();
    let mut absorbed = vec![false; tokens.len()];
    let mut i = 0;

    while i < tokens.len() {
        if absorbed[i] || !matches!(tokens[i].kind, TokenKind::Str { .. }) {
            i += 1;
            continue;
        }

        let start = i;
        let line = tokens[i].line;
        let (end, mut dynamic, mut sql) = read_expression(tokens, start);
        i = end;

        dynamic |= is_formatted(tokens, start, i);

        if looks_like_sql(&sql) {
            if let Some((target, in_call)) = chain_target(tokens, start) {
                dynamic |= follow_appends(tokens, i, target, in_call, &mut sql, &mut absorbed);
            }
            snippets.push(Snippet {
                line,
                sql: sql.trim().to_string(),
                dynamic
            });
        }
    }

    snippets
}

/// Read one operand followed by any adjacent literals and `+` operands.
/// Returns the index after the expression, whether it is dynamic and its
/// text.
fn read_expression(tokens: &[Token], start: usize) -> (usize, bool, String) {
    let mut sql = String::new();
    let mut dynamic;
    let mut i = match kind_at(tokens, start) {
        Some(kind @ TokenKind::Str { .. }) => {
            dynamic = push_literal(kind, &mut sql);
            start + 1
        }
        Some(TokenKind::Word(_)) | Some(TokenKind::Punct('(')) => {
            sql.push_str(PLACEHOLDER);
            dynamic = true;
            skip_operand(tokens, start)
        }
        _ => return (start, false, sql)
    };

    loop {
        match kind_at(tokens, i) {
            Some(kind @ TokenKind::Str { .. }) => {
                dynamic |= push_literal(kind, &mut sql);
                i += 1;
            }
            Some(TokenKind::Plus) => match kind_at(tokens, i + 1) {
                Some(kind @ TokenKind::Str { .. }) => {
                    dynamic |= push_literal(kind, &mut sql);
                    i += 2;
                }
                Some(TokenKind::Word(_)) | Some(TokenKind::Punct('(')) => {
                    i = skip_operand(tokens, i + 1);
                    sql.push_str(PLACEHOLDER);
                    dynamic = true;
                }
                _ => break
            },
            _ => break
        }
    }

    (i, dynamic, sql)
}

/// Variable a chain starting at `start` is bound to: `x = "..."`,
/// `x = new StringBuilder("...")` or `x.append("...")`. The flag is set when
/// the chain is a call argument.
fn chain_target(tokens: &[Token], start: usize) -> Option<(&str, bool)> {
    let before = |n: usize| start.checked_sub(n);

    if punct_at(tokens, before(1)?, '=') {
        return word_at(tokens, before(2)?).map(|w| (w, false));
    }
    if !punct_at(tokens, before(1)?, '(') {
        return None;
    }
    match word_at(tokens, before(2)?)? {
        "append" if punct_at(tokens, before(3)?, '.') => {
            word_at(tokens, before(4)?).map(|w| (w, true))
        }
        "StringBuilder" | "StringBuffer"
            if word_at(tokens, before(3)?) == Some("new")
                && punct_at(tokens, before(4)?, '=') =>
        {
            word_at(tokens, before(5)?).map(|w| (w, true))
        }
        _ => None
    }
}

/// Follow `target += ...` and `target.append(...)` after a chain, up to a
/// reassignment of `target` or the end of the enclosing block. Appended
/// text is added to `sql`; returns whether any of it is dynamic.
fn follow_appends(
    tokens: &[Token],
    from: usize,
    target: &str,
    in_call: bool,
    sql: &mut String,
    absorbed: &mut [bool]
) -> bool {
    let mut dynamic = false;
    let mut j = from;

    if in_call && punct_at(tokens, j, ')') {
        let (end, appended) = append_calls(tokens, j + 1, sql);
        absorbed[j..end].fill(true);
        dynamic |= appended;
        j = end;
    }

    let mut depth = 0usize;
    while j < tokens.len() {
        match &tokens[j].kind {
            TokenKind::Punct('{') => depth += 1,
            TokenKind::Punct('}') => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            TokenKind::Word(w) if w == target => match kind_at(tokens, j + 1) {
                Some(TokenKind::PlusEq) => {
                    let (end, appended, text) = read_expression(tokens, j + 2);
                    sql.push_str(&text);
                    absorbed[j..end].fill(true);
                    dynamic |= appended || is_formatted(tokens, j + 2, end);
                    j = end;
                    continue;
                }
                Some(TokenKind::Punct('=')) => break,
                Some(TokenKind::Punct('.')) => {
                    let (end, appended) = append_calls(tokens, j + 1, sql);
                    if end > j + 1 {
                        absorbed[j..end].fill(true);
                        dynamic |= appended;
                        j = end;
                        continue;
                    }
                }
                _ => {}
            },
            _ => {}
        }
        j += 1;
    }

    dynamic
}

/// Consume `.append(...)` calls starting at `start`; returns the index after
/// the last call and whether any argument is dynamic
fn append_calls(tokens: &[Token], start: usize, sql: &mut String) -> (usize, bool) {
    let mut dynamic = false;
    let mut j = start;
    while punct_at(tokens, j, '.')
        && word_at(tokens, j + 1) == Some("append")
        && punct_at(tokens, j + 2, '(')
    {
        let close = skip_group(tokens, j + 2);
        let (end, appended, text) = read_expression(tokens, j + 3);
        sql.push_str(&text);
        // Anything left inside the parentheses is not a plain literal
        dynamic |= appended || end + 1 < close;
        j = close;
    }
    (j, dynamic)
}

/// Append a literal; returns `true` when it interpolates runtime values
fn push_literal(kind: &TokenKind, sql: &mut String) -> bool {
    let TokenKind::Str { text, prefix } = kind else {
        return false;
    };
    if prefix.contains('f') {
        let (replaced, interpolated) = replace_fields(text);
        sql.push_str(&replaced);
        interpolated
    } else {
        sql.push_str(text);
        false
    }
}

/// Replace f-string `{...}` fields with the placeholder; `{{` and `}}` are
/// literal braces
fn replace_fields(text: &str) -> (String, bool) {
    let mut out = String::with_capacity(text.len());
    let mut interpolated = false;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut depth = 1;
                for inner in chars.by_ref() {
                    match inner {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                }
                out.push_str(PLACEHOLDER);
                interpolated = true;
            }
            c => out.push(c)
        }
    }
    (out, interpolated)
}

/// Skip one operand: a word or parenthesized group, followed by any
/// `.member`, call and index suffixes
fn skip_operand(tokens: &[Token], start: usize) -> usize {
    let mut j = match kind_at(tokens, start) {
        Some(TokenKind::Word(_)) => start + 1,
        Some(TokenKind::Punct('(')) => skip_group(tokens, start),
        _ => return start
    };
    loop {
        match kind_at(tokens, j) {
            Some(TokenKind::Punct('.'))
                if matches!(kind_at(tokens, j + 1), Some(TokenKind::Word(_))) =>
            {
                j += 2;
            }
            Some(TokenKind::Punct('(')) | Some(TokenKind::Punct('[')) => {
                j = skip_group(tokens, j);
            }
            _ => break
        }
    }
    j
}

/// Skip a bracketed group starting at `start`; returns the index after the
/// matching close
fn skip_group(tokens: &[Token], start: usize) -> usize {
    let mut depth = 0usize;
    let mut j = start;
    while let Some(kind) = kind_at(tokens, j) {
        match kind {
            TokenKind::Punct('(') | TokenKind::Punct('[') => depth += 1,
            TokenKind::Punct(')') | TokenKind::Punct(']') => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return j + 1;
                }
            }
            _ => {}
        }
        j += 1;
    }
    j
}

/// `%` / `.format(...)` / `.formatted(...)` after the chain, or
/// `format(` right before it
fn is_formatted(tokens: &[Token], start: usize, end: usize) -> bool {
    let after = match kind_at(tokens, end) {
        Some(TokenKind::Punct('%')) => true,
        Some(TokenKind::Punct('.')) => matches!(
            kind_at(tokens, end + 1),
            Some(TokenKind::Word(w)) if w == "format" || w == "formatted"
        ),
        _ => false
    };
    let before = start >= 2
        && matches!(kind_at(tokens, start - 1), Some(TokenKind::Punct('(')))
        && matches!(kind_at(tokens, start - 2), Some(TokenKind::Word(w)) if w == "format");
    after || before
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_fields() {
        let (text, interpolated) = replace_fields("id = {user['id']} and x = '{{}}'");
        assert_eq!(text, "id = ? and x = '{}'");
        assert!(interpolated);
    }

    #[test]
    fn test_replace_fields_without_fields() {
        let (text, interpolated) = replace_fields("SELECT 1");
        assert_eq!(text, "SELECT 1");
        assert!(!interpolated);
    }

    #[test]
    fn test_looks_like_sql() {
        assert!(looks_like_sql("  select id from t"));
        assert!(looks_like_sql("DELETE FROM t"));
        assert!(looks_like_sql("WITH(x)"));
        assert!(!looks_like_sql("SELECT"));
        assert!(!looks_like_sql("Hello world"));
        assert!(!looks_like_sql(""));
        assert!(!looks_like_sql("Selection of items"));
    }
}
