//! Minimal tokenizer for Java and Python sources.
//!
//! Only string literals matter to the extractor; everything else is reduced
//! to words and punctuation so `+` chains and call operands can be followed.
//! Comments are dropped.

use super::Language;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum TokenKind {
    /// Decoded literal text. `prefix` holds Python string prefixes (`f`,
    /// `r`, `b`, ...) in lowercase.
    Str { text: String, prefix: String },
    /// A lone `+` (not `++` or `+=`)
    Plus,
    /// `+=`
    PlusEq,
    Word(String),
    Punct(char)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Token {
    pub kind: TokenKind,
    /// 1-based line of the first character
    pub line: usize
}

struct Cursor {
    chars: Vec<char>,
    pos:   usize,
    line:  usize,
    lang:  Language
}

impl Cursor {
    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn starts_with(&self, pattern: &str) -> bool {
        pattern
            .chars()
            .enumerate()
            .all(|(i, c)| self.peek(i) == Some(c))
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek(0)?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.peek(0) {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn skip_block_comment(&mut self) {
        self.pos += 2;
        while self.peek(0).is_some() {
            if self.starts_with("*/") {
                self.pos += 2;
                return;
            }
            self.bump();
        }
    }

    /// Read up to the closing `quote`, decoding escapes unless `raw`.
    /// Stops at a newline for single-line literals.
    fn read_quoted(&mut self, quote: char, raw: bool) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek(0) {
            match c {
                '\n' => break,
                '\\' => {
                    self.bump();
                    match self.bump() {
                        Some(escaped) if raw => {
                            text.push('\\');
                            text.push(escaped);
                        }
                        Some(escaped) => text.push(unescape(escaped)),
                        None => text.push('\\')
                    }
                }
                c if c == quote => {
                    self.bump();
                    break;
                }
                c => {
                    text.push(c);
                    self.bump();
                }
            }
        }
        text
    }

    /// Read a triple-quoted literal after its opening delimiter.
    fn read_triple(&mut self, quote: char, raw: bool) -> String {
        let closing: String = std::iter::repeat_n(quote, 3).collect();
        let mut text = String::new();
        while let Some(c) = self.peek(0) {
            if self.starts_with(&closing) {
                self.pos += 3;
                break;
            }
            if c == '\\' && !raw {
                self.bump();
                match self.bump() {
                    // Line continuation
                    Some('\n') => {}
                    Some(escaped) => text.push(unescape(escaped)),
                    None => text.push('\\')
                }
                continue;
            }
            text.push(c);
            self.bump();
        }
        dedent(&text)
    }

    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.peek(0) {
            if is_word_char(c) {
                word.push(c);
                self.bump();
            } else {
                break;
            }
        }
        word
    }

    /// Python string prefix immediately followed by a quote
    fn string_prefix_len(&self) -> Option<usize> {
        if self.lang != Language::Python {
            return None;
        }
        for len in 1..=2 {
            let candidate: Option<String> = (0..len).map(|i| self.peek(i)).collect();
            let candidate = candidate?;
            let valid = candidate
                .chars()
                .all(|c| matches!(c.to_ascii_lowercase(), 'r' | 'b' | 'f' | 'u'));
            if !valid {
                return None;
            }
            if matches!(self.peek(len), Some('"') | Some('\'')) {
                return Some(len);
            }
        }
        None
    }

    fn read_string(&mut self, prefix: String) -> TokenKind {
        let raw = prefix.contains('r');
        let quote = self.peek(0).unwrap_or('"');
        let triple: String = std::iter::repeat_n(quote, 3).collect();
        let text = if self.starts_with(&triple) {
            self.pos += 3;
            self.read_triple(quote, raw)
        } else {
            self.bump();
            self.read_quoted(quote, raw)
        };
        TokenKind::Str { text, prefix }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '0' => '\0',
        other => other
    }
}

/// Drop the line break after an opening delimiter and strip the common
/// indentation of non-blank lines; trailing whitespace on each line goes
/// too.
pub(super) fn dedent(text: &str) -> String {
    let body = text
        .strip_prefix("\r\n")
        .or_else(|| text.strip_prefix('\n'))
        .unwrap_or(text);
    let indent = body
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    body.lines()
        .map(|l| {
            let line = l.trim_end();
            line.get(indent..).unwrap_or_else(|| line.trim_start())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split `source` into tokens for `lang`
pub(super) fn tokenize(source: &str, lang: Language) -> Vec<Token> {
    let mut cursor = Cursor {
        chars: source.chars().collect(),
        pos: 0,
        line: 1,
        lang
    };
    let mut tokens = Vec::new();

    while let Some(c) = cursor.peek(0) {
        let line = cursor.line;
        if c.is_whitespace() {
            cursor.bump();
            continue;
        }

        if lang == Language::Java && cursor.starts_with("//") {
            cursor.skip_line();
            continue;
        }
        if lang == Language::Java && cursor.starts_with("/*") {
            cursor.skip_block_comment();
            continue;
        }
        if lang == Language::Python && c == '#' {
            cursor.skip_line();
            continue;
        }

        if let Some(len) = cursor.string_prefix_len() {
            let prefix: String = (0..len)
                .filter_map(|_| cursor.bump())
                .map(|p| p.to_ascii_lowercase())
                .collect();
            let kind = cursor.read_string(prefix);
            tokens.push(Token { kind, line });
            continue;
        }

        let kind = match c {
            '"' => cursor.read_string(String::new()),
            '\'' if lang == Language::Python => cursor.read_string(String::new()),
            '\'' => {
                // Java char literal
                cursor.bump();
                let text = cursor.read_quoted('\'', false);
                TokenKind::Word(format!("'{}'", text))
            }
            '+' => {
                cursor.bump();
                match cursor.peek(0) {
                    Some('+') => {
                        cursor.bump();
                        TokenKind::Punct('+')
                    }
                    Some('=') => {
                        cursor.bump();
                        TokenKind::PlusEq
                    }
                    _ => TokenKind::Plus
                }
            }
            c if is_word_char(c) => TokenKind::Word(cursor.read_word()),
            c => {
                cursor.bump();
                TokenKind::Punct(c)
            }
        };
        tokens.push(Token { kind, line });
    }

    tokens
}
