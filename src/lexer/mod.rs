//! Tokenizer for C-family source text.
//!
//! Produces a stream of tokens annotated with 1-based line numbers.
//! Comments are consumed without producing tokens; preprocessor directives
//! come back as a single token each. Malformed literals yield a best-effort
//! token and scanning continues.

mod semi;

pub use semi::{SemiCollector, SemiExpr};

/// The classification the collector and the dependency resolver need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Number,
    StringLit,
    CharLit,
    Punct,
    Preproc,
}

/// A lexical token with its source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    pub line: usize,
}

impl Token {
    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }

    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier
    }
}

/// Three-character punctuators, matched before shorter ones.
const PUNCT3: &[&str] = &["<<=", ">>=", "->*", "..."];

/// Two-character punctuators.
const PUNCT2: &[&str] = &[
    "::", "->", "<<", ">>", "<=", ">=", "==", "!=", "&&", "||", "++", "--", "+=", "-=", "*=",
    "/=", "%=", "&=", "|=", "^=", "=>",
];

/// Character-stream tokenizer.
pub struct Tokenizer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    newlines: usize,
    content_after_newline: bool,
    at_line_start: bool,
}

impl Tokenizer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            newlines: 0,
            content_after_newline: false,
            at_line_start: true,
        }
    }

    /// Number of source lines consumed so far. After the stream is drained
    /// this equals the file's line count.
    pub fn lines_consumed(&self) -> usize {
        self.newlines + usize::from(self.content_after_newline)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.newlines += 1;
            self.content_after_newline = false;
            self.at_line_start = true;
        } else if !ch.is_whitespace() {
            self.content_after_newline = true;
            self.at_line_start = false;
        }
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.bump();
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn skip_block_comment(&mut self) {
        // opening "/*" already consumed
        while let Some(ch) = self.bump() {
            if ch == '*' && self.peek() == Some('/') {
                self.bump();
                return;
            }
        }
        // unterminated comment: consumed to end of stream
    }

    fn scan_preproc(&mut self, line: usize) -> Token {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                // line continuation keeps the directive going
                if text.ends_with('\\') {
                    text.pop();
                    self.bump();
                    continue;
                }
                break;
            }
            text.push(ch);
            self.bump();
        }
        Token {
            text: text.trim_end().to_string(),
            kind: TokenKind::Preproc,
            line,
        }
    }

    fn scan_string(&mut self, quote: char, line: usize) -> Token {
        let mut text = String::new();
        text.push(quote);
        self.bump();
        while let Some(ch) = self.bump() {
            text.push(ch);
            if ch == '\\' {
                if let Some(esc) = self.bump() {
                    text.push(esc);
                }
                continue;
            }
            if ch == quote {
                break;
            }
        }
        let kind = if quote == '"' {
            TokenKind::StringLit
        } else {
            TokenKind::CharLit
        };
        Token { text, kind, line }
    }

    fn scan_identifier(&mut self, line: usize) -> Token {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                text.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        Token {
            text,
            kind: TokenKind::Identifier,
            line,
        }
    }

    fn scan_number(&mut self, line: usize) -> Token {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            let is_exp_sign = (ch == '+' || ch == '-')
                && matches!(text.chars().last(), Some('e') | Some('E'))
                && text.starts_with(|c: char| c.is_ascii_digit());
            if ch.is_ascii_alphanumeric() || ch == '.' || ch == '_' || is_exp_sign {
                text.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        Token {
            text,
            kind: TokenKind::Number,
            line,
        }
    }

    fn scan_punct(&mut self, line: usize) -> Token {
        for (len, table) in [(3usize, PUNCT3), (2usize, PUNCT2)] {
            if self.pos + len <= self.chars.len() {
                let candidate: String = self.chars[self.pos..self.pos + len].iter().collect();
                if table.contains(&candidate.as_str()) {
                    for _ in 0..len {
                        self.bump();
                    }
                    return Token {
                        text: candidate,
                        kind: TokenKind::Punct,
                        line,
                    };
                }
            }
        }
        let ch = self.bump().unwrap_or(' ');
        Token {
            text: ch.to_string(),
            kind: TokenKind::Punct,
            line,
        }
    }
}

impl Iterator for Tokenizer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            self.skip_whitespace();
            let ch = self.peek()?;
            let line = self.line;

            if ch == '/' && self.peek_at(1) == Some('/') {
                self.skip_line_comment();
                continue;
            }
            if ch == '/' && self.peek_at(1) == Some('*') {
                self.bump();
                self.bump();
                self.skip_block_comment();
                continue;
            }
            if ch == '#' && self.at_line_start {
                return Some(self.scan_preproc(line));
            }
            if ch == '"' || ch == '\'' {
                return Some(self.scan_string(ch, line));
            }
            if ch.is_ascii_alphabetic() || ch == '_' {
                return Some(self.scan_identifier(line));
            }
            if ch.is_ascii_digit() {
                return Some(self.scan_number(line));
            }
            return Some(self.scan_punct(line));
        }
    }
}
