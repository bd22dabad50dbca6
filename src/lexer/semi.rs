//! Semi-expression collector.
//!
//! Groups tokens into maximal units terminated by `;`, `{`, `}` or a
//! preprocessor directive. A `;` inside an unclosed parenthesis does not
//! terminate, so `for(;;)` stays whole. `}` always comes back as a
//! standalone unit, and an access specifier followed by `:` is returned on
//! its own so the access rule never swallows the member that follows.

use super::{Token, TokenKind, Tokenizer};

/// An ordered run of tokens ending at a structural boundary.
#[derive(Debug, Clone, Default)]
pub struct SemiExpr {
    pub tokens: Vec<Token>,
    pub start_line: usize,
}

impl SemiExpr {
    fn from_tokens(tokens: Vec<Token>) -> Self {
        let start_line = tokens.first().map(|t| t.line).unwrap_or(0);
        Self { tokens, start_line }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn text(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(|t| t.text.as_str())
    }

    pub fn first_text(&self) -> Option<&str> {
        self.text(0)
    }

    pub fn last_text(&self) -> Option<&str> {
        self.tokens.last().map(|t| t.text.as_str())
    }

    pub fn position_of(&self, text: &str) -> Option<usize> {
        self.tokens.iter().position(|t| t.text == text)
    }

    pub fn contains(&self, text: &str) -> bool {
        self.position_of(text).is_some()
    }

    /// True when this unit opens a scope.
    pub fn ends_with_open_brace(&self) -> bool {
        self.last_text() == Some("{")
    }

    /// True when this unit is a standalone `}`.
    pub fn is_scope_closer(&self) -> bool {
        self.len() == 1 && self.first_text() == Some("}")
    }

    /// The unit rendered as space-separated lexemes, for display.
    pub fn joined(&self) -> String {
        let texts: Vec<&str> = self.tokens.iter().map(|t| t.text.as_str()).collect();
        texts.join(" ")
    }
}

fn is_access_keyword(token: &Token) -> bool {
    token.kind == TokenKind::Identifier
        && matches!(token.text.as_str(), "public" | "protected" | "private")
}

/// Pulls tokens from a [`Tokenizer`] and yields semi-expressions.
pub struct SemiCollector {
    toker: Tokenizer,
    pending: Option<Token>,
}

impl SemiCollector {
    pub fn new(source: &str) -> Self {
        Self {
            toker: Tokenizer::new(source),
            pending: None,
        }
    }

    /// Source lines consumed by the underlying tokenizer.
    pub fn lines_consumed(&self) -> usize {
        self.toker.lines_consumed()
    }
}

impl Iterator for SemiCollector {
    type Item = SemiExpr;

    fn next(&mut self) -> Option<SemiExpr> {
        let mut acc: Vec<Token> = Vec::new();
        let mut paren_depth = 0usize;

        loop {
            let tok = match self.pending.take().or_else(|| self.toker.next()) {
                Some(t) => t,
                None => break,
            };

            if tok.kind == TokenKind::Preproc {
                if acc.is_empty() {
                    return Some(SemiExpr::from_tokens(vec![tok]));
                }
                self.pending = Some(tok);
                break;
            }

            match tok.text.as_str() {
                "{" => {
                    acc.push(tok);
                    return Some(SemiExpr::from_tokens(acc));
                }
                "}" => {
                    if acc.is_empty() {
                        return Some(SemiExpr::from_tokens(vec![tok]));
                    }
                    self.pending = Some(tok);
                    break;
                }
                "(" => {
                    paren_depth += 1;
                    acc.push(tok);
                }
                ")" => {
                    paren_depth = paren_depth.saturating_sub(1);
                    acc.push(tok);
                }
                ";" if paren_depth == 0 => {
                    acc.push(tok);
                    return Some(SemiExpr::from_tokens(acc));
                }
                ":" if acc.len() == 1 && is_access_keyword(&acc[0]) => {
                    acc.push(tok);
                    return Some(SemiExpr::from_tokens(acc));
                }
                _ => acc.push(tok),
            }
        }

        if acc.is_empty() {
            None
        } else {
            Some(SemiExpr::from_tokens(acc))
        }
    }
}
