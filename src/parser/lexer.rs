//! Lexer (tokenizer) for macro source text
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! The lexer never fails: malformed numbers degrade to `0` and an unterminated
//! string literal absorbs the rest of the input.

use super::ast::{Keyword, SourceLocation, TokenKind};
use std::fmt;
use tracing::{debug, trace};

/// A classified lexical unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            value: value.into(),
            location,
        }
    }

    /// Returns the keyword for `Keyword` tokens
    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword => Keyword::from_word(&self.value),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Function => write!(f, "action '{}'", self.value),
            TokenKind::Keyword => write!(f, "'{}'", self.value),
            TokenKind::String => write!(f, "string literal \"{}\"", self.value),
            TokenKind::Number => write!(f, "number {}", self.value),
        }
    }
}

/// Tokenize `source` in one pass
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}

/// Lexer for macro source text
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
                continue;
            }

            let token = self.next_token(ch);
            trace!(kind = %token.kind, value = %token.value, "token");
            tokens.push(token);

            // Step past the closing quote or the whitespace that ended the token
            self.advance();
        }

        debug!(count = tokens.len(), "tokenized macro source");
        tokens
    }

    /// Scan the token starting at the current position.
    ///
    /// Leaves the cursor on the character that terminated the token.
    fn next_token(&mut self, ch: char) -> Token {
        let loc = self.current_location();

        match ch {
            '"' => Token::new(TokenKind::String, self.string_literal(), loc),
            '0'..='9' => Token::new(TokenKind::Number, self.number_literal(), loc),
            _ => {
                let word = self.read_word();
                let kind = match Keyword::from_word(&word) {
                    Some(_) => TokenKind::Keyword,
                    None => TokenKind::Function,
                };
                Token::new(kind, word, loc)
            }
        }
    }

    /// Read a string literal; escapes are not interpreted
    fn string_literal(&mut self) -> String {
        let start = self.current_location();
        self.advance(); // opening quote
        let mut string = String::new();

        while let Some(ch) = self.peek() {
            if ch == '"' {
                return string;
            }
            string.push(ch);
            self.advance();
        }

        debug!(%start, "unterminated string literal runs to end of input");
        string
    }

    /// Read a numeric literal and render it in canonical decimal form
    fn number_literal(&mut self) -> String {
        let text = self.read_word();
        let value = text.parse::<i64>().unwrap_or_else(|_| {
            debug!(literal = %text, "malformed number literal, using 0");
            0
        });
        value.to_string()
    }

    /// Accumulate characters up to the next whitespace or end of input
    fn read_word(&mut self) -> String {
        let mut word = String::new();

        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                break;
            }
            word.push(ch);
            self.advance();
        }

        word
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    /// Get current source location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}
