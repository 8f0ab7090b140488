//! Value-list tokenizer.

use serde_json::Value;

use super::ValueToken;
use crate::error::{Error, Result};

/// A cursor-based lexer over a comma separated value list.
///
/// At each position the recognizers are tried in a fixed order:
/// placeholder, `null`, number, boolean, double-quoted JSON. After a match
/// the lexer skips trailing whitespace and at most one comma.
pub struct ValueLexer<'a> {
    /// The input text.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// The byte position of the start of the current token.
    start: usize,
}

impl<'a> ValueLexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
        }
    }

    /// Returns the unconsumed part of the input.
    #[must_use]
    pub fn remainder(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Returns true once only whitespace remains.
    pub fn is_at_end(&mut self) -> bool {
        self.skip_whitespace();
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    /// Skips whitespace, one optional comma, and whitespace again.
    fn skip_separator(&mut self) {
        self.skip_whitespace();
        if self.peek() == Some(',') {
            self.advance();
        }
        self.skip_whitespace();
    }

    fn token_text(&self) -> &'a str {
        &self.input[self.start..self.pos]
    }

    /// Scans the next value token.
    ///
    /// Returns `Ok(None)` once the input is exhausted.
    pub fn next_value(&mut self) -> Result<Option<ValueToken>> {
        if self.is_at_end() {
            return Ok(None);
        }
        self.start = self.pos;

        let token = if let Some(index) = self.scan_placeholder()? {
            ValueToken::Placeholder(index)
        } else if self.scan_keyword("null") {
            ValueToken::Literal(Value::Null)
        } else if let Some(number) = self.scan_number()? {
            ValueToken::Literal(number)
        } else if let Some(flag) = self.scan_boolean() {
            ValueToken::Literal(Value::Bool(flag))
        } else if let Some(value) = self.scan_string()? {
            ValueToken::Literal(value)
        } else {
            return Err(Error::invalid_token(self.remainder()));
        };

        self.skip_separator();
        Ok(Some(token))
    }

    /// Scans the `<field-name>=` prefix of an assignment.
    pub fn next_field(&mut self) -> Result<String> {
        self.skip_whitespace();
        self.start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            self.advance();
        }
        let field = self.token_text();
        self.skip_whitespace();
        if field.is_empty() || self.peek() != Some('=') {
            self.pos = self.start;
            return Err(Error::parse(format!(
                "(field) invalid token at: {}",
                self.remainder()
            )));
        }
        self.advance(); // =
        Ok(field.to_string())
    }

    /// Scans `[$@:]<digits>`.
    fn scan_placeholder(&mut self) -> Result<Option<usize>> {
        if !matches!(self.peek(), Some('$' | '@' | ':'))
            || !self.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            return Ok(None);
        }
        self.advance(); // sigil
        let digits_start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        self.input[digits_start..self.pos]
            .parse()
            .map(Some)
            .map_err(|_| Error::invalid_token(self.token_text()))
    }

    /// Matches a case-insensitive bare word that is not followed by an
    /// identifier character.
    fn scan_keyword(&mut self, word: &str) -> bool {
        let rest = self.remainder();
        let Some(head) = rest.get(..word.len()) else {
            return false;
        };
        if !head.eq_ignore_ascii_case(word) {
            return false;
        }
        if rest[word.len()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            return false;
        }
        self.pos += word.len();
        true
    }

    fn scan_boolean(&mut self) -> Option<bool> {
        if self.scan_keyword("true") {
            Some(true)
        } else if self.scan_keyword("false") {
            Some(false)
        } else {
            None
        }
    }

    /// Scans a numeric literal and parses it as JSON.
    fn scan_number(&mut self) -> Result<Option<Value>> {
        if !self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'))
        {
            return Ok(None);
        }
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+'))
        {
            self.advance();
        }
        let text = self.token_text();
        match serde_json::from_str::<Value>(text) {
            Ok(value @ Value::Number(_)) => Ok(Some(value)),
            _ => Err(Error::parse(format!("(number) invalid token at: {text}"))),
        }
    }

    /// Scans a double-quoted literal whose unescaped content is JSON text.
    fn scan_string(&mut self) -> Result<Option<Value>> {
        if self.peek() != Some('"') {
            return Ok(None);
        }
        self.advance(); // opening quote
        loop {
            match self.advance() {
                Some('\\') => {
                    self.advance();
                }
                Some('"') => break,
                Some(_) => {}
                None => {
                    return Err(Error::parse(format!(
                        "unterminated string at: {}",
                        self.token_text()
                    )));
                }
            }
        }

        let literal = self.token_text();
        let unquoted: String = serde_json::from_str(literal)
            .map_err(|_| Error::parse(format!("(unquote) invalid token at: {literal}")))?;
        let value = serde_json::from_str(&unquoted)
            .map_err(|_| Error::parse(format!("(unmarshal) invalid token at: {unquoted}")))?;
        Ok(Some(value))
    }
}

/// Tokenizes a whole value list.
pub fn tokenize(input: &str) -> Result<Vec<ValueToken>> {
    let mut lexer = ValueLexer::new(input);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_value()? {
        tokens.push(token);
    }
    Ok(tokens)
}
