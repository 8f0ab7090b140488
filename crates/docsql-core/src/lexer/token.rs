//! Value tokens produced by the lexer.

use serde_json::Value;

use crate::error::{Error, Result};

/// A single entry of a value list.
///
/// Tokens are produced once when a statement is parsed and are immutable
/// afterwards. Placeholders are resolved against the runtime arguments on
/// every execution.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueToken {
    /// A literal JSON value (`null`, a number, a boolean or a quoted JSON text).
    Literal(Value),
    /// A 1-based reference to a positional argument (`:1`, `@2`, `$3`).
    Placeholder(usize),
}

impl ValueToken {
    /// Returns true if this token is a placeholder.
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    /// Resolves the token against the bound arguments.
    ///
    /// The last argument is always the partition key, so a placeholder may
    /// only reference positions `1..args.len()`.
    pub fn resolve(&self, args: &[Value]) -> Result<Value> {
        match self {
            Self::Literal(value) => Ok(value.clone()),
            Self::Placeholder(index) => resolve_placeholder(*index, args).cloned(),
        }
    }
}

/// Looks up the argument bound to a 1-based placeholder index.
pub fn resolve_placeholder(index: usize, args: &[Value]) -> Result<&Value> {
    if index == 0 || index >= args.len() {
        return Err(Error::PlaceholderIndex(index));
    }
    Ok(&args[index - 1])
}

/// Parses text that consists of exactly one placeholder token.
///
/// Returns `None` when the text is not a placeholder at all.
#[must_use]
pub fn parse_placeholder(text: &str) -> Option<usize> {
    let mut chars = text.chars();
    if !matches!(chars.next(), Some('$' | '@' | ':')) {
        return None;
    }
    let digits = chars.as_str();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
