//! Value-list lexer.
//!
//! Turns the text of a `VALUES (...)` list or the right-hand side of a
//! `SET` assignment into typed [`ValueToken`]s.

mod token;
mod tokenizer;

pub use token::{parse_placeholder, resolve_placeholder, ValueToken};
pub use tokenizer::{tokenize, ValueLexer};
