//! `WITH <key>=<value>` statement extensions.
//!
//! Options trail the statement body, e.g.
//! `SELECT * FROM c WITH db=shop WITH cross_partition=true`.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};

fn with_tail_regex() -> &'static Regex {
    static WITH_TAIL: OnceLock<Regex> = OnceLock::new();
    WITH_TAIL.get_or_init(|| {
        Regex::new(r"(?is)(?:\s+WITH\s+[\w-]+\s*=\s*[^\s,]+\s*,?)+\s*$")
            .expect("valid WITH tail regex")
    })
}

fn with_block_regex() -> &'static Regex {
    static WITH_BLOCK: OnceLock<Regex> = OnceLock::new();
    WITH_BLOCK.get_or_init(|| {
        Regex::new(r"(?is)^\s*(?:WITH\s+[\w-]+\s*=\s*[^\s,]+\s*,?\s*)*$")
            .expect("valid WITH block regex")
    })
}

fn with_clause_regex() -> &'static Regex {
    static WITH_CLAUSE: OnceLock<Regex> = OnceLock::new();
    WITH_CLAUSE.get_or_init(|| {
        Regex::new(r"(?is)WITH\s+([\w-]+)\s*=\s*([^\s,]+)").expect("valid WITH clause regex")
    })
}

/// Splits a statement into its body and its trailing `WITH` clauses.
#[must_use]
pub fn split_with_clause(text: &str) -> (&str, &str) {
    match with_tail_regex().find(text) {
        Some(found) => (&text[..found.start()], &text[found.start()..]),
        None => (text, ""),
    }
}

/// Parsed `WITH` options, keyed by upper-cased option name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WithOptions {
    options: BTreeMap<String, String>,
}

impl WithOptions {
    /// Parses a block of `WITH` clauses. An empty block yields no options.
    pub fn parse(block: &str) -> Result<Self> {
        if !with_block_regex().is_match(block) {
            return Err(Error::invalid_token(block.trim()));
        }
        let options = with_clause_regex()
            .captures_iter(block)
            .map(|caps| {
                let value = caps[2].trim().trim_matches(|c| c == '"' || c == '\'');
                (caps[1].to_ascii_uppercase(), value.to_string())
            })
            .collect();
        Ok(Self { options })
    }

    /// Returns an option value; `key` is matched case-insensitively.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.options
            .get(&key.to_ascii_uppercase())
            .map(String::as_str)
    }

    /// Returns the value of the first key present.
    #[must_use]
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.get(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_without_options() {
        let (body, tail) = split_with_clause("SELECT * FROM c");
        assert_eq!(body, "SELECT * FROM c");
        assert_eq!(tail, "");
    }

    #[test]
    fn test_split_with_options() {
        let (body, tail) =
            split_with_clause("SELECT * FROM c WHERE c.a = 1 WITH db=shop, WITH table=orders");
        assert_eq!(body, "SELECT * FROM c WHERE c.a = 1");
        let opts = WithOptions::parse(tail).unwrap();
        assert_eq!(opts.get("db"), Some("shop"));
        assert_eq!(opts.get("TABLE"), Some("orders"));
    }

    #[test]
    fn test_with_inside_body_is_not_split() {
        let (body, tail) = split_with_clause("SELECT * FROM c WITH db=shop WHERE c.a = 1");
        assert_eq!(body, "SELECT * FROM c WITH db=shop WHERE c.a = 1");
        assert_eq!(tail, "");
    }

    #[test]
    fn test_first_of() {
        let opts = WithOptions::parse(" with database=a WITH db=b").unwrap();
        assert_eq!(opts.first_of(&["DATABASE", "DB"]), Some("a"));
        assert_eq!(opts.first_of(&["COLLECTION", "TABLE"]), None);
    }

    #[test]
    fn test_quoted_value() {
        let opts = WithOptions::parse(r#"WITH db="shop""#).unwrap();
        assert_eq!(opts.get("db"), Some("shop"));
    }

    #[test]
    fn test_garbage_block() {
        assert!(WithOptions::parse("WHERE a = 1").is_err());
        assert_eq!(WithOptions::parse("").unwrap(), WithOptions::default());
    }
}
