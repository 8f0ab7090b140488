//! SELECT passthrough.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_json::Value;
use tracing::debug;

use super::{map_status, placeholder_regex};
use crate::error::{Error, Result};
use crate::options::{split_with_clause, WithOptions};
use crate::rows::Rows;
use crate::transport::{DocumentTransport, QueryParam, QueryRequest};

fn select_regex() -> &'static Regex {
    static SELECT: OnceLock<Regex> = OnceLock::new();
    SELECT.get_or_init(|| {
        Regex::new(r"(?is)^SELECT\s+(CROSS\s+PARTITION\s+)?(.*)$").expect("valid SELECT regex")
    })
}

fn from_regex() -> &'static Regex {
    static FROM: OnceLock<Regex> = OnceLock::new();
    FROM.get_or_init(|| Regex::new(r"(?is)\bFROM\s+([\w-]+)").expect("valid FROM regex"))
}

/// Name of the native query parameter bound to placeholder `index`.
#[must_use]
pub fn parameter_name(index: usize) -> String {
    format!("@_{index}")
}

/// A query in the store's own SQL grammar, with a few extensions:
///
/// - `SELECT CROSS PARTITION ...` or `WITH cross_partition=true` lets the
///   query run across partitions.
/// - `WITH database=<db>` (or `WITH db=<db>`) names the database.
/// - `WITH collection=<coll>` (or `WITH table=<coll>`) names the collection;
///   without it the name after `FROM` is used.
/// - Placeholders `:n`, `@n` and `$n` are rewritten to `@_n` parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    db_name: String,
    coll_name: String,
    cross_partition: bool,
    query: String,
    placeholders: BTreeMap<usize, String>,
    num_input: usize,
}

impl SelectStatement {
    /// Parses a full `SELECT` statement.
    pub fn parse(text: &str) -> Result<Self> {
        let caps = select_regex()
            .captures(text.trim())
            .ok_or_else(|| Error::invalid_token(text))?;
        let mut cross_partition = caps.get(1).is_some();
        let (body, with_block) = split_with_clause(caps.get(2).map_or("", |m| m.as_str()));
        let opts = WithOptions::parse(with_block)?;

        let mut db_name = String::new();
        let mut coll_name = from_regex()
            .captures(body)
            .map(|c| c[1].to_string())
            .unwrap_or_default();
        if let Some(db) = opts.first_of(&["DATABASE", "DB"]) {
            db_name = db.trim().to_string();
        }
        if let Some(coll) = opts.first_of(&["COLLECTION", "TABLE"]) {
            coll_name = coll.trim().to_string();
        }
        if let Some(flag) = opts.get("CROSS_PARTITION") {
            if !cross_partition {
                if !matches!(flag, "1" | "t" | "T" | "true" | "TRUE" | "True") {
                    return Err(Error::parse(format!(
                        "the only accepted value for cross_partition is true, invalid token at: {flag}"
                    )));
                }
                cross_partition = true;
            }
        }

        let (query, placeholders, num_input) = rewrite_placeholders(&format!("SELECT {body}"))?;
        let stmt = Self {
            db_name,
            coll_name,
            cross_partition,
            query,
            placeholders,
            num_input,
        };
        stmt.validate()?;
        Ok(stmt)
    }

    /// Checks that both the database and the collection are known.
    pub fn validate(&self) -> Result<()> {
        if self.db_name.is_empty() || self.coll_name.is_empty() {
            return Err(Error::Validation(
                "database or collection is not specified".to_string(),
            ));
        }
        Ok(())
    }

    /// Database name.
    #[must_use]
    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    /// Collection name.
    #[must_use]
    pub fn coll_name(&self) -> &str {
        &self.coll_name
    }

    /// Whether the query may run across partitions.
    #[must_use]
    pub const fn is_cross_partition(&self) -> bool {
        self.cross_partition
    }

    /// The rewritten query text sent to the store.
    #[must_use]
    pub fn query_text(&self) -> &str {
        &self.query
    }

    /// Number of placeholder occurrences in the query.
    #[must_use]
    pub const fn num_input(&self) -> usize {
        self.num_input
    }

    /// Binds the arguments to their parameters: argument `i` (1-based) is
    /// bound to `@_i`, which must occur in the query. Every placeholder of
    /// the query must have an argument.
    pub fn bind(&self, args: &[Value]) -> Result<Vec<QueryParam>> {
        if let Some(&highest) = self.placeholders.keys().next_back() {
            if highest > args.len() {
                return Err(Error::PlaceholderIndex(highest));
            }
        }
        args.iter()
            .enumerate()
            .map(|(i, value)| {
                let name = self
                    .placeholders
                    .get(&(i + 1))
                    .ok_or(Error::MissingParameter(i + 1))?;
                Ok(QueryParam {
                    name: name.clone(),
                    value: value.clone(),
                })
            })
            .collect()
    }

    /// Runs the query, following continuation tokens until the last page.
    ///
    /// Pages are fetched one after another with no upper bound on their
    /// number.
    pub fn query<T: DocumentTransport + ?Sized>(&self, transport: &T, args: &[Value]) -> Result<Rows> {
        let mut request = QueryRequest {
            db_name: self.db_name.clone(),
            coll_name: self.coll_name.clone(),
            query: self.query.clone(),
            params: self.bind(args)?,
            cross_partition: self.cross_partition,
            continuation_token: None,
        };

        let mut documents = Vec::new();
        let mut pages = 0_usize;
        loop {
            let page = transport.query_documents(&request).map_err(map_status)?;
            pages += 1;
            debug!(
                db = %request.db_name,
                coll = %request.coll_name,
                page = pages,
                documents = page.documents.len(),
                "fetched query page"
            );
            let next = page.next_token().map(str::to_string);
            documents.extend(page.documents);
            match next {
                Some(token) => request.continuation_token = Some(token),
                None => break,
            }
        }
        Ok(Rows::new(documents))
    }
}

/// Rewrites every `[$@:]<n>` occurrence to `@_<n>`.
///
/// Returns the rewritten text, the parameter name of each index and the
/// number of occurrences.
fn rewrite_placeholders(query: &str) -> Result<(String, BTreeMap<usize, String>, usize)> {
    let mut placeholders = BTreeMap::new();
    let mut occurrences = 0;
    for caps in placeholder_regex().captures_iter(query) {
        let index: usize = caps[1]
            .parse()
            .map_err(|_| Error::invalid_token(&caps[0]))?;
        placeholders.insert(index, parameter_name(index));
        occurrences += 1;
    }
    let rewritten = placeholder_regex()
        .replace_all(query, |caps: &Captures<'_>| {
            caps[1]
                .parse()
                .map_or_else(|_| caps[0].to_string(), parameter_name)
        })
        .into_owned();
    Ok((rewritten, placeholders, occurrences))
}
