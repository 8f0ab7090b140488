//! Statement parsing and execution.
//!
//! Supported statements (keywords are case-insensitive):
//!
//! ```text
//! INSERT|UPSERT INTO <db>.<coll> (<field>[,<field>]*) VALUES (<value>[,<value>]*)
//! DELETE FROM <db>.<coll> WHERE id=<id>
//! UPDATE <db>.<coll> SET <field>=<value>[,<field>=<value>]* WHERE id=<id>
//! SELECT [CROSS PARTITION] ... FROM <coll> ... [WITH database|db=<db>] [WITH collection|table=<coll>] [WITH cross_partition=true]
//! ```
//!
//! A `<value>` is a placeholder (`:1`, `@2`, `$3`), `null`, a number,
//! `true`/`false`, or a double-quoted JSON text such as `"\"a string\""`,
//! `"123"` or `"{\"key\":\"value\"}"`.
//!
//! INSERT, UPDATE and DELETE take the partition key value as their last
//! argument.

mod delete;
mod insert;
mod select;
mod update;

pub use delete::DeleteStatement;
pub use insert::InsertStatement;
pub use select::SelectStatement;
pub use update::UpdateStatement;

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::lexer::{parse_placeholder, resolve_placeholder};
use crate::rows::Rows;
use crate::session::SessionConfig;
use crate::transport::{status, DocumentTransport, TransportError};

fn insert_regex() -> &'static Regex {
    static INSERT: OnceLock<Regex> = OnceLock::new();
    INSERT.get_or_init(|| {
        Regex::new(
            r"(?is)^(INSERT|UPSERT)\s+INTO\s+([\w-]+)\.([\w-]+)\s*\((.*?)\)\s*VALUES\s*\((.*)\)$",
        )
        .expect("valid INSERT regex")
    })
}

fn delete_regex() -> &'static Regex {
    static DELETE: OnceLock<Regex> = OnceLock::new();
    DELETE.get_or_init(|| {
        Regex::new(r"(?is)^DELETE\s+FROM\s+([\w-]+)\.([\w-]+)\s+WHERE\s+id\s*=\s*(.*)$")
            .expect("valid DELETE regex")
    })
}

fn update_regex() -> &'static Regex {
    static UPDATE: OnceLock<Regex> = OnceLock::new();
    UPDATE.get_or_init(|| {
        Regex::new(r"(?is)^UPDATE\s+([\w-]+)\.([\w-]+)\s+SET\b(.*)\bWHERE\s+id\s*=\s*(.*)$")
            .expect("valid UPDATE regex")
    })
}

/// Matches `[$@:]<digits>` anywhere in a text.
pub(crate) fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"[$@:](\d+)").expect("valid placeholder regex"))
}

/// A parsed and validated statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// INSERT or UPSERT.
    Insert(InsertStatement),
    /// DELETE by id.
    Delete(DeleteStatement),
    /// UPDATE by id.
    Update(UpdateStatement),
    /// SELECT passthrough.
    Select(SelectStatement),
}

impl Statement {
    /// Parses and validates a statement.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim().trim_end_matches(';').trim_end();

        if let Some(caps) = insert_regex().captures(text) {
            let is_upsert = caps[1].eq_ignore_ascii_case("UPSERT");
            return InsertStatement::parse(&caps[2], &caps[3], is_upsert, &caps[4], &caps[5])
                .map(Self::Insert);
        }
        if let Some(caps) = delete_regex().captures(text) {
            return DeleteStatement::parse(&caps[1], &caps[2], &caps[3]).map(Self::Delete);
        }
        if let Some(caps) = update_regex().captures(text) {
            return UpdateStatement::parse(&caps[1], &caps[2], &caps[3], &caps[4])
                .map(Self::Update);
        }
        if text
            .get(..6)
            .is_some_and(|head| head.eq_ignore_ascii_case("SELECT"))
        {
            return SelectStatement::parse(text).map(Self::Select);
        }
        Err(Error::parse(format!("unsupported statement: {text}")))
    }

    /// Returns the number of arguments the statement must be executed with.
    #[must_use]
    pub const fn num_input(&self) -> usize {
        match self {
            Self::Insert(s) => s.num_input(),
            Self::Delete(s) => s.num_input(),
            Self::Update(s) => s.num_input(),
            Self::Select(s) => s.num_input(),
        }
    }

    /// Executes a data-modifying statement.
    pub fn exec<T: DocumentTransport + ?Sized>(
        &self,
        transport: &T,
        config: &SessionConfig,
        args: &[Value],
    ) -> Result<ExecResult> {
        match self {
            Self::Insert(s) => s.exec(transport, args),
            Self::Delete(s) => s.exec(transport, args),
            Self::Update(s) => s.exec(transport, config.precondition_policy, args),
            Self::Select(_) => Err(Error::Unsupported("query")),
        }
    }

    /// Runs a query statement.
    pub fn query<T: DocumentTransport + ?Sized>(&self, transport: &T, args: &[Value]) -> Result<Rows> {
        match self {
            Self::Select(s) => s.query(transport, args),
            _ => Err(Error::Unsupported("exec")),
        }
    }
}

/// Outcome of INSERT, UPDATE and DELETE.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecResult {
    /// Whether the store applied the change.
    pub successful: bool,
    /// The `_rid` of an inserted document.
    pub insert_id: Option<String>,
}

impl ExecResult {
    pub(crate) fn applied(insert_id: Option<String>) -> Self {
        Self {
            successful: true,
            insert_id,
        }
    }

    /// A benign outcome where nothing was changed (document absent, stale
    /// concurrency token).
    pub(crate) const fn unchanged() -> Self {
        Self {
            successful: false,
            insert_id: None,
        }
    }

    /// Returns 1 if the change was applied, 0 otherwise.
    #[must_use]
    pub const fn rows_affected(&self) -> u64 {
        if self.successful {
            1
        } else {
            0
        }
    }
}

/// The `id` of a DELETE or UPDATE target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentId {
    /// A literal id.
    Literal(String),
    /// An id bound at execution time.
    Placeholder(usize),
}

impl DocumentId {
    /// Parses the text following `WHERE id=`.
    ///
    /// Accepts a double-quoted string, a bare token, or a single placeholder
    /// spanning the whole text.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let invalid = || Error::parse(format!("invalid id literal: {text}"));

        let has_prefix = text.starts_with('"');
        let has_suffix = text.len() > 1 && text.ends_with('"');
        if has_prefix != has_suffix {
            return Err(invalid());
        }
        if has_prefix {
            return Ok(Self::Literal(text[1..text.len() - 1].trim().to_string()));
        }
        if placeholder_regex().is_match(text) {
            return match parse_placeholder(text) {
                Some(index) if index >= 1 => Ok(Self::Placeholder(index)),
                _ => Err(invalid()),
            };
        }
        Ok(Self::Literal(text.to_string()))
    }

    /// Returns true if the id is a placeholder.
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    /// Returns true for an empty literal id.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Literal(id) if id.is_empty())
    }

    /// Resolves the id against the bound arguments.
    pub fn resolve(&self, args: &[Value]) -> Result<String> {
        match self {
            Self::Literal(id) => Ok(id.clone()),
            Self::Placeholder(index) => Ok(match resolve_placeholder(*index, args)? {
                Value::String(id) => id.clone(),
                other => other.to_string(),
            }),
        }
    }
}

/// Fails unless exactly `expected` arguments were supplied.
pub(crate) fn check_arg_count(expected: usize, args: &[Value]) -> Result<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(Error::ArgumentCount {
            expected,
            actual: args.len(),
        })
    }
}

/// Returns the trailing partition key argument.
pub(crate) fn partition_key(args: &[Value]) -> Result<Vec<Value>> {
    args.last()
        .map(|value| vec![value.clone()])
        .ok_or(Error::ArgumentCount {
            expected: 1,
            actual: 0,
        })
}

/// Maps the status codes shared by every operation.
pub(crate) fn map_status(err: TransportError) -> Error {
    match err.status {
        status::FORBIDDEN => Error::Forbidden,
        status::NOT_FOUND => Error::NotFound,
        status::CONFLICT => Error::Conflict,
        _ => Error::Transport(err),
    }
}
