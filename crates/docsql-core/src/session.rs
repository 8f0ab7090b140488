//! Session facade tying a transport to statement execution.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::rows::Rows;
use crate::statement::{ExecResult, Statement};
use crate::transport::DocumentTransport;

/// What an UPDATE does when the store rejects its replace because the
/// document changed since it was read (HTTP 412).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreconditionPolicy {
    /// Report an unsuccessful result without an error.
    #[default]
    Suppress,
    /// Fail with [`crate::Error::Conflict`].
    Surface,
}

impl FromStr for PreconditionPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "suppress" => Ok(Self::Suppress),
            "surface" => Ok(Self::Surface),
            other => Err(format!(
                "unknown precondition policy '{other}', expected 'suppress' or 'surface'"
            )),
        }
    }
}

impl fmt::Display for PreconditionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Suppress => write!(f, "suppress"),
            Self::Surface => write!(f, "surface"),
        }
    }
}

/// Execution settings shared by the statements of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Handling of stale concurrency tokens on UPDATE.
    pub precondition_policy: PreconditionPolicy,
}

/// Parses and runs statements against one transport.
///
/// # Example
///
/// ```
/// use docsql_core::{MemoryStore, Session};
/// use serde_json::json;
///
/// let store = MemoryStore::new();
/// store.create_collection("shop", "orders");
/// let session = Session::new(store);
///
/// let result = session
///     .exec(
///         r#"INSERT INTO shop.orders (id, qty) VALUES ("\"o1\"", :1)"#,
///         &[json!(3), json!("o1")],
///     )
///     .unwrap();
/// assert_eq!(result.rows_affected(), 1);
///
/// let rows: Vec<_> = session
///     .query("SELECT * FROM orders WITH db=shop", &[])
///     .unwrap()
///     .collect();
/// assert_eq!(rows.len(), 1);
/// ```
#[derive(Debug)]
pub struct Session<T: DocumentTransport> {
    transport: T,
    config: SessionConfig,
}

impl<T: DocumentTransport> Session<T> {
    /// Creates a session with the default configuration.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, SessionConfig::default())
    }

    /// Creates a session with the given configuration.
    pub const fn with_config(transport: T, config: SessionConfig) -> Self {
        Self { transport, config }
    }

    /// Returns the transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the configuration.
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Consumes the session, returning the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Parses and validates a statement without executing it.
    pub fn prepare(&self, text: &str) -> Result<Statement> {
        Statement::parse(text)
    }

    /// Executes an INSERT, UPSERT, UPDATE or DELETE.
    pub fn exec(&self, text: &str, args: &[Value]) -> Result<ExecResult> {
        let stmt = self.prepare(text)?;
        debug!(statement = text, args = args.len(), "exec");
        stmt.exec(&self.transport, &self.config, args)
    }

    /// Runs a SELECT.
    pub fn query(&self, text: &str, args: &[Value]) -> Result<Rows> {
        let stmt = self.prepare(text)?;
        debug!(statement = text, args = args.len(), "query");
        stmt.query(&self.transport, args)
    }
}
