//! Error types for statement parsing and execution.

use crate::transport::TransportError;

/// Errors raised while parsing, validating or executing a statement.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The statement text is malformed.
    #[error("cannot parse query: {message}")]
    Parse {
        /// Description of the offending input.
        message: String,
    },

    /// A required clause is missing or inconsistent.
    #[error("invalid query: {0}")]
    Validation(String),

    /// A placeholder references an argument that is not bound.
    #[error("invalid value index {0}")]
    PlaceholderIndex(usize),

    /// The number of supplied arguments does not match the statement.
    #[error("expected {expected} argument(s), got {actual}")]
    ArgumentCount {
        /// Arguments required by the statement.
        expected: usize,
        /// Arguments supplied by the caller.
        actual: usize,
    },

    /// A positional argument has no matching placeholder in a query.
    #[error("there is no placeholder number {0}")]
    MissingParameter(usize),

    /// The operation is not available for this kind of statement.
    #[error("this operation is not supported, please use {0}")]
    Unsupported(&'static str),

    /// The remote store refused the operation (HTTP 403).
    #[error("forbidden")]
    Forbidden,

    /// The database, collection or document does not exist (HTTP 404).
    #[error("not found")]
    NotFound,

    /// The operation conflicts with the stored state (HTTP 409).
    #[error("conflict")]
    Conflict,

    /// Any other failure reported by the transport.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl Error {
    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Creates a parse error pointing at the unconsumed remainder of the input.
    pub fn invalid_token(remainder: &str) -> Self {
        Self::parse(format!("invalid token at: {remainder}"))
    }
}

/// Result type for statement operations.
pub type Result<T> = std::result::Result<T, Error>;
