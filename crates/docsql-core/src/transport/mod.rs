//! The REST transport consumed by the executors.
//!
//! The executors never talk to the network themselves: they hand documents,
//! document references and queries to a [`DocumentTransport`] and map
//! its status codes into [`crate::Error`]. Calls are blocking and made one
//! at a time.

mod memory;

pub use memory::{Databases, MemoryStore, MemoryStoreSnapshot, StoredDocument, DEFAULT_PAGE_SIZE};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{DocInfo, DocumentRef, DocumentSpec};

/// Marker the store puts in a 404 message when the missing resource is a
/// document (as opposed to a database or collection).
pub const DOCUMENT_NOT_FOUND_MARKER: &str = "ResourceType: Document";

/// HTTP status codes the executors give a meaning to.
pub mod status {
    /// Access denied.
    pub const FORBIDDEN: u16 = 403;
    /// Database, collection or document absent.
    pub const NOT_FOUND: u16 = 404;
    /// Duplicate id or similar write conflict.
    pub const CONFLICT: u16 = 409;
    /// Concurrency token mismatch on replace.
    pub const PRECONDITION_FAILED: u16 = 412;
}

/// A failed transport call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("status {status}: {message}")]
pub struct TransportError {
    /// HTTP status code, `0` when no response was received.
    pub status: u16,
    /// Error text returned by the store.
    pub message: String,
}

impl TransportError {
    /// Creates a new transport error.
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Returns true if this is a 404 about a document rather than about its
    /// database or collection.
    ///
    /// The store only reports the resource kind inside the error text.
    #[must_use]
    pub fn is_document_not_found(&self) -> bool {
        self.status == status::NOT_FOUND && self.message.contains(DOCUMENT_NOT_FOUND_MARKER)
    }
}

/// A named query parameter (`@_1`, `@_2`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryParam {
    /// Parameter name including the `@` sigil.
    pub name: String,
    /// Bound value.
    pub value: Value,
}

/// A query to run against one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    /// Database name.
    pub db_name: String,
    /// Collection name.
    pub coll_name: String,
    /// Query text in the store's native syntax.
    pub query: String,
    /// Named parameters.
    pub params: Vec<QueryParam>,
    /// Whether the query may fan out across partitions.
    pub cross_partition: bool,
    /// Continuation token of the page to fetch, `None` for the first page.
    pub continuation_token: Option<String>,
}

/// One page of query results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPage {
    /// Documents on this page.
    pub documents: Vec<DocInfo>,
    /// Token for the next page; `None` or empty when this is the last page.
    pub continuation_token: Option<String>,
}

impl QueryPage {
    /// Returns the continuation token if another page remains.
    #[must_use]
    pub fn next_token(&self) -> Option<&str> {
        self.continuation_token
            .as_deref()
            .filter(|token| !token.is_empty())
    }
}

/// Blocking client for the document store's REST API.
pub trait DocumentTransport {
    /// Creates (or upserts, see [`DocumentSpec::is_upsert`]) a document and
    /// returns the stored document.
    fn create_document(&self, spec: &DocumentSpec) -> Result<DocInfo, TransportError>;

    /// Deletes a document.
    fn delete_document(&self, doc: &DocumentRef) -> Result<(), TransportError>;

    /// Fetches a document.
    fn get_document(&self, doc: &DocumentRef) -> Result<DocInfo, TransportError>;

    /// Replaces a document, provided its current concurrency token is `etag`.
    fn replace_document(&self, etag: &str, spec: &DocumentSpec) -> Result<DocInfo, TransportError>;

    /// Fetches one page of query results.
    fn query_documents(&self, query: &QueryRequest) -> Result<QueryPage, TransportError>;
}

impl<T: DocumentTransport + ?Sized> DocumentTransport for &T {
    fn create_document(&self, spec: &DocumentSpec) -> Result<DocInfo, TransportError> {
        (**self).create_document(spec)
    }

    fn delete_document(&self, doc: &DocumentRef) -> Result<(), TransportError> {
        (**self).delete_document(doc)
    }

    fn get_document(&self, doc: &DocumentRef) -> Result<DocInfo, TransportError> {
        (**self).get_document(doc)
    }

    fn replace_document(&self, etag: &str, spec: &DocumentSpec) -> Result<DocInfo, TransportError> {
        (**self).replace_document(etag, spec)
    }

    fn query_documents(&self, query: &QueryRequest) -> Result<QueryPage, TransportError> {
        (**self).query_documents(query)
    }
}

impl<T: DocumentTransport + ?Sized> DocumentTransport for Box<T> {
    fn create_document(&self, spec: &DocumentSpec) -> Result<DocInfo, TransportError> {
        (**self).create_document(spec)
    }

    fn delete_document(&self, doc: &DocumentRef) -> Result<(), TransportError> {
        (**self).delete_document(doc)
    }

    fn get_document(&self, doc: &DocumentRef) -> Result<DocInfo, TransportError> {
        (**self).get_document(doc)
    }

    fn replace_document(&self, etag: &str, spec: &DocumentSpec) -> Result<DocInfo, TransportError> {
        (**self).replace_document(etag, spec)
    }

    fn query_documents(&self, query: &QueryRequest) -> Result<QueryPage, TransportError> {
        (**self).query_documents(query)
    }
}
