#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;

use docsql_core::{
    DocInfo, DocumentRef, DocumentSpec, DocumentTransport, QueryPage, QueryRequest,
    TransportError,
};
use serde_json::Value;

/// A transport call as seen by the stub.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(DocumentSpec),
    Delete(DocumentRef),
    Get(DocumentRef),
    Replace { etag: String, spec: DocumentSpec },
    Query(QueryRequest),
}

/// A transport that records every call and answers from scripted queues.
///
/// When a queue is empty the call succeeds with an empty answer.
#[derive(Default)]
pub struct StubTransport {
    calls: RefCell<Vec<Call>>,
    create: RefCell<VecDeque<Result<DocInfo, TransportError>>>,
    delete: RefCell<VecDeque<Result<(), TransportError>>>,
    get: RefCell<VecDeque<Result<DocInfo, TransportError>>>,
    replace: RefCell<VecDeque<Result<DocInfo, TransportError>>>,
    query: RefCell<VecDeque<Result<QueryPage, TransportError>>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_create(self, response: Result<DocInfo, TransportError>) -> Self {
        self.create.borrow_mut().push_back(response);
        self
    }

    pub fn on_delete(self, response: Result<(), TransportError>) -> Self {
        self.delete.borrow_mut().push_back(response);
        self
    }

    pub fn on_get(self, response: Result<DocInfo, TransportError>) -> Self {
        self.get.borrow_mut().push_back(response);
        self
    }

    pub fn on_replace(self, response: Result<DocInfo, TransportError>) -> Self {
        self.replace.borrow_mut().push_back(response);
        self
    }

    pub fn on_query(self, response: Result<QueryPage, TransportError>) -> Self {
        self.query.borrow_mut().push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn query_calls(&self) -> Vec<QueryRequest> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Query(q) => Some(q.clone()),
                _ => None,
            })
            .collect()
    }
}

impl DocumentTransport for StubTransport {
    fn create_document(&self, spec: &DocumentSpec) -> Result<DocInfo, TransportError> {
        self.calls.borrow_mut().push(Call::Create(spec.clone()));
        self.create
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(DocInfo::new()))
    }

    fn delete_document(&self, doc: &DocumentRef) -> Result<(), TransportError> {
        self.calls.borrow_mut().push(Call::Delete(doc.clone()));
        self.delete.borrow_mut().pop_front().unwrap_or(Ok(()))
    }

    fn get_document(&self, doc: &DocumentRef) -> Result<DocInfo, TransportError> {
        self.calls.borrow_mut().push(Call::Get(doc.clone()));
        self.get
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(DocInfo::new()))
    }

    fn replace_document(&self, etag: &str, spec: &DocumentSpec) -> Result<DocInfo, TransportError> {
        self.calls.borrow_mut().push(Call::Replace {
            etag: etag.to_string(),
            spec: spec.clone(),
        });
        self.replace
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(DocInfo::new()))
    }

    fn query_documents(&self, query: &QueryRequest) -> Result<QueryPage, TransportError> {
        self.calls.borrow_mut().push(Call::Query(query.clone()));
        self.query
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(QueryPage::default()))
    }
}

/// Builds a document from a JSON object literal.
pub fn doc(value: Value) -> DocInfo {
    serde_json::from_value(value).expect("document must be a JSON object")
}

pub fn document_not_found() -> TransportError {
    TransportError::new(
        404,
        "Entity with the specified id does not exist in the system. ResourceType: Document, ResourceId: d1",
    )
}

pub fn collection_not_found() -> TransportError {
    TransportError::new(
        404,
        "Owner resource does not exist. ResourceType: Collection, ResourceId: db1/coll1",
    )
}

pub fn page(documents: Vec<DocInfo>, token: &str) -> QueryPage {
    QueryPage {
        documents,
        continuation_token: Some(token.to_string()),
    }
}
