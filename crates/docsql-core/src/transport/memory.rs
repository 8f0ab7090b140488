//! In-process document store.
//!
//! `MemoryStore` answers the transport calls the way the remote store does
//! (system attributes, status codes and 404 resource markers, continuation
//! paging) without a network. It does not evaluate query text: a query
//! returns every document of its collection.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::{status, DocumentTransport, QueryPage, QueryRequest, TransportError};
use crate::document::{DocInfo, DocumentRef, DocumentSpec};

/// Number of documents returned per query page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// A stored document together with its partition key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    /// Partition key values the document was written with.
    pub partition_key: Vec<Value>,
    /// The document including system attributes.
    pub document: DocInfo,
}

/// Serializable content of a [`MemoryStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStoreSnapshot {
    /// Counter used to mint resource ids and concurrency tokens.
    #[serde(default)]
    pub sequence: u64,
    /// Databases by name, each holding collections by name.
    #[serde(default)]
    pub databases: Databases,
}

/// A [`DocumentTransport`] backed by process memory.
#[derive(Debug)]
pub struct MemoryStore {
    state: RefCell<MemoryStoreSnapshot>,
    page_size: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::from_snapshot(MemoryStoreSnapshot::default())
    }

    /// Creates a store from a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: MemoryStoreSnapshot) -> Self {
        Self {
            state: RefCell::new(snapshot),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets the number of documents per query page.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Returns a copy of the current content.
    #[must_use]
    pub fn snapshot(&self) -> MemoryStoreSnapshot {
        self.state.borrow().clone()
    }

    /// Creates a database if it does not exist yet.
    pub fn create_database(&self, db_name: &str) {
        self.state
            .borrow_mut()
            .databases
            .entry(db_name.to_string())
            .or_default();
    }

    /// Creates a collection (and its database) if it does not exist yet.
    pub fn create_collection(&self, db_name: &str, coll_name: &str) {
        self.state
            .borrow_mut()
            .databases
            .entry(db_name.to_string())
            .or_default()
            .entry(coll_name.to_string())
            .or_default();
    }

    /// Returns the number of documents in a collection.
    #[must_use]
    pub fn document_count(&self, db_name: &str, coll_name: &str) -> Option<usize> {
        self.state
            .borrow()
            .databases
            .get(db_name)
            .and_then(|db| db.get(coll_name))
            .map(Vec::len)
    }
}

/// Databases by name, each holding collections by name.
pub type Databases = BTreeMap<String, BTreeMap<String, Vec<StoredDocument>>>;

fn collection_mut<'s>(
    databases: &'s mut Databases,
    db_name: &str,
    coll_name: &str,
) -> Result<&'s mut Vec<StoredDocument>, TransportError> {
    let db = databases.get_mut(db_name).ok_or_else(|| {
        TransportError::new(
            status::NOT_FOUND,
            format!("Owner resource does not exist. ResourceType: Database, ResourceId: {db_name}"),
        )
    })?;
    db.get_mut(coll_name).ok_or_else(|| {
        TransportError::new(
            status::NOT_FOUND,
            format!(
                "Owner resource does not exist. ResourceType: Collection, ResourceId: {db_name}/{coll_name}"
            ),
        )
    })
}

fn document_not_found(doc_id: &str) -> TransportError {
    TransportError::new(
        status::NOT_FOUND,
        format!(
            "Entity with the specified id does not exist in the system. ResourceType: Document, ResourceId: {doc_id}"
        ),
    )
}

fn document_id(data: &Map<String, Value>) -> Result<String, TransportError> {
    data.get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            TransportError::new(
                400,
                "The input content is invalid because the required properties - 'id; ' - are missing",
            )
        })
}

fn position(documents: &[StoredDocument], partition_key: &[Value], doc_id: &str) -> Option<usize> {
    documents
        .iter()
        .position(|stored| stored.partition_key == partition_key && stored.document.id() == Some(doc_id))
}

/// Adds system attributes to a user payload.
fn stamp(
    sequence: &mut u64,
    db_name: &str,
    coll_name: &str,
    mut data: Map<String, Value>,
    rid: Option<String>,
) -> DocInfo {
    *sequence += 1;
    let rid = rid.unwrap_or_else(|| format!("rid{sequence:08}=="));
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs());
    data.insert(
        "_self".to_string(),
        Value::String(format!("dbs/{db_name}/colls/{coll_name}/docs/{rid}/")),
    );
    data.insert("_etag".to_string(), Value::String(format!("\"{sequence:016x}\"")));
    data.insert("_rid".to_string(), Value::String(rid));
    data.insert("_ts".to_string(), Value::from(ts));
    data.insert("_attachments".to_string(), Value::String("attachments/".to_string()));
    DocInfo(data)
}

impl DocumentTransport for MemoryStore {
    fn create_document(&self, spec: &DocumentSpec) -> Result<DocInfo, TransportError> {
        debug!(db = %spec.db_name, coll = %spec.coll_name, upsert = spec.is_upsert, "create document");
        let mut state = self.state.borrow_mut();
        let MemoryStoreSnapshot {
            sequence,
            databases,
        } = &mut *state;
        let documents = collection_mut(databases, &spec.db_name, &spec.coll_name)?;
        let doc_id = document_id(&spec.document_data)?;
        match position(documents, &spec.partition_key_values, &doc_id) {
            Some(_) if !spec.is_upsert => Err(TransportError::new(
                status::CONFLICT,
                "Entity with the specified id already exists in the system.",
            )),
            Some(index) => {
                let rid = documents[index].document.rid().map(str::to_string);
                let document = stamp(
                    sequence,
                    &spec.db_name,
                    &spec.coll_name,
                    spec.document_data.clone(),
                    rid,
                );
                documents[index].document = document.clone();
                Ok(document)
            }
            None => {
                let document = stamp(
                    sequence,
                    &spec.db_name,
                    &spec.coll_name,
                    spec.document_data.clone(),
                    None,
                );
                documents.push(StoredDocument {
                    partition_key: spec.partition_key_values.clone(),
                    document: document.clone(),
                });
                Ok(document)
            }
        }
    }

    fn delete_document(&self, doc: &DocumentRef) -> Result<(), TransportError> {
        debug!(db = %doc.db_name, coll = %doc.coll_name, id = %doc.doc_id, "delete document");
        let mut state = self.state.borrow_mut();
        let documents = collection_mut(&mut state.databases, &doc.db_name, &doc.coll_name)?;
        let index = position(documents, &doc.partition_key_values, &doc.doc_id)
            .ok_or_else(|| document_not_found(&doc.doc_id))?;
        documents.remove(index);
        Ok(())
    }

    fn get_document(&self, doc: &DocumentRef) -> Result<DocInfo, TransportError> {
        debug!(db = %doc.db_name, coll = %doc.coll_name, id = %doc.doc_id, "get document");
        let mut state = self.state.borrow_mut();
        let documents = collection_mut(&mut state.databases, &doc.db_name, &doc.coll_name)?;
        position(documents, &doc.partition_key_values, &doc.doc_id)
            .map(|index| documents[index].document.clone())
            .ok_or_else(|| document_not_found(&doc.doc_id))
    }

    fn replace_document(&self, etag: &str, spec: &DocumentSpec) -> Result<DocInfo, TransportError> {
        debug!(db = %spec.db_name, coll = %spec.coll_name, etag, "replace document");
        let mut state = self.state.borrow_mut();
        let MemoryStoreSnapshot {
            sequence,
            databases,
        } = &mut *state;
        let documents = collection_mut(databases, &spec.db_name, &spec.coll_name)?;
        let doc_id = document_id(&spec.document_data)?;
        let index = position(documents, &spec.partition_key_values, &doc_id)
            .ok_or_else(|| document_not_found(&doc_id))?;
        let current = &documents[index].document;
        if !etag.is_empty() && current.etag() != Some(etag) {
            return Err(TransportError::new(
                status::PRECONDITION_FAILED,
                "One of the specified pre-condition is not met",
            ));
        }
        let rid = current.rid().map(str::to_string);
        let document = stamp(
            sequence,
            &spec.db_name,
            &spec.coll_name,
            spec.document_data.clone(),
            rid,
        );
        documents[index].document = document.clone();
        Ok(document)
    }

    fn query_documents(&self, query: &QueryRequest) -> Result<QueryPage, TransportError> {
        debug!(
            db = %query.db_name,
            coll = %query.coll_name,
            query = %query.query,
            continuation = ?query.continuation_token,
            "query documents"
        );
        let mut state = self.state.borrow_mut();
        let documents = collection_mut(&mut state.databases, &query.db_name, &query.coll_name)?;

        if !query.cross_partition {
            let mut partitions = documents.iter().map(|stored| &stored.partition_key);
            if let Some(first) = partitions.next() {
                if partitions.any(|pk| pk != first) {
                    return Err(TransportError::new(
                        400,
                        "Cross partition query is required but disabled.",
                    ));
                }
            }
        }

        let offset = match query.continuation_token.as_deref() {
            None | Some("") => 0,
            Some(token) => token.parse::<usize>().map_err(|_| {
                TransportError::new(400, format!("Invalid continuation token: {token}"))
            })?,
        };
        let end = documents.len().min(offset.saturating_add(self.page_size));
        let page = documents
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .map(|stored| stored.document.clone())
            .collect();
        Ok(QueryPage {
            documents: page,
            continuation_token: (end < documents.len()).then(|| end.to_string()),
        })
    }
}
