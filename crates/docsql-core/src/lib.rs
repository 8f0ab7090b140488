//! # docsql-core
//!
//! SQL-flavoured statements for a schemaless, partitioned document store
//! that is only reachable through a REST API.
//!
//! This crate provides:
//! - A value lexer for `VALUES (...)` lists and `SET` assignments
//! - Placeholder binding (`:1`, `@2`, `$3`) with position checks
//! - Executors for INSERT/UPSERT, UPDATE, DELETE and SELECT
//! - Status-code mapping into a small error taxonomy
//! - A forward-only result cursor over paginated query results
//!
//! The network client itself is abstracted behind [`DocumentTransport`].
//! [`MemoryStore`] implements it in process memory.
//!
//! ## Example
//!
//! ```
//! use docsql_core::{MemoryStore, Session};
//! use serde_json::json;
//!
//! let store = MemoryStore::new();
//! store.create_collection("db1", "coll1");
//! let session = Session::new(store);
//!
//! // the last argument is always the partition key
//! session
//!     .exec(
//!         r#"INSERT INTO db1.coll1 (id, a, b) VALUES ("\"d1\"", 1, :1)"#,
//!         &[json!("x"), json!("pk1")],
//!     )
//!     .unwrap();
//! session
//!     .exec("UPDATE db1.coll1 SET a=:1 WHERE id=d1", &[json!(2), json!("pk1")])
//!     .unwrap();
//!
//! let rows = session
//!     .query("SELECT * FROM coll1 c WITH db=db1", &[])
//!     .unwrap();
//! assert_eq!(rows.len(), 1);
//! assert_eq!(rows.documents()[0].get("a"), Some(&json!(2)));
//! ```

pub mod document;
pub mod error;
pub mod lexer;
pub mod options;
pub mod rows;
pub mod session;
pub mod statement;
pub mod transport;

pub use document::{DocInfo, DocumentRef, DocumentSpec};
pub use error::{Error, Result};
pub use lexer::ValueToken;
pub use rows::Rows;
pub use session::{PreconditionPolicy, Session, SessionConfig};
pub use statement::{
    DeleteStatement, DocumentId, ExecResult, InsertStatement, SelectStatement, Statement,
    UpdateStatement,
};
pub use transport::{
    DocumentTransport, MemoryStore, QueryPage, QueryParam, QueryRequest, TransportError,
};
