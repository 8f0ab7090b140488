//! Support code for the `docsql` command-line tool.
//!
//! The tool keeps the content of a [`MemoryStore`] in a JSON file between
//! invocations, runs one statement against it and prints the outcome as
//! JSON.

use std::fs;
use std::path::Path;

use anyhow::Context;
use docsql_core::transport::MemoryStoreSnapshot;
use docsql_core::{ExecResult, MemoryStore, Rows};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Loads a store from a snapshot file. A missing file yields an empty store.
pub fn load_store(path: &Path, page_size: usize) -> anyhow::Result<MemoryStore> {
    let snapshot = if path.exists() {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str::<MemoryStoreSnapshot>(&text)
            .with_context(|| format!("invalid snapshot in {}", path.display()))?
    } else {
        debug!(path = %path.display(), "snapshot not found, starting empty");
        MemoryStoreSnapshot::default()
    };
    Ok(MemoryStore::from_snapshot(snapshot).with_page_size(page_size))
}

/// Writes the store content to a snapshot file.
pub fn save_store(path: &Path, store: &MemoryStore) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(&store.snapshot())?;
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), "snapshot saved");
    Ok(())
}

/// Decodes command-line arguments: JSON text is taken as JSON, anything
/// else as a plain string.
#[must_use]
pub fn parse_args(raw: &[String]) -> Vec<Value> {
    raw.iter()
        .map(|arg| serde_json::from_str(arg).unwrap_or_else(|_| Value::String(arg.clone())))
        .collect()
}

/// Printable outcome of an `exec` command.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ExecOutput {
    pub successful: bool,
    pub rows_affected: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insert_id: Option<String>,
}

impl From<ExecResult> for ExecOutput {
    fn from(result: ExecResult) -> Self {
        Self {
            successful: result.successful,
            rows_affected: result.rows_affected(),
            insert_id: result.insert_id,
        }
    }
}

/// Printable outcome of a `query` command.
#[derive(Debug, Serialize, PartialEq)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl From<Rows> for QueryOutput {
    fn from(rows: Rows) -> Self {
        let columns = rows.columns().to_vec();
        Self {
            columns,
            rows: rows.collect(),
        }
    }
}
