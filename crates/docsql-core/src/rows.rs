//! Result cursor of a SELECT.

use serde_json::Value;

use crate::document::DocInfo;

/// A forward-only cursor over the documents fetched by a query.
///
/// The column list is taken from the keys of the first document, sorted.
/// Documents of a different shape are projected onto that list: extra
/// fields are dropped and missing fields read as `null`.
#[derive(Debug, Clone, Default)]
pub struct Rows {
    documents: Vec<DocInfo>,
    columns: Vec<String>,
    cursor: usize,
}

impl Rows {
    /// Creates a cursor over fetched documents.
    #[must_use]
    pub fn new(documents: Vec<DocInfo>) -> Self {
        let mut columns: Vec<String> = documents
            .first()
            .map(|doc| doc.keys().cloned().collect())
            .unwrap_or_default();
        columns.sort();
        Self {
            documents,
            columns,
            cursor: 0,
        }
    }

    /// Column names in row order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The fetched documents.
    #[must_use]
    pub fn documents(&self) -> &[DocInfo] {
        &self.documents
    }

    /// Number of fetched documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if the query matched nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Releases the cursor.
    pub fn close(self) {}
}

impl Iterator for Rows {
    type Item = Vec<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        let doc = self.documents.get(self.cursor)?;
        self.cursor += 1;
        Some(
            self.columns
                .iter()
                .map(|column| doc.get(column).cloned().unwrap_or(Value::Null))
                .collect(),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.documents.len() - self.cursor;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Rows {}
