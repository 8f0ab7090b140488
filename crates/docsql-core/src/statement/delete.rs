//! DELETE by id.

use serde_json::Value;
use tracing::{debug, info};

use super::{check_arg_count, map_status, partition_key, DocumentId, ExecResult};
use crate::document::DocumentRef;
use crate::error::{Error, Result};
use crate::transport::DocumentTransport;

/// `DELETE FROM <db>.<coll> WHERE id=<id>`.
///
/// Removes a single document. Deleting a document that does not exist is
/// not an error (the result reports no affected row); a missing database
/// or collection is.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    db_name: String,
    coll_name: String,
    id: DocumentId,
    num_input: usize,
}

impl DeleteStatement {
    /// Parses the id literal and validates the statement.
    pub fn parse(db_name: &str, coll_name: &str, id: &str) -> Result<Self> {
        let id = DocumentId::parse(id)?;
        let num_input = 1 + usize::from(id.is_placeholder());
        let stmt = Self {
            db_name: db_name.to_string(),
            coll_name: coll_name.to_string(),
            id,
            num_input,
        };
        stmt.validate()?;
        Ok(stmt)
    }

    /// Checks that an id was given.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(Error::Validation("id value is missing".to_string()));
        }
        Ok(())
    }

    /// The target document id.
    #[must_use]
    pub const fn id(&self) -> &DocumentId {
        &self.id
    }

    /// Number of arguments required to execute.
    #[must_use]
    pub const fn num_input(&self) -> usize {
        self.num_input
    }

    /// Deletes the document.
    ///
    /// The last argument is the partition key value.
    pub fn exec<T: DocumentTransport + ?Sized>(
        &self,
        transport: &T,
        args: &[Value],
    ) -> Result<ExecResult> {
        check_arg_count(self.num_input, args)?;
        let doc = DocumentRef {
            db_name: self.db_name.clone(),
            coll_name: self.coll_name.clone(),
            doc_id: self.id.resolve(args)?,
            partition_key_values: partition_key(args)?,
        };
        debug!(db = %doc.db_name, coll = %doc.coll_name, id = %doc.doc_id, "deleting document");

        match transport.delete_document(&doc) {
            Ok(()) => Ok(ExecResult::applied(None)),
            Err(err) if err.is_document_not_found() => {
                info!(id = %doc.doc_id, "document already absent, nothing to delete");
                Ok(ExecResult::unchanged())
            }
            Err(err) => Err(map_status(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_id() {
        let stmt = DeleteStatement::parse("db", "coll", "abc").unwrap();
        assert_eq!(stmt.id(), &DocumentId::Literal("abc".to_string()));
        assert_eq!(stmt.num_input(), 1);
    }

    #[test]
    fn test_placeholder_id() {
        let stmt = DeleteStatement::parse("db", "coll", "$1").unwrap();
        assert_eq!(stmt.id(), &DocumentId::Placeholder(1));
        assert_eq!(stmt.num_input(), 2);
    }

    #[test]
    fn test_empty_id() {
        let err = DeleteStatement::parse("db", "coll", r#""""#).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
