//! UPDATE by id.

use serde_json::Value;
use tracing::{debug, info};

use super::{check_arg_count, map_status, partition_key, DocumentId, ExecResult};
use crate::document::{DocumentRef, DocumentSpec};
use crate::error::{Error, Result};
use crate::lexer::{ValueLexer, ValueToken};
use crate::session::PreconditionPolicy;
use crate::transport::{status, DocumentTransport};

/// `UPDATE <db>.<coll> SET <field>=<value>[,<field>=<value>]* WHERE id=<id>`.
///
/// Execution reads the current document, overlays the SET fields on its
/// payload and replaces it conditionally on the concurrency token read.
/// Values follow the same rules as INSERT values.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    db_name: String,
    coll_name: String,
    id: DocumentId,
    fields: Vec<String>,
    values: Vec<ValueToken>,
    num_input: usize,
}

impl UpdateStatement {
    /// Parses the SET clause and the id literal, then validates.
    pub fn parse(db_name: &str, coll_name: &str, set_clause: &str, id: &str) -> Result<Self> {
        let id = DocumentId::parse(id)?;
        let mut num_input = 1 + usize::from(id.is_placeholder());

        let mut fields = Vec::new();
        let mut values = Vec::new();
        let mut lexer = ValueLexer::new(set_clause);
        while !lexer.is_at_end() {
            fields.push(lexer.next_field()?);
            let value = lexer
                .next_value()?
                .ok_or_else(|| Error::invalid_token(set_clause.trim()))?;
            if value.is_placeholder() {
                num_input += 1;
            }
            values.push(value);
        }

        let stmt = Self {
            db_name: db_name.to_string(),
            coll_name: coll_name.to_string(),
            id,
            fields,
            values,
            num_input,
        };
        stmt.validate()?;
        Ok(stmt)
    }

    /// Checks the id and the SET clause.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(Error::Validation("id value is missing".to_string()));
        }
        if self.fields.is_empty() {
            return Err(Error::Validation("SET clause is empty".to_string()));
        }
        if self.fields.len() != self.values.len() {
            return Err(Error::Validation(format!(
                "number of field ({}) does not match number of input value ({})",
                self.fields.len(),
                self.values.len()
            )));
        }
        Ok(())
    }

    /// The target document id.
    #[must_use]
    pub const fn id(&self) -> &DocumentId {
        &self.id
    }

    /// Assigned field names in statement order.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Assigned value tokens in statement order.
    #[must_use]
    pub fn values(&self) -> &[ValueToken] {
        &self.values
    }

    /// Number of arguments required to execute.
    #[must_use]
    pub const fn num_input(&self) -> usize {
        self.num_input
    }

    /// Updates the document.
    ///
    /// The last argument is the partition key value. Every placeholder is
    /// resolved before the document is fetched. An absent document yields an
    /// unsuccessful result rather than an error; a stale concurrency token is
    /// handled according to `policy`.
    pub fn exec<T: DocumentTransport + ?Sized>(
        &self,
        transport: &T,
        policy: PreconditionPolicy,
        args: &[Value],
    ) -> Result<ExecResult> {
        check_arg_count(self.num_input, args)?;
        let doc = DocumentRef {
            db_name: self.db_name.clone(),
            coll_name: self.coll_name.clone(),
            doc_id: self.id.resolve(args)?,
            partition_key_values: partition_key(args)?,
        };
        let assignments = self
            .fields
            .iter()
            .zip(&self.values)
            .map(|(field, value)| Ok((field.clone(), value.resolve(args)?)))
            .collect::<Result<Vec<_>>>()?;

        debug!(db = %doc.db_name, coll = %doc.coll_name, id = %doc.doc_id, "fetching document");
        let current = match transport.get_document(&doc) {
            Ok(current) => current,
            Err(err) if err.is_document_not_found() => {
                info!(id = %doc.doc_id, "document absent, nothing to update");
                return Ok(ExecResult::unchanged());
            }
            Err(err) => return Err(map_status(err)),
        };

        let etag = current.etag().unwrap_or_default().to_string();
        let mut document_data = current.remove_system_attrs();
        for (field, value) in assignments {
            document_data.insert(field, value);
        }
        let spec = DocumentSpec {
            db_name: doc.db_name,
            coll_name: doc.coll_name,
            is_upsert: false,
            partition_key_values: doc.partition_key_values,
            document_data,
        };

        debug!(id = %doc.doc_id, etag = %etag, "replacing document");
        match transport.replace_document(&etag, &spec) {
            Ok(_) => Ok(ExecResult::applied(None)),
            Err(err) if err.is_document_not_found() => {
                info!(id = %doc.doc_id, "document removed before replace");
                Ok(ExecResult::unchanged())
            }
            Err(err) if err.status == status::PRECONDITION_FAILED => match policy {
                PreconditionPolicy::Suppress => {
                    info!(id = %doc.doc_id, etag = %etag, "document changed concurrently, update skipped");
                    Ok(ExecResult::unchanged())
                }
                PreconditionPolicy::Surface => Err(Error::Conflict),
            },
            Err(err) => Err(map_status(err)),
        }
    }
}
