//! INSERT and UPSERT.

use serde_json::{Map, Value};
use tracing::debug;

use super::{check_arg_count, map_status, partition_key, ExecResult};
use crate::document::DocumentSpec;
use crate::error::{Error, Result};
use crate::lexer::{tokenize, ValueToken};
use crate::transport::DocumentTransport;

/// `INSERT|UPSERT INTO <db>.<coll> (<fields>) VALUES (<values>)`.
///
/// The store adds its system attributes (`_rid`, `_etag`, `_ts`, ...) to the
/// created document; the `_rid` is reported as the insert id.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    db_name: String,
    coll_name: String,
    is_upsert: bool,
    fields: Vec<String>,
    values: Vec<ValueToken>,
    num_input: usize,
}

impl InsertStatement {
    /// Parses the field and value lists and validates them.
    pub fn parse(
        db_name: &str,
        coll_name: &str,
        is_upsert: bool,
        fields: &str,
        values: &str,
    ) -> Result<Self> {
        let fields: Vec<String> = fields
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|field| !field.is_empty())
            .map(str::to_string)
            .collect();
        let values = tokenize(values)?;
        // the partition key plus one argument per placeholder
        let num_input = 1 + values.iter().filter(|v| v.is_placeholder()).count();

        let stmt = Self {
            db_name: db_name.to_string(),
            coll_name: coll_name.to_string(),
            is_upsert,
            fields,
            values,
            num_input,
        };
        stmt.validate()?;
        Ok(stmt)
    }

    /// Checks that every field has a value.
    pub fn validate(&self) -> Result<()> {
        if self.fields.len() != self.values.len() {
            return Err(Error::Validation(format!(
                "number of field ({}) does not match number of input value ({})",
                self.fields.len(),
                self.values.len()
            )));
        }
        Ok(())
    }

    /// Database name.
    #[must_use]
    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    /// Collection name.
    #[must_use]
    pub fn coll_name(&self) -> &str {
        &self.coll_name
    }

    /// Whether an existing document may be overwritten.
    #[must_use]
    pub const fn is_upsert(&self) -> bool {
        self.is_upsert
    }

    /// Field names in statement order.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Value tokens in statement order.
    #[must_use]
    pub fn values(&self) -> &[ValueToken] {
        &self.values
    }

    /// Number of arguments required to execute.
    #[must_use]
    pub const fn num_input(&self) -> usize {
        self.num_input
    }

    /// Builds the document to create from the bound arguments.
    pub fn document_spec(&self, args: &[Value]) -> Result<DocumentSpec> {
        check_arg_count(self.num_input, args)?;
        let mut document_data = Map::new();
        for (field, value) in self.fields.iter().zip(&self.values) {
            document_data.insert(field.clone(), value.resolve(args)?);
        }
        Ok(DocumentSpec {
            db_name: self.db_name.clone(),
            coll_name: self.coll_name.clone(),
            is_upsert: self.is_upsert,
            partition_key_values: partition_key(args)?,
            document_data,
        })
    }

    /// Creates the document.
    ///
    /// The last argument is the partition key value.
    pub fn exec<T: DocumentTransport + ?Sized>(
        &self,
        transport: &T,
        args: &[Value],
    ) -> Result<ExecResult> {
        let spec = self.document_spec(args)?;
        debug!(
            db = %spec.db_name,
            coll = %spec.coll_name,
            upsert = spec.is_upsert,
            "creating document"
        );
        match transport.create_document(&spec) {
            Ok(doc) => Ok(ExecResult::applied(doc.rid().map(str::to_string))),
            Err(err) => {
                debug!(status = err.status, error = %err.message, "create failed");
                Err(map_status(err))
            }
        }
    }
}
