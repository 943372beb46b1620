//! Rows and the row materializer.
//!
//! A row is built by evaluating a table's column generators in declared
//! order. Each generator sees the partially built row through a
//! [`RowBuilder`], so later columns can derive from earlier ones (a price
//! keyed by category, a salary keyed by job title). Once every column has been
//! evaluated the builder is frozen into an immutable [`Row`].

use crate::error::{GenError, Result};
use crate::session::Session;
use crate::spec::TableSpec;
use crate::value::Value;
use std::sync::Arc;

/// A fully generated, immutable row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Box<[Value]>,
}

impl Row {
    /// Look up a value by column name
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| &self.values[idx])
    }

    /// Column names in declared order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values in declared column order
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// Read-only view of the row currently being generated.
///
/// Only columns declared before the one being evaluated can be read.
#[derive(Debug)]
pub struct RowBuilder<'a> {
    table: &'a str,
    columns: &'a [String],
    values: Vec<Value>,
}

impl<'a> RowBuilder<'a> {
    pub(crate) fn new(table: &'a str, columns: &'a [String]) -> Self {
        Self {
            table,
            columns,
            values: Vec::with_capacity(columns.len()),
        }
    }

    /// Name of the table the row belongs to
    pub fn table(&self) -> &str {
        self.table
    }

    /// Name of the column currently being evaluated
    pub fn current_column(&self) -> &str {
        self.columns
            .get(self.values.len())
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Read an already populated column of this row.
    ///
    /// Reading a column declared later in the table, or one that does not
    /// exist, is a configuration error.
    pub fn get(&self, column: &str) -> Result<&Value> {
        match self.columns.iter().position(|c| c == column) {
            Some(idx) if idx < self.values.len() => Ok(&self.values[idx]),
            Some(_) => Err(GenError::ColumnNotReady {
                table: self.table.to_string(),
                column: column.to_string(),
                requested_by: self.current_column().to_string(),
            }),
            None => Err(GenError::UnknownColumn {
                table: self.table.to_string(),
                column: column.to_string(),
            }),
        }
    }

    fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    fn finish(self, columns: Arc<[String]>) -> Row {
        Row {
            columns,
            values: self.values.into_boxed_slice(),
        }
    }
}

/// Build one row of `spec`.
///
/// Columns are evaluated strictly in declared order. A failing generator
/// aborts the row and its error is returned; nothing partial escapes.
pub(crate) fn materialize(spec: &mut TableSpec, session: &mut Session) -> Result<Row> {
    let (name, columns, generators) = spec.parts_mut();
    let mut builder = RowBuilder::new(name, columns);

    for generator in generators.iter_mut() {
        let value = generator.generate(&builder, session)?;
        builder.push(value);
    }

    Ok(builder.finish(Arc::clone(columns)))
}
