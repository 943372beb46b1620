//! Foreign-key style columns sampled from another table.

use super::ColumnGenerator;
use crate::error::Result;
use crate::row::RowBuilder;
use crate::session::{Session, TableHandle};
use crate::value::Value;

/// Draws each value uniformly from the distinct values of another table's column.
///
/// The referenced table is generated on first use. Values that occur many
/// times in the referenced column are sampled like any other, so the
/// distribution of references is not weighted by their original frequency.
#[derive(Debug, Clone)]
pub struct Reference {
    table: TableHandle,
    column: String,
}

impl Reference {
    pub fn new(table: TableHandle, column: impl Into<String>) -> Self {
        Self {
            table,
            column: column.into(),
        }
    }

    pub fn table(&self) -> TableHandle {
        self.table
    }

    pub fn column(&self) -> &str {
        &self.column
    }
}

impl ColumnGenerator for Reference {
    fn generate(&mut self, _row: &RowBuilder<'_>, session: &mut Session) -> Result<Value> {
        session.sample_from(self.table, &self.column)
    }
}
