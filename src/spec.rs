//! Declarative table specifications.

use crate::column::ColumnGenerator;
use crate::error::{GenError, Result};
use ahash::AHashSet;
use std::fmt;
use std::sync::Arc;

/// A table to generate: its name, target row count and ordered columns.
///
/// Specifications are immutable once built. The name is used as the output
/// file stem; it is not an identity, the [`crate::TableHandle`] returned when
/// the spec is registered with a session is.
pub struct TableSpec {
    name: String,
    num_rows: u64,
    columns: Arc<[String]>,
    generators: Vec<Box<dyn ColumnGenerator>>,
}

impl TableSpec {
    /// Start building a specification
    pub fn builder(name: impl Into<String>, num_rows: u64) -> TableSpecBuilder {
        TableSpecBuilder {
            name: name.into(),
            num_rows,
            columns: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configured row count, before the session scale factor is applied
    pub fn num_rows(&self) -> u64 {
        self.num_rows
    }

    /// Column names in declared order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub(crate) fn parts_mut(
        &mut self,
    ) -> (&str, &Arc<[String]>, &mut Vec<Box<dyn ColumnGenerator>>) {
        (&self.name, &self.columns, &mut self.generators)
    }
}

impl fmt::Debug for TableSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableSpec")
            .field("name", &self.name)
            .field("num_rows", &self.num_rows)
            .field("columns", &self.columns)
            .finish()
    }
}

/// Builder for [`TableSpec`].
pub struct TableSpecBuilder {
    name: String,
    num_rows: u64,
    columns: Vec<(String, Box<dyn ColumnGenerator>)>,
}

impl TableSpecBuilder {
    /// Append a column; columns are evaluated in the order they are added
    pub fn column<G>(mut self, name: impl Into<String>, generator: G) -> Self
    where
        G: ColumnGenerator + 'static,
    {
        self.columns.push((name.into(), Box::new(generator)));
        self
    }

    /// Append a column whose generator is already boxed
    pub fn boxed_column(
        mut self,
        name: impl Into<String>,
        generator: Box<dyn ColumnGenerator>,
    ) -> Self {
        self.columns.push((name.into(), generator));
        self
    }

    /// Validate names and produce the specification
    pub fn build(self) -> Result<TableSpec> {
        if self.name.trim().is_empty() {
            return Err(GenError::EmptyTableName);
        }

        {
            let mut seen = AHashSet::with_capacity(self.columns.len());
            for (column, _) in &self.columns {
                if column.is_empty() {
                    return Err(GenError::EmptyColumnName(self.name.clone()));
                }
                if !seen.insert(column.as_str()) {
                    return Err(GenError::DuplicateColumn {
                        table: self.name.clone(),
                        column: column.clone(),
                    });
                }
            }
        }

        let (columns, generators): (Vec<String>, Vec<_>) = self.columns.into_iter().unzip();
        Ok(TableSpec {
            name: self.name,
            num_rows: self.num_rows,
            columns: columns.into(),
            generators,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column;
    use crate::value::Value;

    #[test]
    fn test_build_preserves_column_order() {
        let spec = TableSpec::builder("orders", 10)
            .column("ID", column::constant("x"))
            .column("Quantity", column::simple(|| Value::Int(1)))
            .column("Date", column::constant("2024-01-01"))
            .build()
            .unwrap();

        assert_eq!(spec.name(), "orders");
        assert_eq!(spec.num_rows(), 10);
        assert_eq!(spec.columns(), &["ID", "Quantity", "Date"]);
        assert_eq!(spec.column_position("Date"), Some(2));
        assert_eq!(spec.column_position("Nope"), None);
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = TableSpec::builder("t", 1)
            .column("A", column::constant("1"))
            .column("A", column::constant("2"))
            .build()
            .unwrap_err();
        assert!(matches!(err, GenError::DuplicateColumn { .. }));
    }

    #[test]
    fn test_empty_names_rejected() {
        assert!(matches!(
            TableSpec::builder("  ", 1).build(),
            Err(GenError::EmptyTableName)
        ));
        assert!(matches!(
            TableSpec::builder("t", 1)
                .column("", column::constant("1"))
                .build(),
            Err(GenError::EmptyColumnName(_))
        ));
    }
}
