//! Generation session: the table cache, the column value index and the
//! cross-table sampler.
//!
//! A [`Session`] owns every registered table specification and everything
//! derived from it. Tables are generated on demand: the first request for a
//! table's rows runs the row materializer `floor(num_rows * scale)` times and
//! caches the result for the lifetime of the session. Columns that reference
//! another table pull that table's rows first, so generation order follows the
//! dependency graph without any explicit planning.

use crate::error::{GenError, Result};
use crate::row::{self, Row};
use crate::spec::TableSpec;
use crate::value::Value;
use ahash::{AHashMap, AHashSet};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::hash_map::Entry;
use std::time::Instant;
use tracing::debug;

/// Identity of a table registered with a [`Session`].
///
/// Handles are only valid for the session that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableHandle(usize);

/// Session-wide settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Multiplier applied to every table's configured row count
    pub scale: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

/// Generated rows plus the lazily built per-column distinct-value index
struct Materialized {
    spec: TableSpec,
    rows: Vec<Row>,
    index: AHashMap<String, Vec<Value>>,
}

impl Materialized {
    fn distinct_values(&mut self, column: &str) -> Result<&[Value]> {
        match self.index.entry(column.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut().as_slice()),
            Entry::Vacant(entry) => {
                let position = self.spec.column_position(column).ok_or_else(|| {
                    GenError::UnknownColumn {
                        table: self.spec.name().to_string(),
                        column: column.to_string(),
                    }
                })?;

                let distinct: AHashSet<&Value> =
                    self.rows.iter().map(|r| &r.values()[position]).collect();
                let values: Vec<Value> = distinct.into_iter().cloned().collect();

                debug!(
                    table = self.spec.name(),
                    column,
                    distinct = values.len(),
                    "built column index"
                );
                Ok(entry.insert(values).as_slice())
            }
        }
    }
}

enum TableState {
    /// Handle issued, specification not supplied yet
    Reserved,
    Pending(TableSpec),
    /// Rows are being generated; the spec is checked out by the generator
    Generating,
    Ready(Materialized),
}

struct TableSlot {
    name: String,
    state: TableState,
}

/// Owns table specifications and all generated state.
pub struct Session {
    scale: f64,
    tables: Vec<TableSlot>,
    /// Tables currently being generated, outermost first
    in_progress: Vec<TableHandle>,
    rng: StdRng,
}

impl Session {
    /// Create a session seeded from the operating system
    pub fn new(config: SessionConfig) -> Result<Self> {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Create a session with an explicit random source
    pub fn with_rng(config: SessionConfig, rng: StdRng) -> Result<Self> {
        if !config.scale.is_finite() || config.scale < 0.0 {
            return Err(GenError::InvalidScale(config.scale));
        }
        Ok(Self {
            scale: config.scale,
            tables: Vec::new(),
            in_progress: Vec::new(),
            rng,
        })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Random source shared by the samplers of this session
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Register a specification and return its handle
    pub fn add(&mut self, spec: TableSpec) -> TableHandle {
        let handle = TableHandle(self.tables.len());
        self.tables.push(TableSlot {
            name: spec.name().to_string(),
            state: TableState::Pending(spec),
        });
        handle
    }

    /// Issue a handle before the specification exists.
    ///
    /// This lets specifications reference each other regardless of the order
    /// they are defined in. The table must be [`define`](Self::define)d before
    /// it is generated.
    pub fn reserve(&mut self, name: impl Into<String>) -> TableHandle {
        let handle = TableHandle(self.tables.len());
        self.tables.push(TableSlot {
            name: name.into(),
            state: TableState::Reserved,
        });
        handle
    }

    /// Supply the specification for a reserved handle
    pub fn define(&mut self, table: TableHandle, spec: TableSpec) -> Result<()> {
        let slot = self.slot_mut(table)?;
        if !matches!(slot.state, TableState::Reserved) {
            return Err(GenError::AlreadyDefined(slot.name.clone()));
        }
        slot.name = spec.name().to_string();
        slot.state = TableState::Pending(spec);
        Ok(())
    }

    /// All handles issued by this session, in registration order
    pub fn tables(&self) -> impl Iterator<Item = TableHandle> + '_ {
        (0..self.tables.len()).map(TableHandle)
    }

    pub fn name(&self, table: TableHandle) -> Result<&str> {
        Ok(&self.slot(table)?.name)
    }

    /// First table registered under `name`
    pub fn find(&self, name: &str) -> Option<TableHandle> {
        self.tables
            .iter()
            .position(|slot| slot.name == name)
            .map(TableHandle)
    }

    /// Column names of a table, in declared order
    pub fn columns(&self, table: TableHandle) -> Result<&[String]> {
        Ok(self.spec(table)?.columns())
    }

    /// Number of rows the table will have once generated
    pub fn target_rows(&self, table: TableHandle) -> Result<u64> {
        Ok(self.scaled(self.spec(table)?.num_rows()))
    }

    pub fn is_generated(&self, table: TableHandle) -> bool {
        self.tables
            .get(table.0)
            .is_some_and(|slot| matches!(slot.state, TableState::Ready(_)))
    }

    /// All rows of a table, generating them on first access.
    ///
    /// Later calls return the same cached rows.
    pub fn rows_of(&mut self, table: TableHandle) -> Result<&[Row]> {
        Ok(&self.materialized(table)?.rows)
    }

    /// Distinct values of `column` across the table's rows.
    ///
    /// Built once per column and cached. The order is unspecified.
    pub fn distinct_values_of(&mut self, table: TableHandle, column: &str) -> Result<&[Value]> {
        self.materialized(table)?.distinct_values(column)
    }

    /// One value drawn uniformly from the distinct values of `column`
    pub fn sample_from(&mut self, table: TableHandle, column: &str) -> Result<Value> {
        let len = self.distinct_values_of(table, column)?.len();
        if len == 0 {
            return Err(GenError::EmptyReference {
                table: self.slot(table)?.name.clone(),
                column: column.to_string(),
            });
        }
        let pick = self.rng.random_range(0..len);
        let values = self.distinct_values_of(table, column)?;
        Ok(values[pick].clone())
    }

    fn scaled(&self, num_rows: u64) -> u64 {
        (num_rows as f64 * self.scale).floor() as u64
    }

    fn slot(&self, table: TableHandle) -> Result<&TableSlot> {
        self.tables
            .get(table.0)
            .ok_or_else(|| GenError::UnknownTable(format!("#{}", table.0)))
    }

    fn slot_mut(&mut self, table: TableHandle) -> Result<&mut TableSlot> {
        self.tables
            .get_mut(table.0)
            .ok_or_else(|| GenError::UnknownTable(format!("#{}", table.0)))
    }

    fn spec(&self, table: TableHandle) -> Result<&TableSpec> {
        let slot = self.slot(table)?;
        match &slot.state {
            TableState::Pending(spec) => Ok(spec),
            TableState::Ready(m) => Ok(&m.spec),
            TableState::Reserved => Err(GenError::UndefinedTable(slot.name.clone())),
            TableState::Generating => Err(self.cycle_error(table)),
        }
    }

    fn materialized(&mut self, table: TableHandle) -> Result<&mut Materialized> {
        if !self.is_generated(table) {
            self.generate(table)?;
        }
        let slot = self.slot_mut(table)?;
        match &mut slot.state {
            TableState::Ready(m) => Ok(m),
            _ => Err(GenError::UndefinedTable(slot.name.clone())),
        }
    }

    fn generate(&mut self, table: TableHandle) -> Result<()> {
        let slot = self.slot_mut(table)?;
        let mut spec = match std::mem::replace(&mut slot.state, TableState::Generating) {
            TableState::Pending(spec) => spec,
            TableState::Reserved => {
                slot.state = TableState::Reserved;
                return Err(GenError::UndefinedTable(slot.name.clone()));
            }
            // Still marked as generating: we were called from inside our own generation
            TableState::Generating => return Err(self.cycle_error(table)),
            ready @ TableState::Ready(_) => {
                slot.state = ready;
                return Ok(());
            }
        };

        let target = self.scaled(spec.num_rows());
        debug!(table = spec.name(), rows = target, "generating table");
        let start = Instant::now();

        self.in_progress.push(table);
        let result = self.materialize_rows(&mut spec, target);
        self.in_progress.pop();

        let slot = &mut self.tables[table.0];
        match result {
            Ok(rows) => {
                debug!(
                    table = spec.name(),
                    rows = rows.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "generated table"
                );
                slot.state = TableState::Ready(Materialized {
                    spec,
                    rows,
                    index: AHashMap::new(),
                });
                Ok(())
            }
            Err(e) => {
                slot.state = TableState::Pending(spec);
                Err(e)
            }
        }
    }

    fn materialize_rows(&mut self, spec: &mut TableSpec, target: u64) -> Result<Vec<Row>> {
        let mut rows = Vec::with_capacity(usize::try_from(target).unwrap_or(0));
        for _ in 0..target {
            rows.push(row::materialize(spec, self)?);
        }
        Ok(rows)
    }

    fn cycle_error(&self, table: TableHandle) -> GenError {
        let start = self
            .in_progress
            .iter()
            .position(|&t| t == table)
            .unwrap_or(0);
        let chain: Vec<&str> = self.in_progress[start..]
            .iter()
            .chain(std::iter::once(&table))
            .map(|t| self.tables[t.0].name.as_str())
            .collect();
        GenError::DependencyCycle(chain.join(" -> "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{self, Reference, Sequence};

    fn session(scale: f64) -> Session {
        Session::with_rng(SessionConfig { scale }, StdRng::seed_from_u64(7)).unwrap()
    }

    fn numbered(name: &str, rows: u64) -> TableSpec {
        TableSpec::builder(name, rows)
            .column("ID", Sequence::default())
            .build()
            .unwrap()
    }

    #[test]
    fn test_row_count_is_scaled_and_floored() {
        let mut s = session(0.25);
        let t = s.add(numbered("t", 10));

        assert_eq!(s.target_rows(t).unwrap(), 2);
        assert_eq!(s.rows_of(t).unwrap().len(), 2);
    }

    #[test]
    fn test_rows_are_generated_once() {
        let mut s = session(1.0);
        let t = s.add(numbered("t", 5));
        assert!(!s.is_generated(t));

        let first = s.rows_of(t).unwrap().as_ptr();
        assert!(s.is_generated(t));
        let second = s.rows_of(t).unwrap().as_ptr();
        assert_eq!(first, second);

        // A Sequence that ran twice would have reached 10
        let last = s.rows_of(t).unwrap().last().unwrap().get("ID").cloned();
        assert_eq!(last, Some(Value::Int(5)));
    }

    #[test]
    fn test_invalid_scale_rejected() {
        for scale in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                Session::new(SessionConfig { scale }),
                Err(GenError::InvalidScale(_))
            ));
        }
    }

    #[test]
    fn test_same_name_different_identity() {
        let mut s = session(1.0);
        let a = s.add(numbered("dup", 1));
        let b = s.add(numbered("dup", 3));

        assert_ne!(a, b);
        assert_eq!(s.rows_of(a).unwrap().len(), 1);
        assert_eq!(s.rows_of(b).unwrap().len(), 3);
        assert_eq!(s.find("dup"), Some(a));
    }

    #[test]
    fn test_unknown_column_in_index() {
        let mut s = session(1.0);
        let t = s.add(numbered("t", 1));
        assert!(matches!(
            s.distinct_values_of(t, "Nope"),
            Err(GenError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_empty_reference_fails() {
        let mut s = session(1.0);
        let empty = s.add(numbered("empty", 0));
        let child = s.add(
            TableSpec::builder("child", 1)
                .column("ParentID", Reference::new(empty, "ID"))
                .build()
                .unwrap(),
        );

        assert!(matches!(
            s.rows_of(child),
            Err(GenError::EmptyReference { .. })
        ));
    }

    #[test]
    fn test_cycle_detected() {
        let mut s = session(1.0);
        let a = s.reserve("a");
        let b = s.reserve("b");
        s.define(
            a,
            TableSpec::builder("a", 2)
                .column("ID", Sequence::default())
                .column("B", Reference::new(b, "ID"))
                .build()
                .unwrap(),
        )
        .unwrap();
        s.define(
            b,
            TableSpec::builder("b", 2)
                .column("ID", Sequence::default())
                .column("A", Reference::new(a, "ID"))
                .build()
                .unwrap(),
        )
        .unwrap();

        match s.rows_of(a) {
            Err(GenError::DependencyCycle(chain)) => assert_eq!(chain, "a -> b -> a"),
            other => panic!("expected cycle, got {:?}", other.map(|r| r.len())),
        }
        assert!(!s.is_generated(a));
        assert!(!s.is_generated(b));
    }

    #[test]
    fn test_undefined_and_redefined_tables() {
        let mut s = session(1.0);
        let t = s.reserve("later");
        assert!(matches!(s.rows_of(t), Err(GenError::UndefinedTable(_))));

        s.define(t, numbered("later", 1)).unwrap();
        assert!(matches!(
            s.define(t, numbered("later", 1)),
            Err(GenError::AlreadyDefined(_))
        ));
        assert_eq!(s.rows_of(t).unwrap().len(), 1);
    }

    #[test]
    fn test_failed_generation_caches_nothing() {
        let mut s = session(1.0);
        let mut calls = 0;
        let t = s.add(
            TableSpec::builder("flaky", 3)
                .column(
                    "V",
                    column::from_fn(move |row| {
                        calls += 1;
                        if calls == 2 {
                            Err(GenError::Generator {
                                table: row.table().to_string(),
                                column: row.current_column().to_string(),
                                message: "boom".to_string(),
                            })
                        } else {
                            Ok(Value::Int(calls))
                        }
                    }),
                )
                .build()
                .unwrap(),
        );

        assert!(matches!(s.rows_of(t), Err(GenError::Generator { .. })));
        assert!(!s.is_generated(t));

        // The spec is back in place and a retry produces a full table
        assert_eq!(s.rows_of(t).unwrap().len(), 3);
    }
}
