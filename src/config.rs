//! YAML schema files describing a set of related tables.
//!
//! ```yaml
//! scale: 0.01
//! tables:
//!   - name: companies
//!     rows: 50000
//!     columns:
//!       - name: ID
//!         fake: { kind: alpha_id, prefix: "cmp-", length: 10 }
//!       - name: Name
//!         fake: company_name
//!   - name: people
//!     rows: 200000
//!     columns:
//!       - name: Title
//!         fake: job_title
//!       - name: Salary
//!         biased: { fake: salary, key: Title, skip_probability: 0.1 }
//!       - name: CompanyID
//!         ref: companies.ID
//! ```
//!
//! References are resolved by table name within the file, in any order.

use crate::column::{self, Biased, ColumnGenerator, Reference, Sequence};
use crate::error::{GenError, Result};
use crate::fake::{FakeKind, FakeValue};
use crate::session::{Session, TableHandle};
use crate::spec::TableSpec;
use ahash::{AHashMap, AHashSet};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete schema file
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SchemaFile {
    /// Multiplier applied to every table's row count (overridden by --scale)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    /// Rows formatted per write batch (overridden by --batch-size)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
    /// Tables, written in this order
    pub tables: Vec<TableDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TableDef {
    /// Table name, also the output file stem
    pub name: String,
    /// Row count before scaling
    pub rows: u64,
    /// Columns, evaluated in this order
    pub columns: Vec<ColumnDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ColumnDef {
    pub name: String,
    #[serde(flatten)]
    pub source: ColumnSource,
}

/// Where a column's values come from
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSource {
    /// Value generator from the catalog
    Fake(FakeDef),
    /// `table.column` to sample distinct values from
    Ref(String),
    /// Fixed text
    Const(String),
    /// Incrementing integer starting at the given value (default 1)
    Sequence(Option<i64>),
    /// Wrap another source in a clustering sampler
    Biased(Box<BiasedDef>),
}

/// A catalog kind, either bare (`fake: name`) or with parameters
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum FakeDef {
    Kind(String),
    Params(FakeParams),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FakeParams {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BiasedDef {
    #[serde(flatten)]
    pub source: ColumnSource,
    /// Earlier column of the same row to cluster by
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Probability of generating a fresh value despite a non-empty pool (default 0.1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_probability: Option<f64>,
}

impl SchemaFile {
    /// Load a schema from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let schema: SchemaFile = serde_yaml_ng::from_str(content)?;
        Ok(schema)
    }

    /// Register every table with the session, in file order.
    ///
    /// All tables are reserved first so references may point forward.
    pub fn register(&self, session: &mut Session) -> Result<Vec<TableHandle>> {
        let mut by_name: AHashMap<&str, (TableHandle, &TableDef)> = AHashMap::new();
        let mut handles = Vec::with_capacity(self.tables.len());

        for table in &self.tables {
            let handle = session.reserve(table.name.as_str());
            if by_name.insert(table.name.as_str(), (handle, table)).is_some() {
                return Err(GenError::Schema(format!(
                    "table '{}' is defined more than once",
                    table.name
                )));
            }
            handles.push(handle);
        }

        for (table, &handle) in self.tables.iter().zip(&handles) {
            let mut builder = TableSpec::builder(table.name.as_str(), table.rows);
            let mut earlier: AHashSet<&str> = AHashSet::new();

            for column in &table.columns {
                let generator = build_source(&column.source, table, &earlier, &by_name)
                    .map_err(|e| with_column_context(e, table, column))?;
                builder = builder.boxed_column(column.name.as_str(), generator);
                earlier.insert(column.name.as_str());
            }

            session.define(handle, builder.build()?)?;
        }

        Ok(handles)
    }
}

fn build_source(
    source: &ColumnSource,
    table: &TableDef,
    earlier: &AHashSet<&str>,
    by_name: &AHashMap<&str, (TableHandle, &TableDef)>,
) -> Result<Box<dyn ColumnGenerator>> {
    match source {
        ColumnSource::Fake(def) => Ok(Box::new(build_fake(def)?)),
        ColumnSource::Ref(target) => {
            let (table_name, column_name) = target.split_once('.').ok_or_else(|| {
                GenError::Schema(format!(
                    "reference '{}' must have the form table.column",
                    target
                ))
            })?;
            let (handle, def) = by_name
                .get(table_name)
                .ok_or_else(|| GenError::UnknownTable(table_name.to_string()))?;
            if !def.columns.iter().any(|c| c.name == column_name) {
                return Err(GenError::UnknownColumn {
                    table: table_name.to_string(),
                    column: column_name.to_string(),
                });
            }
            Ok(Box::new(Reference::new(*handle, column_name)))
        }
        ColumnSource::Const(text) => Ok(Box::new(column::constant(text.as_str()))),
        ColumnSource::Sequence(start) => {
            Ok(Box::new(Sequence::starting_at(start.unwrap_or(1))))
        }
        ColumnSource::Biased(def) => {
            let inner = build_source(&def.source, table, earlier, by_name)?;
            let mut biased = Biased::new(inner);
            if let Some(p) = def.skip_probability {
                biased = biased.with_skip_probability(p)?;
            }
            if let Some(key) = &def.key {
                check_key_column(key, table, earlier)?;
                biased = biased.keyed_by_column(key.as_str());
            }
            Ok(Box::new(biased))
        }
    }
}

/// The key must be a column declared before the biased column
fn check_key_column(key: &str, table: &TableDef, earlier: &AHashSet<&str>) -> Result<()> {
    if earlier.contains(key) {
        return Ok(());
    }
    if table.columns.iter().any(|c| c.name == key) {
        Err(GenError::ColumnNotReady {
            table: table.name.clone(),
            column: key.to_string(),
            requested_by: String::new(),
        })
    } else {
        Err(GenError::UnknownColumn {
            table: table.name.clone(),
            column: key.to_string(),
        })
    }
}

fn build_fake(def: &FakeDef) -> Result<FakeValue> {
    let params = match def {
        FakeDef::Kind(kind) => {
            return Ok(FakeValue::new(kind.parse::<FakeKind>()?));
        }
        FakeDef::Params(params) => params,
    };

    let kind: FakeKind = params.kind.parse()?;
    let mut value = FakeValue::new(kind);
    if let Some(prefix) = &params.prefix {
        value = value.with_prefix(prefix.as_str());
    }
    if let Some(length) = params.length {
        value = value.with_length(length)?;
    }
    if params.min.is_some() || params.max.is_some() {
        let (min, max) = value.range();
        value = value.with_range(params.min.unwrap_or(min), params.max.unwrap_or(max))?;
    }
    if let Some(years) = params.years {
        value = value.with_years(years)?;
    }
    if let Some(category) = &params.category {
        value = value.with_category(category.as_str());
    }
    Ok(value)
}

fn with_column_context(error: GenError, table: &TableDef, column: &ColumnDef) -> GenError {
    match error {
        GenError::ColumnNotReady {
            table: t, column: c, ..
        } => GenError::ColumnNotReady {
            table: t,
            column: c,
            requested_by: column.name.clone(),
        },
        GenError::UnknownGenerator { .. } | GenError::InvalidGenerator { .. } => {
            GenError::Schema(format!("{}.{}: {}", table.name, column.name, error))
        }
        other => other,
    }
}
