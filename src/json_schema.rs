//! JSON Schema generation for the YAML schema file and the `--json` output.
//!
//! Schemas are generated with schemars and exported via the `schema` subcommand.

use schemars::{schema_for, Schema};
use std::collections::BTreeMap;

/// All exported schemas, keyed by name.
/// Uses BTreeMap for deterministic ordering (important for diffable output).
pub fn all_schemas() -> BTreeMap<&'static str, Schema> {
    let mut schemas = BTreeMap::new();

    // input file for `relgen generate`
    schemas.insert("config", schema_for!(crate::config::SchemaFile));

    // `--json` output of generate/demo
    schemas.insert("stats", schema_for!(crate::writer::GenerateStats));

    schemas
}

/// Generate a single schema by name.
pub fn get_schema(name: &str) -> Option<Schema> {
    all_schemas().remove(name)
}

/// List all available schema names.
pub fn schema_names() -> Vec<&'static str> {
    all_schemas().keys().copied().collect()
}
