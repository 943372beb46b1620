//! Schema command: print JSON Schemas.

use relgen::json_schema;

pub fn run(name: Option<String>) -> anyhow::Result<()> {
    match name {
        Some(name) => {
            let schema = json_schema::get_schema(&name).ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown schema: {}. Available: {}",
                    name,
                    json_schema::schema_names().join(", ")
                )
            })?;
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        None => {
            let all = json_schema::all_schemas();
            println!("{}", serde_json::to_string_pretty(&all)?);
        }
    }
    Ok(())
}
