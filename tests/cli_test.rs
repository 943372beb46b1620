//! Integration tests for the relgen binary.

use std::io::Write;
use std::process::Command;
use tempfile::{NamedTempFile, TempDir};

fn relgen_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_relgen"))
}

fn create_temp_schema(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const SCHEMA: &str = r#"
tables:
  - name: teams
    rows: 4
    columns:
      - name: ID
        sequence: 1
      - name: Name
        fake: company_name
  - name: players
    rows: 30
    columns:
      - name: Name
        fake: name
      - name: TeamID
        ref: teams.ID
"#;

#[test]
fn test_generate_json_output() {
    let schema = create_temp_schema(SCHEMA);
    let output_dir = TempDir::new().unwrap();

    let output = relgen_bin()
        .arg("generate")
        .arg(schema.path())
        .arg("--output")
        .arg(output_dir.path())
        .arg("--json")
        .output()
        .expect("Failed to execute command");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total_rows"], 34);
    assert_eq!(json["tables"][0]["table"], "teams");
    assert_eq!(json["tables"][1]["rows"], 30);
    assert!(json["elapsed_ms"].is_u64());

    assert!(output_dir.path().join("teams.csv").exists());
    assert!(output_dir.path().join("players.csv").exists());
}

#[test]
fn test_generate_table_filter_and_scale() {
    let schema = create_temp_schema(SCHEMA);
    let output_dir = TempDir::new().unwrap();

    let output = relgen_bin()
        .arg("generate")
        .arg(schema.path())
        .args(["--tables", "players", "--scale", "0.5", "--json"])
        .arg("--output")
        .arg(output_dir.path())
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total_rows"], 15);
    assert_eq!(json["tables"].as_array().unwrap().len(), 1);

    // teams is generated as a dependency but not written
    assert!(!output_dir.path().join("teams.csv").exists());
}

#[test]
fn test_generate_unknown_table_fails() {
    let schema = create_temp_schema(SCHEMA);
    let output_dir = TempDir::new().unwrap();

    let output = relgen_bin()
        .arg("generate")
        .arg(schema.path())
        .args(["--tables", "coaches"])
        .arg("--output")
        .arg(output_dir.path())
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown table: coaches"));
}

#[test]
fn test_demo_dry_run_writes_nothing() {
    let output_dir = TempDir::new().unwrap();

    let output = relgen_bin()
        .arg("demo")
        .args(["--scale", "0.001", "--dry-run"])
        .arg("--output")
        .arg(output_dir.path())
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("orders"));
    assert!(stderr.contains("10000 rows"));
    assert!(!output_dir.path().join("orders.csv").exists());
}

#[test]
fn test_generators_lists_catalog() {
    let output = relgen_bin()
        .arg("generators")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("alpha_id"));
    assert!(stdout.contains("job_title"));
}

#[test]
fn test_schema_command_prints_config_schema() {
    let output = relgen_bin()
        .args(["schema", "config"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(json["properties"]["tables"].is_object());
}
