//! Generate and demo command CLI handlers.

use super::OutputArgs;
use relgen::config::SchemaFile;
use relgen::writer::{self, Compression, GenerateStats, WriterConfig, DEFAULT_BATCH_SIZE};
use relgen::{demo, Session, SessionConfig, TableHandle};
use std::path::PathBuf;
use tracing::debug;

pub fn run_schema(schema: PathBuf, args: OutputArgs) -> anyhow::Result<()> {
    let file = SchemaFile::load(&schema)
        .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", schema.display(), e))?;

    let scale = args.scale.or(file.scale).unwrap_or(1.0);
    let batch_size = args
        .batch_size
        .or(file.batch_size)
        .unwrap_or(DEFAULT_BATCH_SIZE);

    let mut session = Session::new(SessionConfig { scale })?;
    let handles = file.register(&mut session)?;
    debug!(
        schema = %schema.display(),
        tables = handles.len(),
        scale,
        "registered schema"
    );

    write(&mut session, &handles, &args, batch_size)
}

pub fn run_demo(args: OutputArgs) -> anyhow::Result<()> {
    let scale = args.scale.unwrap_or(1.0);
    let batch_size = args.batch_size.unwrap_or(DEFAULT_BATCH_SIZE);

    let mut session = Session::new(SessionConfig { scale })?;
    let tables = demo::register(&mut session)?;

    write(&mut session, &tables.all(), &args, batch_size)
}

fn write(
    session: &mut Session,
    handles: &[TableHandle],
    args: &OutputArgs,
    batch_size: usize,
) -> anyhow::Result<()> {
    let selected = select_tables(session, handles, args.tables.as_deref())?;

    if args.dry_run {
        eprintln!("Dry run (scale {}):", session.scale());
        for &table in &selected {
            eprintln!(
                "  {:<24} {:>12} rows",
                session.name(table)?,
                session.target_rows(table)?
            );
        }
        return Ok(());
    }

    let config = WriterConfig {
        output_dir: args.output.clone(),
        batch_size,
        compression: if args.gzip {
            Compression::Gzip
        } else {
            Compression::None
        },
        progress: args.progress,
    };

    let stats = writer::write_tables(session, &selected, &config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print_summary(&stats);
    }
    Ok(())
}

/// Resolve a comma-separated --tables list, keeping declaration order
fn select_tables(
    session: &Session,
    handles: &[TableHandle],
    filter: Option<&str>,
) -> anyhow::Result<Vec<TableHandle>> {
    let Some(filter) = filter else {
        return Ok(handles.to_vec());
    };

    let names: Vec<&str> = filter
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    for name in &names {
        let known = handles
            .iter()
            .any(|&h| session.name(h).map(|n| n == *name).unwrap_or(false));
        if !known {
            anyhow::bail!("Unknown table: {}", name);
        }
    }

    let mut selected = Vec::new();
    for &handle in handles {
        if names.contains(&session.name(handle)?) {
            selected.push(handle);
        }
    }
    Ok(selected)
}

fn print_summary(stats: &GenerateStats) {
    eprintln!();
    eprintln!("Generate Statistics:");
    for table in &stats.tables {
        eprintln!(
            "  {:<24} {:>12} rows  {:>10}  {}",
            table.table,
            table.rows,
            format_bytes(table.bytes),
            table.path.display()
        );
    }
    eprintln!(
        "  Total: {} rows, {} in {:.2?}",
        stats.total_rows,
        format_bytes(stats.total_bytes),
        stats.elapsed
    );
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
