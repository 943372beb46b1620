//! CSV output.
//!
//! Each table goes to its own `<name>.csv` file. The header is written
//! first, then rows are formatted and appended in fixed-size batches so the
//! formatting buffer stays bounded no matter how large the table is.

use crate::error::{GenError, Result};
use crate::row::Row;
use crate::session::{Session, TableHandle};
use flate2::write::GzEncoder;
use indicatif::{ProgressBar, ProgressStyle};
use schemars::JsonSchema;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;

pub const WRITER_BUFFER_SIZE: usize = 256 * 1024;
pub const DEFAULT_BATCH_SIZE: usize = 100_000;

/// Output compression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    None,
    Gzip,
}

impl Compression {
    /// File extension for a table written with this compression
    pub fn extension(&self) -> &'static str {
        match self {
            Compression::None => "csv",
            Compression::Gzip => "csv.gz",
        }
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Compression::None => write!(f, "none"),
            Compression::Gzip => write!(f, "gzip"),
        }
    }
}

/// Settings for writing a set of tables
#[derive(Debug, Clone)]
pub struct WriterConfig {
    pub output_dir: PathBuf,
    /// Rows formatted per write
    pub batch_size: usize,
    pub compression: Compression,
    /// Show a progress bar per table
    pub progress: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            batch_size: DEFAULT_BATCH_SIZE,
            compression: Compression::None,
            progress: false,
        }
    }
}

impl WriterConfig {
    /// Path of the file a table is written to
    pub fn table_path(&self, table_name: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", table_name, self.compression.extension()))
    }
}

/// Statistics for one written table
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct TableWriteStats {
    pub table: String,
    pub path: PathBuf,
    pub rows: u64,
    pub batches: u64,
    /// Size of the file on disk
    pub bytes: u64,
    /// Milliseconds spent generating and writing
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    #[schemars(with = "u64")]
    pub duration: Duration,
}

/// Statistics for a whole run
#[derive(Debug, Clone, Default, Serialize, JsonSchema)]
pub struct GenerateStats {
    pub tables: Vec<TableWriteStats>,
    pub total_rows: u64,
    pub total_bytes: u64,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    #[schemars(with = "u64")]
    pub elapsed: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

enum Sink {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Sink::Plain(w) => w.write(buf),
            Sink::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Sink::Plain(w) => w.flush(),
            Sink::Gzip(w) => w.flush(),
        }
    }
}

/// Writes one table's CSV file.
pub struct TableWriter {
    sink: Sink,
    path: PathBuf,
    rows_written: u64,
    batches_written: u64,
}

impl TableWriter {
    /// Create (or truncate) the output file
    pub fn create(path: &Path, compression: Compression) -> Result<Self> {
        let file = File::create(path)?;
        let writer = BufWriter::with_capacity(WRITER_BUFFER_SIZE, file);
        let sink = match compression {
            Compression::None => Sink::Plain(writer),
            Compression::Gzip => {
                Sink::Gzip(GzEncoder::new(writer, flate2::Compression::default()))
            }
        };

        Ok(Self {
            sink,
            path: path.to_path_buf(),
            rows_written: 0,
            batches_written: 0,
        })
    }

    pub fn write_header(&mut self, columns: &[String]) -> Result<()> {
        let buf = format_records(std::iter::once(columns.iter().map(String::as_str)))?;
        self.sink.write_all(&buf)?;
        self.sink.flush()?;
        Ok(())
    }

    /// Format a batch of rows and append it to the file
    pub fn write_batch(&mut self, rows: &[Row]) -> Result<()> {
        let buf = format_records(
            rows.iter()
                .map(|row| row.values().iter().map(|v| v.to_string())),
        )?;
        self.sink.write_all(&buf)?;
        self.sink.flush()?;

        self.rows_written += rows.len() as u64;
        self.batches_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    pub fn batches_written(&self) -> u64 {
        self.batches_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush everything, finishing the gzip stream if there is one
    pub fn finish(self) -> Result<()> {
        match self.sink {
            Sink::Plain(mut w) => w.flush()?,
            Sink::Gzip(encoder) => encoder.finish()?.flush()?,
        }
        Ok(())
    }
}

/// Encode records with standard CSV quoting
fn format_records<I, R, F>(records: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = F>,
    F: AsRef<[u8]>,
{
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for record in records {
        writer.write_record(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| GenError::Io(e.into_error()))
}

/// Generate (if needed) and write one table
pub fn write_table(
    session: &mut Session,
    table: TableHandle,
    config: &WriterConfig,
) -> Result<TableWriteStats> {
    if config.batch_size == 0 {
        return Err(GenError::InvalidBatchSize);
    }

    let start = Instant::now();
    let name = session.name(table)?.to_string();
    let columns = session.columns(table)?.to_vec();
    let path = config.table_path(&name);

    let mut writer = TableWriter::create(&path, config.compression)?;
    writer.write_header(&columns)?;

    let rows = session.rows_of(table)?;

    let pb = if config.progress {
        let pb = ProgressBar::new(rows.len() as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} {msg:<12} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} rows",
            )
            .unwrap()
            .progress_chars("#>-"),
        );
        pb.set_message(name.clone());
        Some(pb)
    } else {
        None
    };

    for batch in rows.chunks(config.batch_size) {
        writer.write_batch(batch)?;
        if let Some(ref pb) = pb {
            pb.inc(batch.len() as u64);
        }
    }

    if let Some(pb) = pb {
        pb.finish();
    }

    let rows_written = writer.rows_written();
    let batches = writer.batches_written();
    writer.finish()?;

    let bytes = fs::metadata(&path)?.len();
    let duration = start.elapsed();
    info!(
        table = %name,
        path = %path.display(),
        rows = rows_written,
        bytes,
        "wrote table"
    );

    Ok(TableWriteStats {
        table: name,
        path,
        rows: rows_written,
        batches,
        bytes,
        duration,
    })
}

/// Write each table in order, creating the output directory if needed
pub fn write_tables(
    session: &mut Session,
    tables: &[TableHandle],
    config: &WriterConfig,
) -> Result<GenerateStats> {
    let start = Instant::now();
    fs::create_dir_all(&config.output_dir)?;

    let mut stats = GenerateStats::default();
    for &table in tables {
        let table_stats = write_table(session, table, config)?;
        stats.total_rows += table_stats.rows;
        stats.total_bytes += table_stats.bytes;
        stats.tables.push(table_stats);
    }
    stats.elapsed = start.elapsed();
    Ok(stats)
}
