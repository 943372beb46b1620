//! Error type shared by the generation engine, the schema loader and the writer.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = GenError> = std::result::Result<T, E>;

/// Errors raised while defining, generating or writing tables.
///
/// Everything except [`GenError::Io`] and [`GenError::Csv`] is a programming
/// or configuration error: generation is a one-shot batch job and none of
/// these are retried.
#[derive(Debug, Error)]
pub enum GenError {
    /// A column generator failed while producing a value.
    #[error("generator for '{table}.{column}' failed: {message}")]
    Generator {
        table: String,
        column: String,
        message: String,
    },

    #[error("scale factor must be a finite, non-negative number (got {0})")]
    InvalidScale(f64),

    #[error("skip probability must be between 0 and 1 (got {0})")]
    InvalidProbability(f64),

    #[error("batch size must be greater than 0")]
    InvalidBatchSize,

    #[error("table name must not be empty")]
    EmptyTableName,

    #[error("table '{0}' has a column with an empty name")]
    EmptyColumnName(String),

    #[error("table '{table}' declares column '{column}' more than once")]
    DuplicateColumn { table: String, column: String },

    /// A column read another column of the same row that is declared after it.
    #[error("column '{requested_by}' in table '{table}' reads '{column}' before it is populated")]
    ColumnNotReady {
        table: String,
        column: String,
        requested_by: String,
    },

    #[error("table '{table}' has no column '{column}'")]
    UnknownColumn { table: String, column: String },

    #[error("unknown table '{0}'")]
    UnknownTable(String),

    #[error("table '{0}' was reserved but never defined")]
    UndefinedTable(String),

    #[error("table '{0}' is already defined")]
    AlreadyDefined(String),

    /// A table (transitively) referenced its own rows while they were being generated.
    #[error("dependency cycle detected: {0}")]
    DependencyCycle(String),

    #[error("cannot sample '{table}.{column}': the table has no rows")]
    EmptyReference { table: String, column: String },

    #[error("unknown value generator '{name}' (valid: {valid})")]
    UnknownGenerator { name: String, valid: String },

    #[error("invalid parameters for generator '{name}': {reason}")]
    InvalidGenerator { name: String, reason: String },

    #[error("invalid schema: {0}")]
    Schema(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}
