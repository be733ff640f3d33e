use std::path::PathBuf;

use thiserror::Error;

/// A column name that does not exist in the denormalized table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown column '{0}'")]
pub struct UnknownColumn(pub String);

/// Errors that abort the one-time dataset load.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A file could not be opened or read.
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The fact table or a CSV lookup sheet is malformed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The lookup workbook could not be read.
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    /// The lookup workbook path is neither a directory nor a known spreadsheet format.
    #[error("Unsupported lookup workbook {0}")]
    UnsupportedWorkbook(PathBuf),

    /// A required lookup sheet is absent from the workbook.
    #[error("Missing lookup sheet '{sheet}'")]
    MissingSheet { sheet: String },

    /// A required column (join key, label, date, measure) is absent.
    #[error("Missing column '{column}' in {table}")]
    MissingColumn { table: String, column: String },

    /// A non-empty value could not be parsed.
    #[error("Invalid value '{value}' for column '{column}' in {table} at row {row}")]
    Parse {
        table: String,
        row: usize,
        column: String,
        value: String,
    },

    /// The fact table has a header but no rows.
    #[error("Fact table {0} contains no rows")]
    Empty(PathBuf),
}

/// Errors raised while building a filter selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error(transparent)]
    UnknownColumn(#[from] UnknownColumn),

    #[error("Invalid year '{0}'")]
    InvalidYear(String),
}

/// Errors raised by aggregate computations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error(transparent)]
    UnknownColumn(#[from] UnknownColumn),
}

/// Errors raised while reading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
