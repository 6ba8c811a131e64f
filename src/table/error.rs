use crate::types::column_kind::ColumnKind;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Input file '{0}' does not exist")]
    InputMissing(PathBuf),

    // Unreadable file, bad encoding or a row with more fields than the header
    #[error("Failed to read delimited file '{path}'")]
    CsvRead {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("I/O error writing '{0}'")]
    WriteIo(PathBuf, #[source] std::io::Error),

    #[error("Encoding error writing delimited file '{path}'")]
    CsvWrite {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("Required column '{0}' not found in table")]
    MissingColumn(String),

    #[error("Column '{column}' must be numeric but is {kind}")]
    NonNumericColumn { column: String, kind: ColumnKind },

    #[error("Pivot on '{pivot_column}' found {duplicates} rows sharing an entity and pivot value")]
    DuplicatePivotEntry {
        pivot_column: String,
        duplicates: usize,
    },

    #[error("Failed processing table: {0}")]
    Polars(#[from] PolarsError),
}
