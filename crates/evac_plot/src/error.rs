use std::{io, path::PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlotError>;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown dataset index: {0} (embedded datasets are 1 and 2)")]
    UnknownDataset(u8),

    #[error("Unknown scheduling method: {0}")]
    UnknownMethod(String),

    #[error("Series {method} has {got} values, expected {expected} (one per demand level)")]
    LengthMismatch {
        method: String,
        expected: usize,
        got: usize,
    },

    #[error("Series out of order at position {position}: expected {expected}, got {got}")]
    MethodOrder {
        position: usize,
        expected: String,
        got: String,
    },

    #[error("Invalid CSV header: {0}")]
    CsvHeader(String),

    #[error("Invalid value at row {row}, column {column}: {value}")]
    ValueParse {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Dataset is empty")]
    EmptyDataset,

    #[error("Failed to create file {path}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to open viewer for {path}: {message}")]
    Viewer { path: PathBuf, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
