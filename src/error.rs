use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EdfError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Malformed {field} field: {value:?}")]
    MalformedField {
        field: &'static str,
        value: String,
    },

    #[error("Truncated data: expected {expected} bytes, only {available} available")]
    TruncatedData {
        expected: u64,
        available: u64,
    },

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV output error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, EdfError>;
