//! Crate-wide error type

use thiserror::Error;

/// Errors surfaced by the ingestion engine
#[derive(Debug, Error)]
pub enum Error {
    /// Value outside its valid domain (price, quantity, timestamp)
    #[error("value out of range: {0}")]
    InvalidRange(String),
    /// Unrecognized enum literal (e.g. side)
    #[error("invalid literal: {0}")]
    InvalidEnum(String),
    /// Malformed JSON or unparseable field
    #[error("parse error: {0}")]
    Parse(String),
    /// Query against an empty book side
    #[error("empty book side: {0}")]
    Empty(&'static str),
    /// Query for a book or snapshot that does not exist
    #[error("not found: {0}")]
    NotFound(String),
    /// Underlying storage I/O failed
    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Storage(e.to_string())
    }
}

impl From<arrow::error::ArrowError> for Error {
    fn from(e: arrow::error::ArrowError) -> Self {
        Error::Storage(e.to_string())
    }
}

impl From<parquet::errors::ParquetError> for Error {
    fn from(e: parquet::errors::ParquetError) -> Self {
        Error::Storage(e.to_string())
    }
}

impl From<object_store::Error> for Error {
    fn from(e: object_store::Error) -> Self {
        Error::Storage(e.to_string())
    }
}
