//! Filesystem abstraction for the columnar repository
//!
//! The repository only sees this seam; the bindings are a local directory
//! and any S3-compatible object store.

mod local;
mod s3;

pub use local::LocalFileStore;
pub use s3::{S3FileStore, S3Options};

use crate::error::Result;
use bytes::Bytes;

/// Blob-level filesystem contract.
///
/// Paths are `/`-separated and relative to the store's root. Listing a
/// prefix that does not exist returns an empty vector rather than an error.
pub trait FileStore: Send + Sync {
    /// Read a whole file
    fn read(&self, path: &str) -> Result<Bytes>;

    /// Write a whole file, replacing any existing content
    fn write(&self, path: &str, data: Bytes) -> Result<()>;

    /// Create a directory and all missing parents. A no-op for stores
    /// without real directories.
    fn create_dir_all(&self, path: &str) -> Result<()>;

    /// Whether a file exists at the path
    fn exists(&self, path: &str) -> Result<bool>;

    /// All file paths under a prefix, recursively
    fn list_recursive(&self, prefix: &str) -> Result<Vec<String>>;
}
