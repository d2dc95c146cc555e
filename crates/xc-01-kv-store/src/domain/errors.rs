//! # Domain Errors
//!
//! Error types for the key-value store subsystem.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Read-only open of a directory that does not exist.
    #[error("Store not found at {path}")]
    NotFound { path: PathBuf },

    /// Operation requires a writable, checkpoint-capable store.
    #[error("Store is read-only")]
    ReadOnly,

    /// Partition name not part of the layout.
    #[error("Unknown column family: {0}")]
    UnknownFamily(String),

    /// Underlying engine failure.
    #[error("Storage I/O error: {0}")]
    Io(String),
}

impl From<rocksdb::Error> for StoreError {
    fn from(e: rocksdb::Error) -> Self {
        StoreError::Io(e.into_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}
