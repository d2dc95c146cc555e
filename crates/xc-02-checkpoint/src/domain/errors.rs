//! # Domain Errors
//!
//! Error types for checkpoint creation, validation and restore.

use std::path::PathBuf;
use thiserror::Error;
use xc_01_kv_store::StoreError;

#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Destination archive is already present; nothing was written.
    #[error("Checkpoint {0} already exists")]
    CheckpointExists(PathBuf),

    /// Manifest missing or recorded for a different network.
    #[error("Invalid checkpoint: {0}")]
    InvalidCheckpoint(String),

    /// Restore target exists and `force` was not given.
    #[error("Restore target {0} already exists")]
    TargetExists(PathBuf),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Checkpoint I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Packing or unpacking the compressed tar stream failed.
    #[error("Archive error: {0}")]
    Archive(String),
}
