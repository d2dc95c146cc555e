//! # Checkpoint Manager (xc-02)
//!
//! Portable, self-validating archives of a node's store.
//!
//! ## Archive Layout
//!
//! ```text
//! <checkpoint>.tar.zst
//! ├── .express-checkpoint     manifest: "<magic>\n<account address>\n"
//! ├── CURRENT, MANIFEST-*, OPTIONS-*, *.sst ...   (RocksDB checkpoint)
//! ```
//!
//! ## Guarantees
//!
//! | Rule | Enforcement |
//! |------|-------------|
//! | Never overwrite a checkpoint | `create` fails with `CheckpointExists` |
//! | Scratch space is always removed | `tempfile::TempDir` guards delete on drop |
//! | No cross-network restore | `validate` compares magic and account |
//! | Restore only after validation | `restore` takes a `ValidatedCheckpoint` |
//! | Target untouched on failure | extraction happens in a sibling staging dir |

pub mod domain;
pub mod service;

pub use domain::config::CheckpointConfig;
pub use domain::errors::CheckpointError;
pub use domain::manifest::{CheckpointManifest, MANIFEST_FILE_NAME};
pub use service::{CheckpointManager, ExtractedCheckpoint, ValidatedCheckpoint};
