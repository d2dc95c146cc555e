//! Checkpoint archive settings.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct CheckpointConfig {
    /// Zstd level (1-22, default 3)
    pub compression_level: i32,
    /// Parent of scratch directories used while creating checkpoints
    pub scratch_root: PathBuf,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            compression_level: 3,
            scratch_root: std::env::temp_dir(),
        }
    }
}

impl CheckpointConfig {
    pub fn for_testing(scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            compression_level: 1,
            scratch_root: scratch_root.into(),
        }
    }
}
