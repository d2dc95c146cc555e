//! # Checkpoint Service
//!
//! `create` -> `validate` -> `restore`, plus `open_read_only` for serving an
//! archive directly without restoring it.

use crate::domain::archive;
use crate::domain::config::CheckpointConfig;
use crate::domain::errors::CheckpointError;
use crate::domain::manifest::{CheckpointManifest, MANIFEST_FILE_NAME};
use shared_types::ScriptHash;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::{Builder, TempDir};
use tracing::{info, warn};
use xc_01_kv_store::{CheckpointStore, Family, SnapshotView, Store, StoreError, StoreKind};

/// A checkpoint whose manifest matched the expected network.
#[derive(Debug, Clone)]
pub struct ValidatedCheckpoint {
    path: PathBuf,
    manifest: CheckpointManifest,
}

impl ValidatedCheckpoint {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn manifest(&self) -> &CheckpointManifest {
        &self.manifest
    }
}

/// Read-only store over an extracted archive; the extraction directory is
/// deleted when this is dropped.
pub struct ExtractedCheckpoint {
    store: CheckpointStore,
    manifest: CheckpointManifest,
    _extracted: TempDir,
}

impl ExtractedCheckpoint {
    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    pub fn manifest(&self) -> &CheckpointManifest {
        &self.manifest
    }
}

impl Store for ExtractedCheckpoint {
    fn kind(&self) -> StoreKind {
        self.store.kind()
    }

    fn path(&self) -> &Path {
        self.store.path()
    }

    fn get(&self, family: Family, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        self.store.get(family, key)
    }

    fn snapshot(&self) -> Box<dyn SnapshotView + '_> {
        self.store.snapshot()
    }

    fn put_general(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.store.put_general(key, value)
    }

    fn put_general_sync(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.store.put_general_sync(key, value)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CheckpointManager {
    config: CheckpointConfig,
}

impl CheckpointManager {
    pub fn new(config: CheckpointConfig) -> Self {
        Self { config }
    }

    /// Archive `store` into `destination`, recording `magic` and `account`.
    pub fn create(
        &self,
        store: &dyn Store,
        destination: &Path,
        magic: u32,
        account: &ScriptHash,
    ) -> Result<PathBuf, CheckpointError> {
        if destination.exists() {
            return Err(CheckpointError::CheckpointExists(destination.to_path_buf()));
        }

        fs::create_dir_all(&self.config.scratch_root)?;
        let scratch = Builder::new()
            .prefix("express-checkpoint")
            .tempdir_in(&self.config.scratch_root)?;
        // RocksDB checkpoints into a directory that does not exist yet.
        let data = scratch.path().join("data");
        store.checkpoint(&data)?;
        CheckpointManifest::new(magic, *account).write_to(&data)?;

        let out = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(destination)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => {
                    CheckpointError::CheckpointExists(destination.to_path_buf())
                }
                _ => CheckpointError::Io(e),
            })?;

        if let Err(e) = archive::pack(&data, out, self.config.compression_level) {
            if let Err(cleanup) = fs::remove_file(destination) {
                warn!(error = %cleanup, "[xc-02] Failed to remove partial archive");
            }
            return Err(CheckpointError::Archive(e.to_string()));
        }
        if let Err(e) = scratch.close() {
            warn!(error = %e, "[xc-02] Failed to remove scratch directory");
        }

        info!(
            destination = %destination.display(),
            magic,
            account = %account.to_address(),
            "[xc-02] Created checkpoint"
        );
        Ok(destination.to_path_buf())
    }

    /// Check the manifest of an archive or extracted directory.
    pub fn validate(
        &self,
        path: &Path,
        magic: u32,
        account: &ScriptHash,
    ) -> Result<ValidatedCheckpoint, CheckpointError> {
        let manifest = if path.is_dir() {
            CheckpointManifest::read_from(path)?
        } else if path.is_file() {
            let text = archive::read_entry(path, MANIFEST_FILE_NAME)
                .map_err(|e| CheckpointError::InvalidCheckpoint(format!("unreadable archive: {}", e)))?
                .ok_or_else(|| {
                    CheckpointError::InvalidCheckpoint(format!(
                        "{} has no {} entry",
                        path.display(),
                        MANIFEST_FILE_NAME
                    ))
                })?;
            CheckpointManifest::parse(&text)?
        } else {
            return Err(CheckpointError::InvalidCheckpoint(format!(
                "{} does not exist",
                path.display()
            )));
        };

        manifest.check(magic, account)?;
        info!(path = %path.display(), magic, "[xc-02] Checkpoint validated");
        Ok(ValidatedCheckpoint {
            path: path.to_path_buf(),
            manifest,
        })
    }

    /// Move the checkpoint's data into `target`. An existing target is only
    /// replaced with `force`; on any failure it is left as it was.
    pub fn restore(
        &self,
        checkpoint: &ValidatedCheckpoint,
        target: &Path,
        force: bool,
    ) -> Result<(), CheckpointError> {
        if target.exists() && !force {
            return Err(CheckpointError::TargetExists(target.to_path_buf()));
        }

        let parent = target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let staging = Builder::new().prefix(".express-restore").tempdir_in(parent)?;
        if checkpoint.path.is_dir() {
            archive::copy_dir(&checkpoint.path, staging.path())?;
        } else {
            archive::unpack(&checkpoint.path, staging.path())
                .map_err(|e| CheckpointError::Archive(e.to_string()))?;
        }
        CheckpointManifest::read_from(staging.path())?
            .check(checkpoint.manifest.magic, &checkpoint.manifest.account)?;

        // Previous target moves aside and is deleted only after the swap.
        let displaced = Builder::new().prefix(".express-displaced").tempdir_in(parent)?;
        let previous = displaced.path().join("previous");
        let had_target = target.exists();
        if had_target {
            fs::rename(target, &previous)?;
        }
        if let Err(e) = fs::rename(staging.path(), target) {
            if had_target {
                fs::rename(&previous, target)?;
            }
            return Err(e.into());
        }
        // Staging now lives at `target`.
        let _ = staging.keep();
        if let Err(e) = displaced.close() {
            warn!(error = %e, "[xc-02] Failed to remove displaced chain directory");
        }

        info!(
            checkpoint = %checkpoint.path.display(),
            target = %target.display(),
            "[xc-02] Checkpoint restored"
        );
        Ok(())
    }

    /// Extract, validate and open an archive as a read-only store.
    pub fn open_read_only(
        &self,
        path: &Path,
        magic: u32,
        account: &ScriptHash,
    ) -> Result<ExtractedCheckpoint, CheckpointError> {
        let validated = self.validate(path, magic, account)?;
        fs::create_dir_all(&self.config.scratch_root)?;
        let extracted = Builder::new()
            .prefix("express-run")
            .tempdir_in(&self.config.scratch_root)?;
        if path.is_dir() {
            archive::copy_dir(path, extracted.path())?;
        } else {
            archive::unpack(path, extracted.path())
                .map_err(|e| CheckpointError::Archive(e.to_string()))?;
        }
        let store = CheckpointStore::open(extracted.path())?;
        Ok(ExtractedCheckpoint {
            store,
            manifest: validated.manifest,
            _extracted: extracted,
        })
    }
}
