//! # Checkpoint Store
//!
//! Read-only RocksDB opened against an extracted checkpoint. The files on
//! disk are never modified: committed views and general-storage writes land
//! in an in-memory overlay that reads consult before the database.
//!
//! The overlay is copy-on-write: a view keeps the `Arc` it saw when it was
//! opened, and a commit swaps in a new buffer.

use super::{cf_handle, collect_prefix};
use crate::domain::errors::StoreError;
use crate::domain::family::Family;
use crate::domain::write_buffer::WriteBuffer;
use crate::ports::inbound::{SnapshotView, Store, StoreKind};
use parking_lot::RwLock;
use rocksdb::{Direction, IteratorMode, Options, DB};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

pub struct CheckpointStore {
    db: DB,
    path: PathBuf,
    overlay: RwLock<Arc<WriteBuffer>>,
}

impl CheckpointStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if !path.is_dir() {
            return Err(StoreError::NotFound { path });
        }
        let db = DB::open_cf_for_read_only(&Options::default(), &path, Family::names(), false)?;
        info!(path = %path.display(), "[xc-01] Opened checkpoint store (read-only)");
        Ok(Self {
            db,
            path,
            overlay: RwLock::new(Arc::new(WriteBuffer::new())),
        })
    }

    fn get_disk(&self, family: Family, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let cf = cf_handle(&self.db, family)?;
        Ok(self.db.get_cf(cf, key)?)
    }

    fn find_disk(&self, family: Family, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let cf = cf_handle(&self.db, family)?;
        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(prefix, Direction::Forward));
        collect_prefix(iter, prefix)
    }

    /// Number of overlay entries held in memory.
    pub fn overlay_len(&self) -> usize {
        self.overlay.read().len()
    }

    fn current_overlay(&self) -> Arc<WriteBuffer> {
        Arc::clone(&self.overlay.read())
    }

    fn apply_to_overlay(&self, apply: impl FnOnce(&mut WriteBuffer)) {
        let mut guard = self.overlay.write();
        apply(Arc::make_mut(&mut *guard));
    }
}

impl Store for CheckpointStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Checkpoint
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn get(&self, family: Family, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        if let Some(staged) = self.overlay.read().get(family, key) {
            return Ok(staged.cloned());
        }
        self.get_disk(family, key)
    }

    fn snapshot(&self) -> Box<dyn SnapshotView + '_> {
        Box::new(CheckpointView {
            store: self,
            overlay: self.current_overlay(),
            buffer: WriteBuffer::new(),
        })
    }

    fn put_general(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.apply_to_overlay(|overlay| overlay.put(Family::GeneralStorage, key, value));
        Ok(())
    }

    fn put_general_sync(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.put_general(key, value)
    }
}

struct CheckpointView<'a> {
    store: &'a CheckpointStore,
    overlay: Arc<WriteBuffer>,
    buffer: WriteBuffer,
}

impl SnapshotView for CheckpointView<'_> {
    fn get(&self, family: Family, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        if let Some(staged) = self.buffer.get(family, key) {
            return Ok(staged.cloned());
        }
        if let Some(committed) = self.overlay.get(family, key) {
            return Ok(committed.cloned());
        }
        self.store.get_disk(family, key)
    }

    fn find(&self, family: Family, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let disk = self.store.find_disk(family, prefix)?;
        let with_overlay = self.overlay.merge_prefix(family, prefix, disk);
        Ok(self.buffer.merge_prefix(family, prefix, with_overlay))
    }

    fn put(&mut self, family: Family, key: &[u8], value: &[u8]) {
        self.buffer.put(family, key, value);
    }

    fn delete(&mut self, family: Family, key: &[u8]) {
        self.buffer.delete(family, key);
    }

    fn staged_len(&self) -> usize {
        self.buffer.len()
    }

    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let staged = self.buffer.len();
        let CheckpointView { store, buffer, .. } = *self;
        store.apply_to_overlay(|overlay| {
            for ((family, key), value) in buffer.into_entries() {
                match value {
                    Some(v) => overlay.put(family, &key, &v),
                    None => overlay.delete(family, &key),
                }
            }
        });
        debug!(staged, "[xc-01] Committed view into checkpoint overlay");
        Ok(())
    }
}
