//! # Inbound Ports
//!
//! What the ledger engine and the checkpoint subsystem call on a store.

use crate::domain::errors::StoreError;
use crate::domain::family::Family;
use std::path::Path;

/// Which concrete variant backs a `Store`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    /// Mutable store of a running node; supports checkpoints.
    Live,
    /// Read-only store opened from a checkpoint directory.
    Checkpoint,
}

/// Consistent read view plus a staged write buffer.
pub trait SnapshotView: Send {
    /// Staged writes first, then the captured snapshot.
    fn get(&self, family: Family, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// All entries whose key starts with `prefix`, sorted by key.
    fn find(&self, family: Family, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError>;

    fn put(&mut self, family: Family, key: &[u8], value: &[u8]);

    fn delete(&mut self, family: Family, key: &[u8]);

    fn staged_len(&self) -> usize;

    /// Apply every staged write together, or none of them.
    fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

/// Partitioned key-value store.
pub trait Store: Send + Sync {
    fn kind(&self) -> StoreKind;

    fn path(&self) -> &Path;

    fn get(&self, family: Family, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    fn snapshot(&self) -> Box<dyn SnapshotView + '_>;

    fn get_general(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        self.get(Family::GeneralStorage, key)
    }

    fn put_general(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    fn put_general_sync(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Hard-link snapshot of the on-disk files into `dir` (must not exist).
    fn checkpoint(&self, dir: &Path) -> Result<(), StoreError> {
        let _ = dir;
        Err(StoreError::ReadOnly)
    }
}
