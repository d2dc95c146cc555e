//! RocksDB-backed implementations of the `Store` port.

mod checkpoint_store;
mod rocksdb_store;

pub use checkpoint_store::CheckpointStore;
pub use rocksdb_store::RocksDbStore;

use crate::domain::errors::StoreError;
use crate::domain::family::Family;
use rocksdb::{ColumnFamily, DB};

type RawEntry = Result<(Box<[u8]>, Box<[u8]>), rocksdb::Error>;

pub(crate) fn cf_handle(db: &DB, family: Family) -> Result<&ColumnFamily, StoreError> {
    db.cf_handle(family.name())
        .ok_or_else(|| StoreError::UnknownFamily(family.name().to_string()))
}

/// Drain a forward iterator positioned at `prefix` until keys stop matching.
pub(crate) fn collect_prefix<I>(iter: I, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError>
where
    I: Iterator<Item = RawEntry>,
{
    let mut out = Vec::new();
    for item in iter {
        let (key, value) = item?;
        if !key.starts_with(prefix) {
            break;
        }
        out.push((key.to_vec(), value.to_vec()));
    }
    Ok(out)
}
