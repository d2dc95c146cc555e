//! # Live RocksDB Store
//!
//! Backs a running node. Every family is cleared on open because a local
//! network is always recreated from genesis.
//!
//! Views read through a RocksDB snapshot taken at view creation and stage
//! writes into a `WriteBatch` applied under the commit lock.

use super::{cf_handle, collect_prefix};
use crate::domain::config::RocksDbConfig;
use crate::domain::errors::StoreError;
use crate::domain::family::Family;
use crate::domain::write_buffer::WriteBuffer;
use crate::ports::inbound::{SnapshotView, Store, StoreKind};
use parking_lot::Mutex;
use rocksdb::checkpoint::Checkpoint;
use rocksdb::{
    ColumnFamilyDescriptor, DBCompressionType, Direction, IteratorMode, Options, WriteBatch,
    WriteOptions, DB,
};
use std::path::Path;
use tracing::{debug, info};

pub struct RocksDbStore {
    db: DB,
    config: RocksDbConfig,
    commit_lock: Mutex<()>,
}

impl RocksDbStore {
    /// Open (creating if missing) and clear the store at `config.path`.
    pub fn open(config: RocksDbConfig) -> Result<Self, StoreError> {
        let mut opts = config.db_options();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors: Vec<ColumnFamilyDescriptor> = Family::ALL
            .iter()
            .map(|family| {
                let mut cf_opts = Options::default();
                cf_opts.set_compression_type(DBCompressionType::Snappy);
                ColumnFamilyDescriptor::new(family.name(), cf_opts)
            })
            .collect();

        let db = DB::open_cf_descriptors(&opts, &config.path, descriptors)?;
        let store = Self {
            db,
            config,
            commit_lock: Mutex::new(()),
        };

        let cleared = store.clear()?;
        info!(
            path = %store.config.path.display(),
            cleared,
            "[xc-01] Opened live store"
        );
        Ok(store)
    }

    fn clear(&self) -> Result<usize, StoreError> {
        let mut batch = WriteBatch::default();
        let mut count = 0usize;
        for family in Family::ALL {
            let cf = cf_handle(&self.db, family)?;
            for item in self.db.iterator_cf(cf, IteratorMode::Start) {
                let (key, _) = item?;
                batch.delete_cf(cf, key);
                count += 1;
            }
        }
        if count > 0 {
            self.db.write(batch)?;
        }
        Ok(count)
    }

    fn write_options(sync: bool) -> WriteOptions {
        let mut opts = WriteOptions::default();
        opts.set_sync(sync);
        opts
    }

    fn put_general_opt(&self, key: &[u8], value: &[u8], sync: bool) -> Result<(), StoreError> {
        let cf = cf_handle(&self.db, Family::GeneralStorage)?;
        let _guard = self.commit_lock.lock();
        self.db
            .put_cf_opt(cf, key, value, &Self::write_options(sync))?;
        Ok(())
    }

    pub fn config(&self) -> &RocksDbConfig {
        &self.config
    }

    /// Flush and release the database handle.
    pub fn close(self) {
        let path = self.config.path.clone();
        drop(self);
        info!(path = %path.display(), "[xc-01] Closed live store");
    }
}

impl Store for RocksDbStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Live
    }

    fn path(&self) -> &Path {
        &self.config.path
    }

    fn get(&self, family: Family, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let cf = cf_handle(&self.db, family)?;
        Ok(self.db.get_cf(cf, key)?)
    }

    fn snapshot(&self) -> Box<dyn SnapshotView + '_> {
        Box::new(LiveView {
            db: &self.db,
            snapshot: self.db.snapshot(),
            buffer: WriteBuffer::new(),
            commit_lock: &self.commit_lock,
            sync_writes: self.config.sync_writes,
        })
    }

    fn put_general(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.put_general_opt(key, value, self.config.sync_writes)
    }

    fn put_general_sync(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.put_general_opt(key, value, true)
    }

    fn checkpoint(&self, dir: &Path) -> Result<(), StoreError> {
        let checkpoint = Checkpoint::new(&self.db)?;
        checkpoint.create_checkpoint(dir)?;
        debug!(dir = %dir.display(), "[xc-01] Created on-disk checkpoint");
        Ok(())
    }
}

struct LiveView<'a> {
    db: &'a DB,
    snapshot: rocksdb::Snapshot<'a>,
    buffer: WriteBuffer,
    commit_lock: &'a Mutex<()>,
    sync_writes: bool,
}

impl SnapshotView for LiveView<'_> {
    fn get(&self, family: Family, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        if let Some(staged) = self.buffer.get(family, key) {
            return Ok(staged.cloned());
        }
        let cf = cf_handle(self.db, family)?;
        Ok(self.snapshot.get_cf(cf, key)?)
    }

    fn find(&self, family: Family, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let cf = cf_handle(self.db, family)?;
        let iter = self
            .snapshot
            .iterator_cf(cf, IteratorMode::From(prefix, Direction::Forward));
        let base = collect_prefix(iter, prefix)?;
        Ok(self.buffer.merge_prefix(family, prefix, base))
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
        let LiveView {
            db,
            snapshot,
            buffer,
            commit_lock,
            sync_writes,
        } = *self;
        drop(snapshot);

        if buffer.is_empty() {
            return Ok(());
        }
        let staged = buffer.len();
        let mut batch = WriteBatch::default();
        for ((family, key), value) in buffer.into_entries() {
            let cf = cf_handle(db, family)?;
            match value {
                Some(v) => batch.put_cf(cf, key, v),
                None => batch.delete_cf(cf, key),
            }
        }

        let _guard = commit_lock.lock();
        db.write_opt(batch, &RocksDbStore::write_options(sync_writes))?;
        debug!(staged, "[xc-01] Committed snapshot view");
        Ok(())
    }
}
