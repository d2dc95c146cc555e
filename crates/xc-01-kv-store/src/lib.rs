//! # Key-Value Store (xc-01)
//!
//! Partitioned storage for a node's ledger data on top of RocksDB column
//! families, plus isolated snapshot views with atomic commit.
//!
//! ## Variants
//!
//! | Variant | Opened from | Writes |
//! |---------|-------------|--------|
//! | `RocksDbStore` | live node directory (cleared on open) | staged, committed atomically |
//! | `CheckpointStore` | extracted checkpoint directory | in-memory overlay, never persisted |
//!
//! Both implement the `Store` port, so callers pick a variant at open time
//! and otherwise treat them the same.
//!
//! ## Concurrency
//!
//! - Views capture a point-in-time read snapshot when created.
//! - Commits are serialized by a single commit lock; reads never take it.
//!
//! ## Usage
//!
//! ```ignore
//! use xc_01_kv_store::{Family, RocksDbConfig, RocksDbStore, Store};
//!
//! let store = RocksDbStore::open(RocksDbConfig::for_testing(dir))?;
//! let mut view = store.snapshot();
//! view.put(Family::Storage, b"key", b"value");
//! view.commit()?;
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::{CheckpointStore, RocksDbStore};
pub use domain::config::RocksDbConfig;
pub use domain::errors::StoreError;
pub use domain::family::Family;
pub use domain::write_buffer::WriteBuffer;
pub use ports::inbound::{SnapshotView, Store, StoreKind};
