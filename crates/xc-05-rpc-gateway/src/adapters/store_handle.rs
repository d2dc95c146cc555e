//! # Store Handle
//!
//! Revocable reference to the node store shared by request handlers.
//! Handlers borrow the store for the duration of one call; `revoke` waits
//! for those borrows to end and hands the last gateway reference back to the
//! node so it can close the store.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;
use xc_01_kv_store::{Store, StoreKind};

#[derive(Clone)]
pub struct StoreHandle {
    inner: Arc<RwLock<Option<Arc<dyn Store>>>>,
}

impl StoreHandle {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(store))),
        }
    }

    /// Run `f` against the store; `None` once revoked.
    pub fn with_store<T>(&self, f: impl FnOnce(&dyn Store) -> T) -> Option<T> {
        let guard = self.inner.read();
        guard.as_deref().map(f)
    }

    pub fn kind(&self) -> Option<StoreKind> {
        self.with_store(|store| store.kind())
    }

    pub fn is_revoked(&self) -> bool {
        self.inner.read().is_none()
    }

    /// Blocks until in-flight `with_store` calls return.
    pub fn revoke(&self) -> Option<Arc<dyn Store>> {
        let store = self.inner.write().take();
        debug!(revoked = store.is_some(), "[xc-05] Store handle revoked");
        store
    }
}
