//! Context Registry - in-flight signing contexts keyed by transaction hash.
//!
//! Concurrent submissions for the same transaction merge into one shared
//! context. Entries expire after the configured TTL; nothing survives a
//! restart.

use super::context::SigningContext;
use dashmap::DashMap;
use parking_lot::Mutex;
use shared_types::Hash256;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub type SharedContext = Arc<Mutex<SigningContext>>;

struct Entry {
    context: SharedContext,
    created_at: Instant,
}

pub struct ContextRegistry {
    entries: DashMap<Hash256, Entry>,
    ttl: Duration,
}

impl ContextRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// The registered context for `context`'s transaction, registering
    /// `context` itself when none exists yet. The flag is true when the
    /// returned context was already present.
    pub fn get_or_insert(&self, context: SigningContext) -> (SharedContext, bool) {
        let hash = context.hash();
        let mut existing = true;
        let shared = self
            .entries
            .entry(hash)
            .or_insert_with(|| {
                existing = false;
                debug!(tx = %hash, "[xc-04] Signing context registered");
                Entry {
                    context: Arc::new(Mutex::new(context)),
                    created_at: Instant::now(),
                }
            })
            .context
            .clone();
        (shared, existing)
    }

    pub fn get(&self, hash: &Hash256) -> Option<SharedContext> {
        self.entries.get(hash).map(|entry| entry.context.clone())
    }

    pub fn remove(&self, hash: &Hash256) -> Option<SharedContext> {
        self.entries.remove(hash).map(|(_, entry)| entry.context)
    }

    /// Drop contexts older than the TTL. Returns how many were removed.
    pub fn remove_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        self.entries.retain(|hash, entry| {
            let keep = now.duration_since(entry.created_at) <= self.ttl;
            if !keep {
                warn!(tx = %hash, "[xc-04] Abandoned signing context expired");
                removed += 1;
            }
            keep
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
