//! # Staged Writes
//!
//! Ordered buffer of puts and deletes held by a snapshot view until commit.
//! A later write to the same key replaces the earlier one.

use super::family::Family;
use std::collections::BTreeMap;

type Entry = (Vec<u8>, Vec<u8>);

#[derive(Debug, Default, Clone)]
pub struct WriteBuffer {
    staged: BTreeMap<(Family, Vec<u8>), Option<Vec<u8>>>,
}

impl WriteBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, family: Family, key: &[u8], value: &[u8]) {
        self.staged.insert((family, key.to_vec()), Some(value.to_vec()));
    }

    pub fn delete(&mut self, family: Family, key: &[u8]) {
        self.staged.insert((family, key.to_vec()), None);
    }

    /// `Some(None)` means the key is staged for deletion.
    pub fn get(&self, family: Family, key: &[u8]) -> Option<Option<&Vec<u8>>> {
        self.staged
            .get(&(family, key.to_vec()))
            .map(|v| v.as_ref())
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Overlay staged entries for `family`/`prefix` onto `base` (sorted).
    pub fn merge_prefix(&self, family: Family, prefix: &[u8], base: Vec<Entry>) -> Vec<Entry> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> = base.into_iter().collect();
        for ((f, key), value) in self.staged.range((family, prefix.to_vec())..) {
            if *f != family || !key.starts_with(prefix) {
                break;
            }
            match value {
                Some(v) => {
                    merged.insert(key.clone(), v.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        merged.into_iter().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Family, &[u8], Option<&[u8]>)> {
        self.staged
            .iter()
            .map(|((f, k), v)| (*f, k.as_slice(), v.as_deref()))
    }

    pub fn into_entries(self) -> impl Iterator<Item = ((Family, Vec<u8>), Option<Vec<u8>>)> {
        self.staged.into_iter()
    }
}
