//! In-memory verdict cache keyed by normalized content.
//!
//! Entries never expire and are never evicted; they live until [`ResultCache::clear`].
//! All access goes through a single `RwLock`, so `clear` is atomic with
//! respect to concurrent reads and writes.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::normalizer::NormalizedKey;

/// Thread-safe memo of verdicts.
#[derive(Debug)]
pub struct ResultCache<V> {
    entries: RwLock<HashMap<NormalizedKey, V>>,
}

impl<V: Clone> ResultCache<V> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns a copy of the cached verdict, if present.
    pub fn get(&self, key: &NormalizedKey) -> Option<V> {
        self.entries.read().get(key).cloned()
    }

    /// Stores a verdict. An existing entry for the same key is overwritten.
    pub fn put(&self, key: NormalizedKey, verdict: V) {
        self.entries.write().insert(key, verdict);
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drops every entry and returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write();
        let removed = entries.len();
        entries.clear();
        removed
    }
}

impl<V: Clone> Default for ResultCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
