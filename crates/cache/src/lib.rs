//! Cache crate
//!
//! Keeps one immutable snapshot per key, tagged with the revision it was
//! loaded at. Readers get an `Arc` to the snapshot and never wait on a load
//! in progress; a caller that sees a different revision loads a fresh value
//! and swaps the entry.

use dashmap::DashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use tracing::debug;

struct Entry<V, R> {
    value: Arc<V>,
    revision: R,
}

/// A thread-safe snapshot cache with revision-based invalidation.
pub struct SnapshotCache<K, V, R>
where
    K: Eq + Hash,
{
    entries: DashMap<K, Entry<V, R>>,
}

impl<K, V, R> Default for SnapshotCache<K, V, R>
where
    K: Eq + Hash + Clone + Debug,
    R: PartialEq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, R> SnapshotCache<K, V, R>
where
    K: Eq + Hash + Clone + Debug,
    R: PartialEq + Clone,
{
    pub fn new() -> Self {
        Self { entries: DashMap::new() }
    }

    /// Returns the snapshot for `key` if it was loaded at `revision`.
    pub fn get(&self, key: &K, revision: &R) -> Option<Arc<V>> {
        self.entries
            .get(key)
            .filter(|entry| entry.revision == *revision)
            .map(|entry| entry.value.clone())
    }

    /// Returns the cached snapshot for `key` at `revision`, calling `load` when
    /// the entry is missing or was loaded at another revision.
    ///
    /// `load` runs without any entry lock held, so concurrent misses on the
    /// same key may each load; the last one stored wins.
    pub fn get_or_load<E, F>(&self, key: &K, revision: R, load: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(key, &revision) {
            debug!(?key, "snapshot cache hit");
            return Ok(value);
        }
        debug!(?key, "snapshot cache miss");
        let value = Arc::new(load()?);
        self.entries.insert(key.clone(), Entry { value: value.clone(), revision });
        Ok(value)
    }

    pub fn invalidate(&self, key: &K) {
        self.entries.remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
