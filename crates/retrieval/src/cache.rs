//! Bounded caches shared by concurrent retrievals.
//!
//! Each cache keeps its LRU behind a `std::sync::Mutex`; lock sections never
//! cross an `.await`, so check-then-insert is atomic with respect to other
//! retrievers.

use lru::LruCache;
use serde::Serialize;
use std::collections::BTreeMap;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use context_code_window::Range;

struct CacheState<K: Hash + Eq, V> {
    entries: LruCache<K, Arc<V>>,
    epoch: u64,
}

/// Capacity-bounded LRU cache with whole-value replacement.
///
/// Values are stored behind `Arc`, so readers get a complete snapshot and an
/// entry is swapped in one step. The epoch counter lets a slow producer detect
/// that the key was invalidated while it was computing.
pub struct BoundedCache<K: Hash + Eq, V> {
    state: Mutex<CacheState<K, V>>,
}

impl<K: Hash + Eq + Clone, V> BoundedCache<K, V> {
    /// Create a cache; a zero capacity is raised to one
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            state: Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                epoch: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState<K, V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.lock().entries.get(key).cloned()
    }

    pub fn insert(&self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        self.lock().entries.put(key, Arc::clone(&value));
        value
    }

    /// Current invalidation epoch; pass it back to [`BoundedCache::insert_if_current`]
    pub fn epoch(&self) -> u64 {
        self.lock().epoch
    }

    /// Insert unless an invalidation happened after `epoch` was read.
    pub fn insert_if_current(&self, key: K, value: V, epoch: u64) -> bool {
        let mut state = self.lock();
        if state.epoch != epoch {
            return false;
        }
        state.entries.put(key, Arc::new(value));
        true
    }

    pub fn invalidate(&self, key: &K) -> bool {
        let mut state = self.lock();
        state.epoch += 1;
        state.entries.pop(key).is_some()
    }

    /// Drop every entry for which `predicate(key, value)` holds
    pub fn invalidate_where(&self, predicate: impl Fn(&K, &V) -> bool) -> usize {
        let mut state = self.lock();
        state.epoch += 1;
        let doomed: Vec<K> = state
            .entries
            .iter()
            .filter(|(key, value)| predicate(key, value))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &doomed {
            state.entries.pop(key);
        }
        doomed.len()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Definition text resolved for an imported symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefinitionSnippet {
    pub filepath: String,
    pub range: Range,
    pub contents: String,
}

/// Import definitions of one file, keyed by imported symbol
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub imports: BTreeMap<String, Vec<DefinitionSnippet>>,
}

impl FileInfo {
    pub fn definitions(&self, symbol: &str) -> &[DefinitionSnippet] {
        self.imports.get(symbol).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Per-file import definitions, recomputed whenever the file gains focus
pub type ImportDefinitionCache = BoundedCache<String, FileInfo>;
