//! In-memory cache for decoded objects
//!
//! [`KeyedCache`] is a bounded LRU map with an explicit miss signal: `get`
//! fails with [`NotFoundError`] instead of returning an `Option`, so a cache
//! miss can never be confused with a decode failure upstream. Entries may be
//! evicted at any time once capacity is reached; callers treat a miss as
//! "recompute".

pub mod key;

use std::fmt::Debug;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

use lru::LruCache;

use crate::error::NotFoundError;

pub use key::request_key;

/// Capacity used when a zero capacity is requested
const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(256) {
    Some(n) => n,
    None => unreachable!(),
};

/// Thread-safe keyed object cache.
///
/// Values are cloned out on `get`; store `Arc<T>` to share one instance
/// between callers.
pub struct KeyedCache<K, V> {
    entries: Mutex<LruCache<K, V>>,
}

impl<K, V> KeyedCache<K, V>
where
    K: Hash + Eq + Debug,
    V: Clone,
{
    /// Create a cache holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(DEFAULT_CAPACITY);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<K, V>> {
        // A panic mid-insert cannot leave the map half-written, so a
        // poisoned lock is still usable.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert or overwrite an entry
    pub fn set(&self, key: K, value: V) {
        self.lock().put(key, value);
    }

    /// Look up an entry, failing with [`NotFoundError`] on a miss
    pub fn get(&self, key: &K) -> Result<V, NotFoundError> {
        self.lock().get(key).cloned().ok_or_else(|| NotFoundError {
            key: format!("{:?}", key),
        })
    }

    /// Remove an entry if present
    pub fn remove(&self, key: &K) {
        self.lock().pop(key);
    }

    /// Remove every entry
    pub fn remove_all(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }
}

impl<K, V> Default for KeyedCache<K, V>
where
    K: Hash + Eq + Debug,
    V: Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY.get())
    }
}
