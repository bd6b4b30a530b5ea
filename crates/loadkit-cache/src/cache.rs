//! Bounded LRU cache implementation

use crate::config::CacheConfig;
use crate::stats::CacheStats;
use ahash::RandomState;
use loadkit_core::{LoadkitError, Result};
use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::debug;

/// Callback invoked with every entry that leaves the cache through eviction,
/// replacement, `delete` or `clear`
pub type Disposer<K, V> = Box<dyn FnMut(K, V) + Send>;

/// Fixed-capacity cache with least-recently-used eviction
///
/// Reads that hit (`get`, `get_mut`) and every `set` move the entry to the
/// most-recently-used end. `has` and `peek` never touch recency. When a new
/// key arrives at capacity the least-recently-used entry is evicted first.
pub struct LruCache<K, V> {
    /// Entries in recency order
    entries: lru::LruCache<K, V, RandomState>,
    /// Cache configuration
    config: CacheConfig,
    /// Optional disposal hook for values leaving the cache
    disposer: Option<Disposer<K, V>>,
    /// Cache statistics
    stats: Arc<CacheStats>,
}

impl<K: Hash + Eq, V> LruCache<K, V> {
    /// Create a cache holding at most `capacity` entries
    ///
    /// Fails with [`LoadkitError::InvalidCapacity`] when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_config(CacheConfig::new(capacity))
    }

    /// Create a cache from a full configuration
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        let capacity = NonZeroUsize::new(config.capacity)
            .ok_or(LoadkitError::InvalidCapacity(config.capacity))?;
        Ok(Self {
            entries: lru::LruCache::with_hasher(capacity, RandomState::new()),
            config,
            disposer: None,
            stats: Arc::new(CacheStats::new()),
        })
    }

    /// Create a cache that hands every evicted or removed entry to `disposer`
    pub fn with_disposer<F>(capacity: usize, disposer: F) -> Result<Self>
    where
        F: FnMut(K, V) + Send + 'static,
    {
        let mut cache = Self::new(capacity)?;
        cache.set_disposer(disposer);
        Ok(cache)
    }

    /// Install or replace the disposal callback
    pub fn set_disposer<F>(&mut self, disposer: F)
    where
        F: FnMut(K, V) + Send + 'static,
    {
        self.disposer = Some(Box::new(disposer));
    }

    /// Check if caching is enabled
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Look up a value, promoting it to most-recently-used on a hit
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if !self.config.enabled {
            self.stats.record_miss();
            return None;
        }

        match self.entries.get(key) {
            Some(value) => {
                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Mutable lookup, promoting the entry like [`get`](Self::get)
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if !self.config.enabled {
            self.stats.record_miss();
            return None;
        }

        match self.entries.get_mut(key) {
            Some(value) => {
                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Look up a value without changing its recency
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.peek(key)
    }

    /// Existence check; does not change recency
    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains(key)
    }

    /// Insert or replace a value
    ///
    /// Replacing an existing key promotes it and never evicts. Inserting a
    /// new key into a full cache evicts the least-recently-used entry first.
    pub fn set(&mut self, key: K, value: V) {
        if !self.config.enabled {
            return;
        }

        let replacing = self.entries.contains(&key);
        if let Some((old_key, old_value)) = self.entries.push(key, value) {
            if replacing {
                self.stats.record_replacement();
            } else {
                debug!(capacity = self.config.capacity, "Evicted least recently used entry");
                self.stats.record_eviction();
            }
            self.dispose(old_key, old_value);
        }

        if !replacing {
            self.stats.record_insert();
        }
        self.update_stats();
    }

    /// Remove an entry, returning whether one was present
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.entries.pop_entry(key) {
            Some((key, value)) => {
                self.dispose(key, value);
                self.update_stats();
                true
            }
            None => false,
        }
    }

    /// Remove every entry, least recently used first. Capacity is unchanged.
    pub fn clear(&mut self) {
        while let Some((key, value)) = self.entries.pop_lru() {
            self.dispose(key, value);
        }
        self.update_stats();
    }

    /// Current number of entries, always `<= capacity()`
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// Borrowing iterator, least recently used first. Does not touch recency.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&K, &V)> + '_ {
        self.entries.iter().rev()
    }

    /// Snapshot of the keys at call time, least recently used first
    pub fn keys(&self) -> std::vec::IntoIter<K>
    where
        K: Clone,
    {
        self.iter()
            .map(|(key, _)| key.clone())
            .collect::<Vec<_>>()
            .into_iter()
    }

    /// Snapshot of the values at call time, least recently used first
    pub fn values(&self) -> std::vec::IntoIter<V>
    where
        V: Clone,
    {
        self.iter()
            .map(|(_, value)| value.clone())
            .collect::<Vec<_>>()
            .into_iter()
    }

    /// Get cache statistics
    pub fn stats(&self) -> Arc<CacheStats> {
        Arc::clone(&self.stats)
    }

    /// Get the cache configuration
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn dispose(&mut self, key: K, value: V) {
        if let Some(disposer) = self.disposer.as_mut() {
            disposer(key, value);
            self.stats.record_disposal();
        }
    }

    fn update_stats(&self) {
        self.stats.set_entry_count(self.entries.len() as u64);
    }
}

impl<K: Hash + Eq, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("enabled", &self.config.enabled)
            .field("capacity", &self.capacity())
            .field("current_entries", &self.size())
            .field("has_disposer", &self.disposer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn cache(capacity: usize) -> LruCache<&'static str, i32> {
        LruCache::new(capacity).unwrap()
    }

    fn recording_cache(
        capacity: usize,
    ) -> (LruCache<&'static str, i32>, Arc<Mutex<Vec<(&'static str, i32)>>>) {
        let disposed = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&disposed);
        let cache = LruCache::with_disposer(capacity, move |k, v| {
            sink.lock().unwrap().push((k, v));
        })
        .unwrap();
        (cache, disposed)
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = LruCache::<String, i32>::new(0);
        assert!(matches!(result, Err(LoadkitError::InvalidCapacity(0))));
    }

    #[test]
    fn test_set_get() {
        let mut cache = cache(2);
        cache.set("squat", 90);

        assert_eq!(cache.get(&"squat"), Some(&90));
        assert_eq!(cache.get(&"lunge"), None);
        assert_eq!(cache.stats().hits(), 1);
        assert_eq!(cache.stats().misses(), 1);
    }

    #[test]
    fn test_capacity_invariant() {
        let mut cache = LruCache::new(3).unwrap();
        for i in 0..50 {
            cache.set(i % 7, i);
            assert!(cache.size() <= cache.capacity());
        }
        assert_eq!(cache.size(), 3);
    }

    #[test]
    fn test_evicts_oldest_key() {
        let mut cache = cache(3);
        cache.set("k1", 1);
        cache.set("k2", 2);
        cache.set("k3", 3);
        cache.set("k4", 4);

        assert!(!cache.has(&"k1"));
        assert!(cache.has(&"k2"));
        assert!(cache.has(&"k3"));
        assert!(cache.has(&"k4"));
        assert_eq!(cache.stats().evictions(), 1);
    }

    #[test]
    fn test_get_promotes_entry() {
        let mut cache = cache(2);
        cache.set("k1", 1);
        cache.set("k2", 2);
        cache.get(&"k1");
        cache.set("k3", 3);

        assert!(cache.has(&"k1"));
        assert!(!cache.has(&"k2"));
        assert!(cache.has(&"k3"));
    }

    #[test]
    fn test_replace_does_not_evict() {
        let mut cache = cache(2);
        cache.set("k1", 1);
        cache.set("k2", 2);
        cache.set("k1", 10);

        assert_eq!(cache.size(), 2);
        assert!(cache.has(&"k2"));
        assert_eq!(cache.get(&"k1"), Some(&10));
        assert_eq!(cache.stats().evictions(), 0);
        assert_eq!(cache.stats().replacements(), 1);
    }

    #[test]
    fn test_replace_promotes_entry() {
        let mut cache = cache(2);
        cache.set("k1", 1);
        cache.set("k2", 2);
        cache.set("k1", 10);
        cache.set("k3", 3);

        assert!(cache.has(&"k1"));
        assert!(!cache.has(&"k2"));
    }

    #[test]
    fn test_has_does_not_promote() {
        let mut cache = cache(2);
        cache.set("k1", 1);
        cache.set("k2", 2);
        for _ in 0..5 {
            assert!(cache.has(&"k1"));
        }
        assert_eq!(cache.peek(&"k1"), Some(&1));
        cache.set("k3", 3);

        assert!(!cache.has(&"k1"));
        assert!(cache.has(&"k2"));
    }

    #[test]
    fn test_capacity_one() {
        let mut cache = cache(1);
        cache.set("k1", 1);
        cache.set("k2", 2);

        assert_eq!(cache.size(), 1);
        assert!(!cache.has(&"k1"));
        assert_eq!(cache.get(&"k2"), Some(&2));
    }

    #[test]
    fn test_delete() {
        let mut cache = cache(2);
        cache.set("k1", 1);

        assert!(cache.delete(&"k1"));
        assert!(!cache.delete(&"k1"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_empties_fully() {
        let mut cache = cache(4);
        for (key, value) in [("a", 1), ("b", 2), ("c", 3)] {
            cache.set(key, value);
        }

        cache.clear();

        assert_eq!(cache.size(), 0);
        assert_eq!(cache.capacity(), 4);
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"c"), None);
        assert_eq!(cache.stats().entry_count(), 0);
    }

    #[test]
    fn test_keys_and_values_in_recency_order() {
        let mut cache = cache(3);
        cache.set("a", 1);
        cache.set("b", 2);
        cache.set("c", 3);
        cache.get(&"a");

        let keys = cache.keys();
        cache.set("d", 4);

        assert_eq!(keys.collect::<Vec<_>>(), vec!["b", "c", "a"]);
        assert_eq!(cache.values().collect::<Vec<_>>(), vec![3, 1, 4]);
    }

    #[test]
    fn test_disposer_on_eviction() {
        let (mut cache, disposed) = recording_cache(2);
        cache.set("k1", 1);
        cache.set("k2", 2);
        cache.set("k3", 3);

        assert_eq!(*disposed.lock().unwrap(), vec![("k1", 1)]);
        assert_eq!(cache.stats().disposals(), 1);
    }

    #[test]
    fn test_disposer_on_replace_delete_and_clear() {
        let (mut cache, disposed) = recording_cache(3);
        cache.set("k1", 1);
        cache.set("k1", 11);
        cache.set("k2", 2);
        cache.set("k3", 3);
        cache.delete(&"k2");
        cache.delete(&"missing");
        cache.clear();

        assert_eq!(
            *disposed.lock().unwrap(),
            vec![("k1", 1), ("k2", 2), ("k1", 11), ("k3", 3)]
        );
    }

    #[test]
    fn test_borrowed_key_lookup() {
        let mut cache: LruCache<String, u32> = LruCache::new(2).unwrap();
        cache.set("deadlift".to_string(), 5);

        assert!(cache.has("deadlift"));
        assert_eq!(cache.get("deadlift"), Some(&5));
        assert!(cache.delete("deadlift"));
    }

    #[test]
    fn test_get_mut_updates_in_place() {
        let mut cache = cache(2);
        cache.set("reps", 10);
        if let Some(value) = cache.get_mut(&"reps") {
            *value += 2;
        }
        assert_eq!(cache.peek(&"reps"), Some(&12));
    }

    #[test]
    fn test_cache_disabled() {
        let mut cache: LruCache<&str, i32> =
            LruCache::with_config(CacheConfig::disabled()).unwrap();
        cache.set("k1", 1);

        assert!(!cache.is_enabled());
        assert_eq!(cache.size(), 0);
        assert_eq!(cache.get(&"k1"), None);
        assert_eq!(cache.stats().misses(), 1);
    }
}
