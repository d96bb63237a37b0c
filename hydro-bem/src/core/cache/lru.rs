//! Bounded least-recently-used cache
//!
//! Entries are ordered by their last access. Inserting past the capacity
//! evicts the entry that was touched least recently. A capacity of zero
//! disables storage.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Access counters of a cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that found an entry
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
    /// Stored entries
    pub insertions: u64,
    /// Entries dropped to respect the capacity
    pub evictions: u64,
}

impl CacheStats {
    /// Fraction of lookups that were hits
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Least-recently-used cache with a fixed capacity
#[derive(Debug, Clone)]
pub struct LruCache<K, V> {
    max_size: usize,
    entries: HashMap<K, (V, u64)>,
    order: BTreeMap<u64, K>,
    clock: u64,
    stats: CacheStats,
}

impl<K: Clone + Eq + Hash, V> LruCache<K, V> {
    /// Empty cache holding at most `max_size` entries
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            entries: HashMap::with_capacity(max_size),
            order: BTreeMap::new(),
            clock: 0,
            stats: CacheStats::default(),
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Move an existing key to the most recent position
    fn promote(&mut self, key: &K) -> bool {
        let stamp = self.tick();
        match self.entries.get_mut(key) {
            Some((_, last)) => {
                self.order.remove(&*last);
                *last = stamp;
                self.order.insert(stamp, key.clone());
                true
            }
            None => false,
        }
    }

    /// Value of `key`, which becomes the most recently used entry
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if self.promote(key) {
            self.stats.hits += 1;
            self.entries.get(key).map(|(value, _)| value)
        } else {
            self.stats.misses += 1;
            None
        }
    }

    /// Value of `key` without changing the order or the statistics
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|(value, _)| value)
    }

    /// Mark `key` as the most recently used entry. Returns whether it was
    /// present.
    pub fn touch(&mut self, key: &K) -> bool {
        self.promote(key)
    }

    /// Insert or replace an entry as the most recently used one.
    ///
    /// Returns the entry evicted to respect the capacity, if any. With a
    /// capacity of zero nothing is stored and the pair is handed back.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if self.max_size == 0 {
            return Some((key, value));
        }
        let stamp = self.tick();
        if let Some((_, last)) = self.entries.insert(key.clone(), (value, stamp)) {
            self.order.remove(&last);
        }
        self.order.insert(stamp, key);
        self.stats.insertions += 1;

        if self.entries.len() > self.max_size {
            self.evict_oldest()
        } else {
            None
        }
    }

    /// Remove and return the least recently used entry
    pub fn evict_oldest(&mut self) -> Option<(K, V)> {
        let (_, key) = self.order.pop_first()?;
        let (value, _) = self.entries.remove(&key)?;
        self.stats.evictions += 1;
        Some((key, value))
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Capacity
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Whether `key` is stored; does not change the order
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys from the least to the most recently used
    pub fn keys(&self) -> Vec<&K> {
        self.order.values().collect()
    }

    /// Drop every entry; statistics are kept
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Access counters
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

impl<K: Clone + Eq + Hash, V: Clone> LruCache<K, V> {
    /// Cached value of `key`, or the result of `compute` which is then
    /// stored
    pub fn get_or_insert_with<F>(&mut self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(&key) {
            return value.clone();
        }
        let value = compute();
        self.put(key, value.clone());
        value
    }

    /// Cached value of `key`, or the result of `compute` which is then
    /// stored. Errors are returned without storing anything.
    pub fn get_or_try_insert_with<E, F>(&mut self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value.clone());
        }
        let value = compute()?;
        self.put(key, value.clone());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eviction_order() {
        let mut cache = LruCache::new(3);
        for (k, v) in [("a", 1), ("b", 2), ("c", 3)] {
            assert_eq!(cache.put(k, v), None);
        }
        assert_eq!(cache.keys(), vec![&"a", &"b", &"c"]);

        assert_eq!(cache.put("d", 4), Some(("a", 1)));
        assert_eq!(cache.len(), 3);
        assert!(!cache.contains_key(&"a"));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_access_saves_entry() {
        let mut cache = LruCache::new(3);
        cache.put(1, "one");
        cache.put(2, "two");
        cache.put(3, "three");

        assert_eq!(cache.get(&1), Some(&"one"));
        assert_eq!(cache.put(4, "four"), Some((2, "two")));
        assert!(cache.touch(&3));
        assert_eq!(cache.put(5, "five"), Some((1, "one")));
        assert_eq!(cache.keys(), vec![&4, &3, &5]);
    }

    #[test]
    fn test_peek_does_not_promote() {
        let mut cache = LruCache::new(2);
        cache.put('x', 0);
        cache.put('y', 1);
        assert_eq!(cache.peek(&'x'), Some(&0));
        assert_eq!(cache.put('z', 2), Some(('x', 0)));
        assert_eq!(cache.stats().hits, 0);
    }

    #[test]
    fn test_replace_existing_key() {
        let mut cache = LruCache::new(2);
        cache.put("k", 1);
        cache.put("l", 2);
        assert_eq!(cache.put("k", 10), None);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.keys(), vec![&"l", &"k"]);
        assert_eq!(cache.peek(&"k"), Some(&10));
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let mut cache = LruCache::new(0);
        assert_eq!(cache.put(1, 1.0), Some((1, 1.0)));
        assert!(cache.is_empty());
        let value: Result<f64, ()> = cache.get_or_try_insert_with(2, || Ok(4.0));
        assert_eq!(value, Ok(4.0));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_get_or_try_insert_with() {
        let mut cache = LruCache::new(4);
        let mut calls = 0;
        for _ in 0..3 {
            let value: Result<u32, String> = cache.get_or_try_insert_with("key", || {
                calls += 1;
                Ok(7)
            });
            assert_eq!(value, Ok(7));
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.stats().hits, 2);
        assert_eq!(cache.stats().misses, 1);
        assert_eq!(cache.stats().insertions, 1);

        let failed: Result<u32, String> = cache.get_or_try_insert_with("bad", || Err("no".into()));
        assert!(failed.is_err());
        assert!(!cache.contains_key(&"bad"));
        assert!((cache.stats().hit_rate() - 0.5).abs() < 1e-12);
    }
}
