//! Per-tokenizer memo of segment → subword symbols.
//!
//! Entries are only ever inserted, never modified, so readers never observe
//! a half-built value. The map is bounded: once `capacity` segments are
//! stored, further segments are computed on every call but not remembered.

use std::{
    collections::HashMap,
    sync::{
        Arc, PoisonError, RwLock,
        atomic::{AtomicUsize, Ordering},
    },
};

/// Default maximum number of cached segments.
pub const DEFAULT_CACHE_CAPACITY: usize = 65_536;

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: usize,
    /// Lookups that ran the merge computation.
    pub misses: usize,
    /// Segments currently stored.
    pub entries: usize,
}

#[derive(Debug)]
pub struct EncodeCache {
    entries: RwLock<HashMap<String, Arc<[String]>>>,
    capacity: usize,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl EncodeCache {
    /// Creates an empty cache holding at most `capacity` segments
    /// (`0` disables caching).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Returns the cached symbols for `segment`, computing and storing them
    /// on a miss.
    pub fn get_or_compute<F>(&self, segment: &str, compute: F) -> Arc<[String]>
    where
        F: FnOnce(&str) -> Vec<String>,
    {
        if self.capacity > 0 {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(symbols) = entries.get(segment) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Arc::clone(symbols);
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let symbols: Arc<[String]> = compute(segment).into();

        if self.capacity > 0 {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            if entries.len() < self.capacity {
                entries
                    .entry(segment.to_string())
                    .or_insert_with(|| Arc::clone(&symbols));
                if entries.len() == self.capacity {
                    log::debug!("encode cache reached capacity ({})", self.capacity);
                }
            }
        }

        symbols
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries,
        }
    }

    /// Drops all entries and resets the counters.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split_chars(s: &str) -> Vec<String> {
        s.chars().map(String::from).collect()
    }

    #[test]
    fn test_second_lookup_hits() {
        let cache = EncodeCache::new(8);
        let first = cache.get_or_compute("abc", split_chars);
        let second = cache.get_or_compute("abc", |_| unreachable!("should be cached"));
        assert_eq!(first, second);
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                entries: 1
            }
        );
    }

    #[test]
    fn test_capacity_bounds_entries() {
        let cache = EncodeCache::new(2);
        for seg in ["a", "b", "c", "d"] {
            cache.get_or_compute(seg, split_chars);
        }
        assert_eq!(cache.stats().entries, 2);
        // "c" was never stored, so it is recomputed.
        cache.get_or_compute("c", split_chars);
        assert_eq!(cache.stats().misses, 5);
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let cache = EncodeCache::new(0);
        cache.get_or_compute("ab", split_chars);
        cache.get_or_compute("ab", split_chars);
        let stats = cache.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.entries, 0);
    }

    #[test]
    fn test_clear_resets() {
        let cache = EncodeCache::new(4);
        cache.get_or_compute("ab", split_chars);
        cache.get_or_compute("ab", split_chars);
        cache.clear();
        assert_eq!(cache.stats(), CacheStats::default());
    }
}
