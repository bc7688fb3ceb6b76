// src/storage/search_cache.rs

//! Time-bounded memoization of search results.
//!
//! One entry per `(query, category, sort_order)` key. An entry older than
//! the TTL reads as a miss; it stays in the map until the next `put` for
//! the same key overwrites it. There is no background sweep.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

/// Identity of a cached search.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub query: String,
    pub category: String,
    pub sort_order: String,
}

impl CacheKey {
    pub fn new(
        query: impl Into<String>,
        category: impl Into<String>,
        sort_order: impl Into<String>,
    ) -> Self {
        Self {
            query: query.into(),
            category: category.into(),
            sort_order: sort_order.into(),
        }
    }
}

/// Outcome of a cache read.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup<R> {
    Hit(Vec<R>),
    Miss,
}

#[derive(Debug, Clone)]
struct CacheEntry<R> {
    records: Vec<R>,
    fetched_at: Instant,
}

/// Search result cache with a fixed TTL.
#[derive(Debug, Clone)]
pub struct SearchCache<R> {
    ttl: Duration,
    entries: HashMap<CacheKey, CacheEntry<R>>,
}

impl<R: Clone> SearchCache<R> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &CacheKey) -> CacheLookup<R> {
        match self.entries.get(key) {
            Some(entry) if entry.fetched_at.elapsed() <= self.ttl => {
                log::debug!("Search cache hit: {key:?}");
                CacheLookup::Hit(entry.records.clone())
            }
            Some(_) => {
                log::debug!("Search cache expired: {key:?}");
                CacheLookup::Miss
            }
            None => CacheLookup::Miss,
        }
    }

    /// Store records, replacing any prior entry for the key and its timestamp.
    pub fn put(&mut self, key: CacheKey, records: Vec<R>) {
        self.entries.insert(
            key,
            CacheEntry {
                records,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Physically stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(q: &str) -> CacheKey {
        CacheKey::new(q, "금융", "accuracy")
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_within_ttl() {
        let mut cache = SearchCache::new(Duration::from_secs(30));
        cache.put(key("bank"), vec![1, 2, 3]);

        tokio::time::advance(Duration::from_secs(29)).await;
        assert_eq!(cache.get(&key("bank")), CacheLookup::Hit(vec![1, 2, 3]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_miss_without_put() {
        let mut cache = SearchCache::new(Duration::from_secs(30));
        cache.put(key("bank"), vec![1]);

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(cache.get(&key("bank")), CacheLookup::Miss);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_put_overwrites_timestamp() {
        let mut cache = SearchCache::new(Duration::from_secs(30));
        cache.put(key("bank"), vec![1]);
        tokio::time::advance(Duration::from_secs(20)).await;
        cache.put(key("bank"), vec![2]);
        tokio::time::advance(Duration::from_secs(20)).await;

        assert_eq!(cache.get(&key("bank")), CacheLookup::Hit(vec![2]));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let mut cache = SearchCache::new(Duration::from_secs(30));
        cache.put(key("bank"), vec![1]);

        assert_eq!(cache.get(&key("Bank")), CacheLookup::Miss);
        assert_eq!(
            cache.get(&CacheKey::new("bank", "금융", "desc")),
            CacheLookup::Miss
        );
    }
}
