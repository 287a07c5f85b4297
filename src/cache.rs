use crate::albion::ItemData;
use chrono::{DateTime, TimeDelta, Utc};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the catalog said about a key the last time it was asked.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedItem {
    Found(ItemData),
    NotFound,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    item: CachedItem,
    fetched_at: DateTime<Utc>,
}

/// Bounded, time-limited cache of item catalog lookups, shared between the
/// scan loop and report callbacks.
#[derive(Clone)]
pub struct ItemCache {
    cache: Arc<Mutex<LruCache<String, CacheEntry>>>,
    ttl: TimeDelta,
}

impl ItemCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(cap))),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::hours(24)),
        }
    }

    /// Fresh entry for `key` as of `now`. Entries aged `ttl` or more are evicted
    /// and reported as missing.
    pub fn get(&self, key: &str, now: DateTime<Utc>) -> Option<CachedItem> {
        let mut cache = self.cache.lock().unwrap();
        let entry = cache.get(key)?;
        if now - entry.fetched_at < self.ttl {
            return Some(entry.item.clone());
        }
        cache.pop(key);
        None
    }

    pub fn insert(&self, key: &str, item: CachedItem, now: DateTime<Utc>) {
        let mut cache = self.cache.lock().unwrap();
        cache.put(
            key.to_string(),
            CacheEntry {
                item,
                fetched_at: now,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.cache.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
