//! Expiring, bounded store of playtime lookups.
//!
//! A stored `None` means the title was looked up and nothing was found; that is
//! cached just like a hit so the site is not scraped again for it.

use std::time::Duration;

use gamedex_core::CompletionTimeInfo;
use moka::policy::EvictionPolicy;

pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_MAX_ENTRIES: u64 = 5_000;

/// Result of asking the cache about a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup<V> {
    /// Nothing stored (or it expired); the caller has to do the work.
    NotLookedUp,
    Found(V),
    /// A previous lookup confirmed there is nothing to find.
    ConfirmedAbsent,
}

/// Shared front for playtime lookups. Implementations must be safe to use
/// from many enrichment tasks at once.
pub trait PlaytimeCache: Send + Sync {
    fn get(&self, key: &str) -> CacheLookup<CompletionTimeInfo>;
    fn put(&self, key: String, value: Option<CompletionTimeInfo>);
}

/// Normalized cache key for a title: trimmed and lowercased.
pub fn cache_key(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Time-to-live + LRU bounded cache.
#[derive(Clone)]
pub struct TimeCache {
    inner: moka::sync::Cache<String, Option<CompletionTimeInfo>>,
}

impl TimeCache {
    pub fn new(ttl: Duration, max_entries: u64) -> TimeCache {
        let inner = moka::sync::Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .eviction_policy(EvictionPolicy::lru())
            .build();
        TimeCache { inner }
    }

    pub fn len(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TimeCache {
    fn default() -> Self {
        TimeCache::new(DEFAULT_TTL, DEFAULT_MAX_ENTRIES)
    }
}

impl std::fmt::Debug for TimeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeCache")
            .field("entries", &self.inner.entry_count())
            .field("max_entries", &self.inner.policy().max_capacity())
            .finish()
    }
}

impl PlaytimeCache for TimeCache {
    fn get(&self, key: &str) -> CacheLookup<CompletionTimeInfo> {
        match self.inner.get(key) {
            None => CacheLookup::NotLookedUp,
            Some(Some(info)) => CacheLookup::Found(info),
            Some(None) => CacheLookup::ConfirmedAbsent,
        }
    }

    fn put(&self, key: String, value: Option<CompletionTimeInfo>) {
        self.inner.insert(key, value);
    }
}
