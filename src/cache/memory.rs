//! In-memory [`CacheStore`] backed by `moka`.

use moka::sync::Cache as MokaCache;
use tracing::debug;

use super::{CacheStore, CachedResponse};
use crate::config::CacheConfig;
use crate::http::{Request, Response};

/// Thread-safe, size-bounded response cache.
///
/// Entries are weighed by body and header bytes, so
/// [`CacheConfig::max_capacity_bytes`] is a memory budget rather than an
/// entry count. Cloning is cheap and clones share the same storage.
///
/// # Examples
///
/// ```
/// use cachefetch::cache::{CacheStore, MemoryCache};
/// use cachefetch::http::{Request, Response, StatusCode};
///
/// let cache = MemoryCache::new();
/// let request = Request::get("https://api.example.com/item/1").unwrap();
/// assert!(cache.lookup(&request).is_none());
///
/// cache.store(Response::new(StatusCode::OK).body("hello"), &request);
/// assert_eq!(&cache.lookup(&request).unwrap().data()[..], b"hello");
/// ```
#[derive(Debug, Clone)]
pub struct MemoryCache {
    entries: MokaCache<String, CachedResponse>,
}

impl MemoryCache {
    /// Creates a cache with the default [`CacheConfig`].
    pub fn new() -> Self {
        Self::with_config(&CacheConfig::default())
    }

    /// Creates a cache bounded by `config`.
    pub fn with_config(config: &CacheConfig) -> Self {
        let mut builder = MokaCache::builder()
            .max_capacity(config.max_capacity_bytes)
            .weigher(|_key: &String, entry: &CachedResponse| -> u32 {
                u32::try_from(entry.response().byte_size()).unwrap_or(u32::MAX)
            });

        if let Some(ttl) = config.time_to_live() {
            builder = builder.time_to_live(ttl);
        }

        Self {
            entries: builder.build(),
        }
    }

    /// Number of stored entries. Approximate while evictions are pending.
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for MemoryCache {
    fn lookup(&self, request: &Request) -> Option<CachedResponse> {
        self.entries.get(&request.cache_key())
    }

    fn store(&self, response: Response, request: &Request) {
        let key = request.cache_key();
        debug!(key = %key, bytes = response.body_bytes().len(), "caching response");
        self.entries.insert(key, CachedResponse::new(response));
    }
}
