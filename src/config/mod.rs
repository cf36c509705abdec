//! Fetch and cache configuration.
//!
//! Both structs deserialize with `#[serde(default)]`, so a partial document
//! (or an empty one) fills in the defaults below.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default `User-Agent` sent by the HTTP/1.1 transport.
pub const DEFAULT_USER_AGENT: &str = concat!("cachefetch/", env!("CARGO_PKG_VERSION"));

/// Largest response (head plus body) the HTTP/1.1 transport will buffer (8 MiB).
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 8 * 1024 * 1024;

/// Default cache budget (32 MiB of response bytes).
pub const DEFAULT_CACHE_CAPACITY_BYTES: u64 = 32 * 1024 * 1024;

/// Settings for [`FetchService::from_config`](crate::fetch::FetchService::from_config).
///
/// # Examples
///
/// ```
/// use cachefetch::config::FetchConfig;
///
/// let config: FetchConfig = serde_json::from_str(r#"{ "user_agent": "demo/1.0" }"#).unwrap();
/// assert_eq!(config.user_agent, "demo/1.0");
/// assert_eq!(config.max_response_bytes, cachefetch::config::DEFAULT_MAX_RESPONSE_BYTES);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    pub max_response_bytes: usize,
    pub cache: CacheConfig,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            cache: CacheConfig::default(),
        }
    }
}

impl FetchConfig {
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn with_max_response_bytes(mut self, max: usize) -> Self {
        self.max_response_bytes = max;
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }
}

/// Bounds for [`MemoryCache`](crate::cache::MemoryCache).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Total weight (body plus header bytes) the cache may hold before evicting.
    pub max_capacity_bytes: u64,
    /// Entries older than this are dropped. `None` keeps them until evicted.
    pub time_to_live_secs: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity_bytes: DEFAULT_CACHE_CAPACITY_BYTES,
            time_to_live_secs: None,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn with_max_capacity_bytes(mut self, bytes: u64) -> Self {
        self.max_capacity_bytes = bytes;
        self
    }

    #[must_use]
    pub fn with_time_to_live(mut self, ttl: Duration) -> Self {
        self.time_to_live_secs = Some(ttl.as_secs());
        self
    }

    pub fn time_to_live(&self) -> Option<Duration> {
        self.time_to_live_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: FetchConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, FetchConfig::default());
        assert!(config.user_agent.starts_with("cachefetch/"));
    }

    #[test]
    fn nested_cache_section() {
        let config: FetchConfig =
            serde_json::from_str(r#"{ "cache": { "time_to_live_secs": 60 } }"#).unwrap();
        assert_eq!(config.cache.time_to_live(), Some(Duration::from_secs(60)));
        assert_eq!(config.cache.max_capacity_bytes, DEFAULT_CACHE_CAPACITY_BYTES);
    }

    #[test]
    fn builders_chain() {
        let config = FetchConfig::default()
            .with_user_agent("ua")
            .with_max_response_bytes(1024)
            .with_cache(CacheConfig::default().with_max_capacity_bytes(10));
        assert_eq!(config.user_agent, "ua");
        assert_eq!(config.max_response_bytes, 1024);
        assert_eq!(config.cache.max_capacity_bytes, 10);
    }
}
