//! Response cache consulted before any network I/O.
//!
//! The fetch path only needs to look a request up and to store a response for
//! it, so the cache is a small capability trait. Eviction and
//! expiry are entirely the implementation's business.

use std::fmt;
use std::time::SystemTime;

use bytes::Bytes;

use crate::http::{Request, Response};

pub mod memory;

pub use memory::MemoryCache;

/// A response previously stored for a request.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    response: Response,
    stored_at: SystemTime,
}

impl CachedResponse {
    /// Wraps `response`, stamping it with the current time.
    pub fn new(response: Response) -> Self {
        Self {
            response,
            stored_at: SystemTime::now(),
        }
    }

    /// Returns the stored response.
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Returns the stored body. Cheap: [`Bytes`] is reference-counted.
    pub fn data(&self) -> Bytes {
        self.response.body_bytes().clone()
    }

    /// When the entry was written.
    pub fn stored_at(&self) -> SystemTime {
        self.stored_at
    }
}

/// Shared store of responses keyed by request identity
/// ([`Request::cache_key`]).
///
/// Implementations are shared across tasks without external locking and
/// must be internally synchronized.
pub trait CacheStore: Send + Sync + fmt::Debug {
    /// Returns the stored response for `request`, if any.
    fn lookup(&self, request: &Request) -> Option<CachedResponse>;

    /// Stores `response` (including its body) for `request`.
    fn store(&self, response: Response, request: &Request);
}
