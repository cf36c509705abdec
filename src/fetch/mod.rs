//! Cache-first retrieval of raw bytes for a URL.
//!
//! [`FetchService`] checks the injected [`CacheStore`] before touching the
//! network, and stores successful (`< 300`) responses on the way back.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::{CacheStore, MemoryCache};
use crate::client::{HttpClient, TransportError};
use crate::config::FetchConfig;
use crate::dispatch::MainQueue;
use crate::http::{InvalidUrl, Request};

/// Responses with a status code below this are written to the cache.
const CACHEABLE_STATUS_LIMIT: u16 = 300;

/// Errors produced by a fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    InvalidUrl(#[from] InvalidUrl),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Something that can turn a URL into bytes.
///
/// [`FetchService`] is the real implementation; the model fetcher is generic
/// over this so it can be driven without a network.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn request(&self, url: &str) -> Result<Bytes, FetchError>;
}

/// Single-request GET with cache-first lookup.
///
/// Holds only shared handles, so cloning is cheap and clones share the same
/// transport and cache.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
///
/// use cachefetch::cache::MemoryCache;
/// use cachefetch::client::Http1Client;
/// use cachefetch::fetch::FetchService;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let service = FetchService::new(Arc::new(Http1Client::new()), Arc::new(MemoryCache::new()));
///     let bytes = service.request("http://127.0.0.1:8080/item/1").await?;
///     println!("{} bytes", bytes.len());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FetchService {
    client: Arc<dyn HttpClient>,
    cache: Arc<dyn CacheStore>,
}

impl FetchService {
    /// Creates a service over an explicit transport and cache.
    pub fn new(client: Arc<dyn HttpClient>, cache: Arc<dyn CacheStore>) -> Self {
        Self { client, cache }
    }

    /// Builds the default transport and a [`MemoryCache`] from `config`.
    ///
    /// The transport is [`ReqwestClient`](crate::client::ReqwestClient) when
    /// the `reqwest` feature is enabled, [`Http1Client`](crate::client::Http1Client)
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the transport cannot be initialized.
    pub fn from_config(config: &FetchConfig) -> Result<Self, TransportError> {
        #[cfg(feature = "reqwest")]
        let client: Arc<dyn HttpClient> =
            Arc::new(crate::client::ReqwestClient::from_config(config)?);
        #[cfg(not(feature = "reqwest"))]
        let client: Arc<dyn HttpClient> = Arc::new(crate::client::Http1Client::from_config(config));

        let cache = Arc::new(MemoryCache::with_config(&config.cache));
        Ok(Self::new(client, cache))
    }

    /// Returns the cache this service reads and writes.
    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    /// Fetches the body at `url`, from the cache if a response is stored for
    /// it, otherwise from the network.
    ///
    /// Any response the server sends counts as success, whatever its status;
    /// only responses below 300 are cached.
    ///
    /// # Errors
    ///
    /// - [`FetchError::InvalidUrl`]: `url` does not parse.
    /// - [`FetchError::Transport`]: the transport failed; the cache is untouched.
    pub async fn request(&self, url: &str) -> Result<Bytes, FetchError> {
        let request = Request::get(url)?;

        if let Some(cached) = self.cache.lookup(&request) {
            debug!(url = %request.url(), "cache hit");
            return Ok(cached.data());
        }
        debug!(url = %request.url(), "cache miss, fetching");

        let response = self.client.get(&request).await.inspect_err(|e| {
            warn!(url = %request.url(), error = %e, "transport error");
        })?;

        let body = response.body_bytes().clone();
        if response.status().as_u16() < CACHEABLE_STATUS_LIMIT {
            self.cache.store(response, &request);
        } else {
            debug!(url = %request.url(), status = %response.status(), "not caching");
        }

        Ok(body)
    }

    /// Runs [`request`](Self::request) on a Tokio task and posts `completion`
    /// to `queue` with the result.
    ///
    /// Every call delivers exactly one completion, provided the main loop is
    /// still alive. Must be called from within a Tokio runtime.
    pub fn request_on<F>(&self, url: &str, queue: &MainQueue, completion: F)
    where
        F: FnOnce(Result<Bytes, FetchError>) + Send + 'static,
    {
        let service = self.clone();
        let queue = queue.clone();
        let url = url.to_owned();

        tokio::spawn(async move {
            let result = service.request(&url).await;
            queue.post(move || completion(result));
        });
    }
}

#[async_trait]
impl Fetch for FetchService {
    async fn request(&self, url: &str) -> Result<Bytes, FetchError> {
        FetchService::request(self, url).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::cache::CachedResponse;
    use crate::dispatch::main_queue;
    use crate::http::{Response, StatusCode};

    /// Answers every GET with a canned result and counts calls.
    #[derive(Debug)]
    struct StubClient {
        status: StatusCode,
        body: &'static [u8],
        fail: bool,
        calls: AtomicUsize,
    }

    impl StubClient {
        fn ok(status: StatusCode, body: &'static [u8]) -> Arc<Self> {
            Arc::new(Self {
                status,
                body,
                fail: false,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                status: StatusCode::OK,
                body: b"",
                fail: true,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HttpClient for StubClient {
        async fn get(&self, _request: &Request) -> Result<Response, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(TransportError::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "reset by peer",
                )));
            }
            Ok(Response::new(self.status).body(Bytes::from_static(self.body)))
        }
    }

    /// Wraps a [`MemoryCache`] and counts stores.
    #[derive(Debug, Default)]
    struct RecordingCache {
        inner: MemoryCache,
        stores: Mutex<Vec<String>>,
    }

    impl RecordingCache {
        fn stores(&self) -> Vec<String> {
            self.stores.lock().unwrap().clone()
        }
    }

    impl CacheStore for RecordingCache {
        fn lookup(&self, request: &Request) -> Option<CachedResponse> {
            self.inner.lookup(request)
        }

        fn store(&self, response: Response, request: &Request) {
            self.stores.lock().unwrap().push(request.cache_key());
            self.inner.store(response, request);
        }
    }

    const URL: &str = "https://api.example.com/item/1";

    fn service(client: &Arc<StubClient>, cache: &Arc<RecordingCache>) -> FetchService {
        FetchService::new(client.clone(), cache.clone())
    }

    #[tokio::test]
    async fn miss_fetches_and_stores_once() {
        let client = StubClient::ok(StatusCode::OK, br#"{"id":1}"#);
        let cache = Arc::new(RecordingCache::default());

        let bytes = service(&client, &cache).request(URL).await.unwrap();

        assert_eq!(&bytes[..], br#"{"id":1}"#);
        assert_eq!(client.calls(), 1);
        assert_eq!(cache.stores(), vec![format!("GET {URL}")]);
    }

    #[tokio::test]
    async fn hit_skips_network() {
        let client = StubClient::ok(StatusCode::OK, b"network");
        let cache = Arc::new(RecordingCache::default());
        cache.inner.store(
            Response::new(StatusCode::OK).body(Bytes::from_static(b"cached")),
            &Request::get(URL).unwrap(),
        );

        let bytes = service(&client, &cache).request(URL).await.unwrap();

        assert_eq!(&bytes[..], b"cached");
        assert_eq!(client.calls(), 0);
        assert!(cache.stores().is_empty());
    }

    #[tokio::test]
    async fn second_request_served_from_cache() {
        let client = StubClient::ok(StatusCode::OK, b"payload");
        let cache = Arc::new(RecordingCache::default());
        let service = service(&client, &cache);

        service.request(URL).await.unwrap();
        let again = service.request(URL).await.unwrap();

        assert_eq!(&again[..], b"payload");
        assert_eq!(client.calls(), 1);
        assert_eq!(cache.stores().len(), 1);
    }

    #[tokio::test]
    async fn status_300_and_above_not_cached() {
        for status in [StatusCode::NOT_MODIFIED, StatusCode::INTERNAL_SERVER_ERROR] {
            let client = StubClient::ok(status, b"body");
            let cache = Arc::new(RecordingCache::default());

            let bytes = service(&client, &cache).request(URL).await.unwrap();

            assert_eq!(&bytes[..], b"body");
            assert!(cache.stores().is_empty());
        }
    }

    #[tokio::test]
    async fn not_found_with_empty_body_is_success() {
        let client = StubClient::ok(StatusCode::NOT_FOUND, b"");
        let cache = Arc::new(RecordingCache::default());

        let bytes = service(&client, &cache).request(URL).await.unwrap();

        assert!(bytes.is_empty());
        assert!(cache.stores().is_empty());
        assert!(cache.lookup(&Request::get(URL).unwrap()).is_none());
    }

    #[tokio::test]
    async fn transport_error_propagates_without_caching() {
        let client = StubClient::failing();
        let cache = Arc::new(RecordingCache::default());

        let err = service(&client, &cache).request(URL).await.unwrap_err();

        match err {
            FetchError::Transport(TransportError::Io(e)) => {
                assert_eq!(e.kind(), std::io::ErrorKind::ConnectionReset);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(cache.stores().is_empty());
    }

    #[tokio::test]
    async fn malformed_url_fails_fast() {
        let client = StubClient::ok(StatusCode::OK, b"");
        let cache = Arc::new(RecordingCache::default());

        let err = service(&client, &cache).request("not a url").await.unwrap_err();

        assert!(matches!(err, FetchError::InvalidUrl(ref e) if e.input() == "not a url"));
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn request_on_delivers_through_main_queue() {
        let client = StubClient::ok(StatusCode::OK, b"queued");
        let cache = Arc::new(RecordingCache::default());
        let (queue, mut main_loop) = main_queue();
        let delivered = Arc::new(Mutex::new(None));

        let slot = Arc::clone(&delivered);
        service(&client, &cache).request_on(URL, &queue, move |result| {
            *slot.lock().unwrap() = Some(result.map(|b| b.to_vec()));
        });
        assert!(main_loop.run_next().await);

        let result = delivered.lock().unwrap().take().unwrap();
        assert_eq!(result.unwrap(), b"queued".to_vec());
    }

    #[tokio::test]
    async fn request_on_reports_invalid_url() {
        let client = StubClient::ok(StatusCode::OK, b"");
        let cache = Arc::new(RecordingCache::default());
        let (queue, mut main_loop) = main_queue();
        let failed = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&failed);
        service(&client, &cache).request_on("not a url", &queue, move |result| {
            if matches!(result, Err(FetchError::InvalidUrl(_))) {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        assert!(main_loop.run_next().await);
        assert_eq!(failed.load(Ordering::SeqCst), 1);
    }
}
