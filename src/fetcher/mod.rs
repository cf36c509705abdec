//! Typed fetches: JSON models and images on top of a [`Fetch`] source.
//!
//! Network failures are forwarded unchanged. Decode failures are not errors:
//! [`ModelFetcher::fetch_decoded`] reports them as [`Decoded::Malformed`],
//! while [`fetch_model_object`](ModelFetcher::fetch_model_object) and
//! [`fetch_image`](ModelFetcher::fetch_image) log them and return `Ok(None)`.

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::dispatch::MainQueue;
use crate::fetch::{Fetch, FetchError, FetchService};

pub mod decode;
pub mod image;

pub use decode::{Decode, DecodeError, Decoded, Json};
pub use image::Image;

/// Fetches payloads and decodes them into models or images.
///
/// # Examples
///
/// ```rust,no_run
/// use serde::Deserialize;
///
/// use cachefetch::config::FetchConfig;
/// use cachefetch::fetch::FetchService;
/// use cachefetch::fetcher::ModelFetcher;
///
/// #[derive(Debug, Deserialize)]
/// struct Character {
///     id: u32,
///     name: String,
/// }
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let fetcher = ModelFetcher::new(FetchService::from_config(&FetchConfig::default())?);
///     let character: Option<Character> = fetcher
///         .fetch_model_object("https://rickandmortyapi.com/api/character/1")
///         .await?;
///     println!("{character:?}");
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ModelFetcher<F = FetchService> {
    source: F,
}

impl<F: Fetch> ModelFetcher<F> {
    pub fn new(source: F) -> Self {
        Self { source }
    }

    /// Returns the underlying byte source.
    pub fn source(&self) -> &F {
        &self.source
    }

    /// Fetches `url` and decodes the payload as `D`.
    ///
    /// # Errors
    ///
    /// Only fetch failures; decode failures come back as [`Decoded::Malformed`].
    pub async fn fetch_decoded<D: Decode>(&self, url: &str) -> Result<Decoded<D>, FetchError> {
        let bytes = self.source.request(url).await?;
        let decoded = Decoded::from_bytes(&bytes);
        debug!(url, bytes = bytes.len(), decoded = decoded.is_value(), "payload fetched");
        Ok(decoded)
    }

    /// Fetches `url` and deserializes the JSON payload into `T`.
    ///
    /// Malformed or mismatched JSON is logged and yields `Ok(None)`.
    pub async fn fetch_model_object<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<Option<T>, FetchError> {
        let decoded = self.fetch_decoded::<Json<T>>(url).await?;
        Ok(decoded.map(Json::into_inner).into_option())
    }

    /// Fetches `url` and inspects the payload as an [`Image`].
    ///
    /// Bytes that are not a recognizable image are logged and yield `Ok(None)`.
    pub async fn fetch_image(&self, url: &str) -> Result<Option<Image>, FetchError> {
        let decoded = self.fetch_decoded::<Image>(url).await?;
        Ok(decoded.into_option())
    }
}

impl<F: Fetch + Clone + 'static> ModelFetcher<F> {
    /// [`fetch_model_object`](Self::fetch_model_object) on a Tokio task, with
    /// `completion` posted to `queue`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn fetch_model_object_on<T, C>(&self, url: &str, queue: &MainQueue, completion: C)
    where
        T: DeserializeOwned + Send + 'static,
        C: FnOnce(Result<Option<T>, FetchError>) + Send + 'static,
    {
        let fetcher = self.clone();
        let queue = queue.clone();
        let url = url.to_owned();

        tokio::spawn(async move {
            let result = fetcher.fetch_model_object::<T>(&url).await;
            queue.post(move || completion(result));
        });
    }

    /// [`fetch_image`](Self::fetch_image) on a Tokio task, with `completion`
    /// posted to `queue`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn fetch_image_on<C>(&self, url: &str, queue: &MainQueue, completion: C)
    where
        C: FnOnce(Result<Option<Image>, FetchError>) + Send + 'static,
    {
        let fetcher = self.clone();
        let queue = queue.clone();
        let url = url.to_owned();

        tokio::spawn(async move {
            let result = fetcher.fetch_image(&url).await;
            queue.post(move || completion(result));
        });
    }
}
