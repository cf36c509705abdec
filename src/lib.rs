//! # cachefetch
//!
//! A cache-first async HTTP fetch helper: GET a URL, reuse a stored response
//! when there is one, and optionally decode the payload as JSON or an image.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cachefetch::config::FetchConfig;
//! use cachefetch::fetch::FetchService;
//! use cachefetch::fetcher::ModelFetcher;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = FetchService::from_config(&FetchConfig::default())?;
//!     let fetcher = ModelFetcher::new(service);
//!
//!     let value: Option<serde_json::Value> = fetcher
//!         .fetch_model_object("https://api.example.com/item/1")
//!         .await?;
//!     println!("{value:?}");
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod fetch;
pub mod fetcher;
pub mod http;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use cache::{CacheStore, CachedResponse, MemoryCache};
pub use client::{Http1Client, HttpClient, TransportError};
pub use config::{CacheConfig, FetchConfig};
pub use dispatch::{MainLoop, MainQueue, main_queue};
pub use fetch::{Fetch, FetchError, FetchService};
pub use fetcher::{Decoded, Image, ModelFetcher};
pub use http::{Headers, Request, Response, StatusCode};
