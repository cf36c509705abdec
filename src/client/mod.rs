//! Transports that turn a [`Request`] into a [`Response`].
//!
//! [`HttpClient`] is the seam the fetch path talks to. Two implementations
//! ship with the crate:
//!
//! - [`Http1Client`]: plain `http://` over a Tokio `TcpStream`, response
//!   parsed with `httparse`.
//! - `ReqwestClient` (feature `reqwest`, on by default): full HTTPS support.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::http::{Request, Response, ResponseError};

pub mod http1;
#[cfg(feature = "reqwest")]
pub mod reqwest_client;

pub use http1::Http1Client;
#[cfg(feature = "reqwest")]
pub use reqwest_client::ReqwestClient;

/// Network-level failures: nothing was received that could be handed back
/// as a response.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported URL scheme {scheme:?}")]
    UnsupportedScheme { scheme: String },

    #[error("URL has no host")]
    MissingHost,

    #[error("malformed response: {0}")]
    Malformed(#[from] ResponseError),

    #[error("connection closed before the response was complete")]
    UnexpectedEof,

    #[error("response exceeds maximum allowed size of {max_bytes} bytes")]
    ResponseTooLarge { max_bytes: usize },

    #[cfg(feature = "reqwest")]
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Issues a single GET and returns whatever the server answered.
///
/// Non-2xx statuses are responses, not errors: only failures to obtain a
/// response at all are reported as [`TransportError`].
#[async_trait]
pub trait HttpClient: Send + Sync + fmt::Debug {
    async fn get(&self, request: &Request) -> Result<Response, TransportError>;
}
