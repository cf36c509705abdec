//! Outgoing GET requests and their cache identity.

use bytes::{BufMut, BytesMut};
use thiserror::Error;
use url::Url;

/// The input string could not be parsed as an absolute URL.
#[derive(Debug, Error)]
#[error("invalid URL {input:?}: {source}")]
pub struct InvalidUrl {
    input: String,
    #[source]
    source: url::ParseError,
}

impl InvalidUrl {
    /// Returns the string that failed to parse.
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// A GET request for a single absolute URL.
///
/// There are no per-request headers or bodies: the method is always GET, so
/// the URL alone identifies the request.
///
/// # Examples
///
/// ```
/// use cachefetch::http::Request;
///
/// let request = Request::get("https://api.example.com/item/1?lang=en").unwrap();
///
/// assert_eq!(request.url().host_str(), Some("api.example.com"));
/// assert_eq!(request.target(), "/item/1?lang=en");
/// assert_eq!(request.cache_key(), "GET https://api.example.com/item/1?lang=en");
/// assert!(Request::get("not a url").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    url: Url,
}

impl Request {
    /// Parses `input` into a GET request.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidUrl`] when `input` is not an absolute URL.
    pub fn get(input: &str) -> Result<Self, InvalidUrl> {
        let url = Url::parse(input).map_err(|source| InvalidUrl {
            input: input.to_owned(),
            source,
        })?;
        Ok(Self { url })
    }

    /// Returns the parsed URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Request identity used to index the response cache.
    ///
    /// Built from the normalized URL, so `HTTP://Example.com` and
    /// `http://example.com/` share an entry.
    pub fn cache_key(&self) -> String {
        format!("GET {}", self.url)
    }

    /// The origin-form request target: path plus optional query.
    pub fn target(&self) -> String {
        match self.url.query() {
            Some(query) => format!("{}?{}", self.url.path(), query),
            None => self.url.path().to_owned(),
        }
    }

    /// Value for the `Host` header, including the port only when it is not
    /// the scheme default.
    pub fn host_header(&self) -> Option<String> {
        let host = self.url.host_str()?;
        Some(match self.url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_owned(),
        })
    }

    /// Serializes the request head in HTTP/1.1 wire format.
    ///
    /// Always writes `Connection: close`: one request per connection.
    pub fn encode_head(&self, user_agent: &str) -> BytesMut {
        let target = self.target();
        let host = self.host_header().unwrap_or_default();

        let mut buf = BytesMut::with_capacity(128 + target.len() + user_agent.len());
        buf.put(format!("GET {target} HTTP/1.1\r\n").as_bytes());
        buf.put(format!("Host: {host}\r\n").as_bytes());
        buf.put(format!("User-Agent: {user_agent}\r\n").as_bytes());
        buf.put(&b"Accept: */*\r\n"[..]);
        buf.put(&b"Connection: close\r\n"[..]);
        buf.put(&b"\r\n"[..]);
        buf
    }
}
