//! HTTP/1.1 responses: parsing of the response head with [`httparse`], and
//! decoding of chunked bodies.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

use super::{Headers, StatusCode};

/// Errors that can occur while parsing an HTTP/1.1 response.
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("response is incomplete, more data needed")]
    Incomplete,

    #[error("HTTP parse error: {0}")]
    Parse(#[from] httparse::Error),

    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("status code {code} is out of range")]
    InvalidStatus { code: u16 },

    #[error("invalid chunk size in chunked body")]
    InvalidChunk,
}

/// A received HTTP response: status, headers, and the complete body.
///
/// Built either by [`Response::parse`] from raw bytes read off a socket, or
/// with the builder methods by transports that already did the parsing.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use cachefetch::http::{Response, StatusCode};
///
/// let raw = b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 2\r\n\r\n{}";
/// let (head, offset) = Response::parse(raw).unwrap();
/// let response = head.body(Bytes::copy_from_slice(&raw[offset..]));
///
/// assert_eq!(response.status(), StatusCode::OK);
/// assert_eq!(response.headers().get("content-type"), Some("application/json"));
/// assert_eq!(&response.body_bytes()[..], b"{}");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    headers: Headers,
    body: Bytes,
}

impl Response {
    /// Maximum number of headers we accept per response.
    const MAX_HEADERS: usize = 64;

    /// Creates a response with the given status and an empty body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }

    /// Parses the status line and headers from `buf`.
    ///
    /// Returns the response (with an empty body) and the byte offset at which
    /// the body begins in `buf`.
    ///
    /// # Errors
    ///
    /// - [`ResponseError::Incomplete`]: the header terminator has not been received yet.
    /// - [`ResponseError::Parse`]: the data is not an HTTP/1.x response.
    /// - [`ResponseError::MissingField`] / [`ResponseError::InvalidStatus`]: no usable status code.
    pub fn parse(buf: &[u8]) -> Result<(Self, usize), ResponseError> {
        let mut headers = [httparse::EMPTY_HEADER; Self::MAX_HEADERS];
        let mut raw = httparse::Response::new(&mut headers);

        let body_offset = match raw.parse(buf)? {
            httparse::Status::Complete(offset) => offset,
            httparse::Status::Partial => return Err(ResponseError::Incomplete),
        };

        let code = raw
            .code
            .ok_or(ResponseError::MissingField { field: "status" })?;
        let status = StatusCode::from_u16(code).ok_or(ResponseError::InvalidStatus { code })?;

        let mut header_map = Headers::with_capacity(raw.headers.len());
        for header in raw.headers.iter() {
            if let Ok(value) = std::str::from_utf8(header.value) {
                header_map.insert(header.name, value);
            }
        }

        Ok((
            Self {
                status,
                headers: header_map,
                body: Bytes::new(),
            },
            body_offset,
        ))
    }

    /// Appends a header. Multiple calls with the same name are additive.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the response headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the body bytes.
    pub fn body_bytes(&self) -> &Bytes {
        &self.body
    }

    /// Consumes the response and returns its body.
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Approximate memory footprint of the response.
    pub fn byte_size(&self) -> usize {
        self.body.len() + self.headers.byte_size()
    }
}

/// Decodes a complete `Transfer-Encoding: chunked` body.
///
/// `buf` must contain the whole chunked stream, up to and including the
/// terminating zero-size chunk. Trailer fields are ignored.
///
/// # Errors
///
/// [`ResponseError::Incomplete`] if the stream ends early,
/// [`ResponseError::InvalidChunk`] if a chunk-size line is malformed.
pub fn decode_chunked(buf: &[u8]) -> Result<Bytes, ResponseError> {
    let mut out = BytesMut::with_capacity(buf.len());
    let mut pos = 0;

    loop {
        let (consumed, size) = match httparse::parse_chunk_size(&buf[pos..]) {
            Ok(httparse::Status::Complete(pair)) => pair,
            Ok(httparse::Status::Partial) => return Err(ResponseError::Incomplete),
            Err(_) => return Err(ResponseError::InvalidChunk),
        };
        pos += consumed;

        if size == 0 {
            return Ok(out.freeze());
        }

        let size = usize::try_from(size).map_err(|_| ResponseError::InvalidChunk)?;
        let end = pos.checked_add(size).ok_or(ResponseError::InvalidChunk)?;
        // Chunk data is followed by CRLF.
        if buf.len() < end.saturating_add(2) {
            return Err(ResponseError::Incomplete);
        }
        out.put(&buf[pos..end]);
        pos = end + 2;
    }
}
