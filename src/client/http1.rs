//! Minimal HTTP/1.1 client over a Tokio `TcpStream`.
//!
//! One request per connection: the request head asks for `Connection: close`,
//! then the response is read until its head parses and its body is complete.

use async_trait::async_trait;
use bytes::{Buf, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use super::{HttpClient, TransportError};
use crate::config::{DEFAULT_MAX_RESPONSE_BYTES, DEFAULT_USER_AGENT, FetchConfig};
use crate::http::response::decode_chunked;
use crate::http::{Request, Response, ResponseError};

/// Initial read buffer capacity per connection.
const INITIAL_BUF_SIZE: usize = 4096;

/// Plain-text HTTP/1.1 transport.
///
/// Only `http://` URLs are supported; anything else fails with
/// [`TransportError::UnsupportedScheme`].
#[derive(Debug, Clone)]
pub struct Http1Client {
    user_agent: String,
    max_response_bytes: usize,
}

impl Http1Client {
    pub fn new() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }

    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_response_bytes: config.max_response_bytes,
        }
    }

    fn check_size(&self, len: usize) -> Result<(), TransportError> {
        if len > self.max_response_bytes {
            return Err(TransportError::ResponseTooLarge {
                max_bytes: self.max_response_bytes,
            });
        }
        Ok(())
    }

    /// Reads from `stream` into `buf`, failing once the size cap is passed.
    /// Returns the number of bytes read (0 at EOF).
    async fn fill(&self, stream: &mut TcpStream, buf: &mut BytesMut) -> Result<usize, TransportError> {
        let n = stream.read_buf(buf).await?;
        self.check_size(buf.len())?;
        Ok(n)
    }
}

impl Default for Http1Client {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for Http1Client {
    async fn get(&self, request: &Request) -> Result<Response, TransportError> {
        let url = request.url();
        if url.scheme() != "http" {
            return Err(TransportError::UnsupportedScheme {
                scheme: url.scheme().to_owned(),
            });
        }
        let host = url.host_str().ok_or(TransportError::MissingHost)?;
        let port = url.port_or_known_default().unwrap_or(80);

        let mut stream = TcpStream::connect((host, port))
            .await
            .map_err(|source| TransportError::Connect {
                addr: format!("{host}:{port}"),
                source,
            })?;
        debug!(host, port, target = %request.target(), "connected, sending request");

        stream
            .write_all(&request.encode_head(&self.user_agent))
            .await?;
        stream.flush().await?;

        let mut buf = BytesMut::with_capacity(INITIAL_BUF_SIZE);

        let (head, body_offset) = loop {
            match Response::parse(&buf) {
                // Interim 1xx responses precede the final one; drop them.
                Ok((head, offset)) if head.status().is_interim() => {
                    debug!(status = head.status().as_u16(), "skipping interim response");
                    buf.advance(offset);
                }
                Ok(pair) => break pair,
                Err(ResponseError::Incomplete) => {
                    if self.fill(&mut stream, &mut buf).await? == 0 {
                        return Err(TransportError::UnexpectedEof);
                    }
                }
                Err(e) => return Err(e.into()),
            }
        };

        let chunked = head.headers().is_chunked();
        let content_length = head.headers().content_length();

        let body = if chunked {
            // Stop at the terminating chunk rather than waiting for EOF.
            loop {
                match decode_chunked(&buf[body_offset..]) {
                    Ok(body) => break body,
                    Err(ResponseError::Incomplete) => {
                        if self.fill(&mut stream, &mut buf).await? == 0 {
                            return Err(TransportError::UnexpectedEof);
                        }
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        } else if let Some(len) = content_length {
            let total_needed = body_offset
                .checked_add(len)
                .ok_or(TransportError::ResponseTooLarge {
                    max_bytes: self.max_response_bytes,
                })?;
            self.check_size(total_needed)?;
            while buf.len() < total_needed {
                if self.fill(&mut stream, &mut buf).await? == 0 {
                    return Err(TransportError::UnexpectedEof);
                }
            }
            buf.truncate(total_needed);
            buf.split_off(body_offset).freeze()
        } else {
            // No length: the server delimits the body by closing the connection.
            while self.fill(&mut stream, &mut buf).await? > 0 {}
            buf.split_off(body_offset).freeze()
        };

        debug!(status = head.status().as_u16(), bytes = body.len(), "response received");
        Ok(head.body(body))
    }
}
