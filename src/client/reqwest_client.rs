//! HTTPS-capable transport backed by `reqwest`.

use async_trait::async_trait;
use tracing::debug;

use super::{HttpClient, TransportError};
use crate::config::FetchConfig;
use crate::http::{Request, Response, ResponseError, StatusCode};

/// Real HTTP client using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Builds a client that sends `config.user_agent`.
    ///
    /// # Errors
    ///
    /// Fails if the TLS backend cannot be initialized.
    pub fn from_config(config: &FetchConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }

    /// Wraps an already configured `reqwest::Client`.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, request: &Request) -> Result<Response, TransportError> {
        let reply = self.client.get(request.url().clone()).send().await?;

        let code = reply.status().as_u16();
        let status = StatusCode::from_u16(code).ok_or(ResponseError::InvalidStatus { code })?;

        let mut response = Response::new(status);
        for (name, value) in reply.headers() {
            if let Ok(value) = value.to_str() {
                response = response.header(name.as_str(), value);
            }
        }

        let body = reply.bytes().await?;
        debug!(url = %request.url(), status = code, bytes = body.len(), "response received");
        Ok(response.body(body))
    }
}
