//! Reqwest-backed transport

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::{OutboundRequest, Transport};
use crate::error::{Error, Result};

/// Primary transport backed by a shared `reqwest::Client`.
#[derive(Clone)]
pub struct HttpClientTransport {
    client: Option<Client>,
}

impl Default for HttpClientTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClientTransport {
    /// Build with a default client; unavailable if the client cannot be built
    pub fn new() -> Self {
        let client = match Client::builder().build() {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("HTTP client unavailable: {}", e);
                None
            }
        };
        Self { client }
    }

    /// Use an existing client
    pub fn with_client(client: Client) -> Self {
        Self {
            client: Some(client),
        }
    }
}

#[async_trait]
impl Transport for HttpClientTransport {
    fn name(&self) -> &str {
        "http-client"
    }

    fn is_available(&self) -> bool {
        self.client.is_some()
    }

    async fn send(&self, request: &OutboundRequest) -> Result<String> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| Error::Network("http client unavailable".to_string()))?;

        let mut builder = match &request.body {
            Some(body) => client.post(&request.url).body(body.clone()),
            None => client.get(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout(request.timeout_ms())
            } else {
                Error::from(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            debug!("Endpoint answered HTTP {}", status);
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout(request.timeout_ms())
            } else {
                Error::MalformedResponse(e.to_string())
            }
        })
    }
}
