//! Outbound HTTP transports
//!
//! The tracker talks to the endpoint through an injected [`Transport`].
//! [`default_transport`] composes the reqwest client with a bare TCP
//! fallback that is used when the client cannot be built.

pub mod fallback;
pub mod http_client;
pub mod minimal;
pub mod mock;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;

pub use fallback::FallbackTransport;
pub use http_client::HttpClientTransport;
pub use minimal::MinimalHttpTransport;
pub use mock::MockTransport;

/// One request to the analytics endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    /// Target URL
    pub url: String,
    /// Header name/value pairs, in sending order
    pub headers: Vec<(String, String)>,
    /// JSON body; its presence makes the request a POST
    pub body: Option<String>,
    /// Upper bound for the whole exchange, `None` for the transport default
    pub timeout: Option<Duration>,
}

impl OutboundRequest {
    /// `POST` when a body is present, `GET` otherwise
    pub fn method(&self) -> &'static str {
        if self.body.is_some() {
            "POST"
        } else {
            "GET"
        }
    }

    /// First header with `name`, compared case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub(crate) fn timeout_ms(&self) -> u64 {
        self.timeout
            .map(|t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0)
    }
}

/// Delivers a request and returns the response body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Whether the transport can be used in this process
    fn is_available(&self) -> bool {
        true
    }

    /// Send the request and return the response body
    async fn send(&self, request: &OutboundRequest) -> Result<String>;
}

/// Reqwest client first, bare HTTP/1.0 when the client is unavailable
pub fn default_transport() -> Arc<dyn Transport> {
    Arc::new(FallbackTransport::new(
        HttpClientTransport::new(),
        MinimalHttpTransport::new(),
    ))
}
