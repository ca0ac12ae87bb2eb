//! Recording transport for tests

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::{OutboundRequest, Transport};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
enum Reply {
    Body(String),
    Fail,
}

/// Transport that records every request and answers with a canned reply.
#[derive(Debug, Clone)]
pub struct MockTransport {
    reply: Reply,
    available: bool,
    requests: Arc<Mutex<Vec<OutboundRequest>>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::responding("")
    }
}

impl MockTransport {
    /// Answer every request with `body`.
    #[must_use]
    pub fn responding(body: impl Into<String>) -> Self {
        Self {
            reply: Reply::Body(body.into()),
            available: true,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fail every request with a network error.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            reply: Reply::Fail,
            ..Self::default()
        }
    }

    /// Report itself as unavailable.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::default()
        }
    }

    /// Requests seen so far.
    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn send(&self, request: &OutboundRequest) -> Result<String> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        match &self.reply {
            Reply::Body(body) => Ok(body.clone()),
            Reply::Fail => Err(Error::Network("connection refused".to_string())),
        }
    }
}
