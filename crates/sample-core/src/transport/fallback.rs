//! Primary/secondary transport chain

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{OutboundRequest, Transport};
use crate::error::{Error, Result};

/// Uses the primary transport when it is available, the secondary otherwise.
///
/// With `fallback_on_error` the secondary is also tried when the primary
/// fails.
#[derive(Clone)]
pub struct FallbackTransport {
    primary: Arc<dyn Transport>,
    secondary: Arc<dyn Transport>,
    fallback_on_error: bool,
}

impl FallbackTransport {
    /// Chain two transports
    pub fn new<P, S>(primary: P, secondary: S) -> Self
    where
        P: Transport + 'static,
        S: Transport + 'static,
    {
        Self::from_shared(Arc::new(primary), Arc::new(secondary))
    }

    /// Chain two already shared transports
    pub fn from_shared(primary: Arc<dyn Transport>, secondary: Arc<dyn Transport>) -> Self {
        Self {
            primary,
            secondary,
            fallback_on_error: false,
        }
    }

    /// Also try the secondary when the primary fails
    pub fn with_fallback_on_error(mut self, enabled: bool) -> Self {
        self.fallback_on_error = enabled;
        self
    }
}

#[async_trait]
impl Transport for FallbackTransport {
    fn name(&self) -> &str {
        "fallback"
    }

    fn is_available(&self) -> bool {
        self.primary.is_available() || self.secondary.is_available()
    }

    async fn send(&self, request: &OutboundRequest) -> Result<String> {
        if self.primary.is_available() {
            match self.primary.send(request).await {
                Ok(body) => return Ok(body),
                Err(e) if self.fallback_on_error => {
                    warn!(
                        "Transport {} failed: {}, trying {}",
                        self.primary.name(),
                        e,
                        self.secondary.name()
                    );
                }
                Err(e) => return Err(e),
            }
        } else {
            debug!(
                "Transport {} unavailable, using {}",
                self.primary.name(),
                self.secondary.name()
            );
        }

        if !self.secondary.is_available() {
            return Err(Error::AllTransportsFailed);
        }

        self.secondary.send(request).await.map_err(|e| {
            warn!("Transport {} failed: {}", self.secondary.name(), e);
            Error::AllTransportsFailed
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    fn request() -> OutboundRequest {
        OutboundRequest {
            url: "http://localhost/event".to_string(),
            headers: Vec::new(),
            body: Some("{}".to_string()),
            timeout: None,
        }
    }

    #[tokio::test]
    async fn test_primary_used_when_available() {
        let primary = Arc::new(MockTransport::responding("primary"));
        let secondary = Arc::new(MockTransport::responding("secondary"));
        let transport = FallbackTransport::from_shared(primary.clone(), secondary.clone());

        assert_eq!(transport.send(&request()).await.unwrap(), "primary");
        assert_eq!(primary.requests().len(), 1);
        assert!(secondary.requests().is_empty());
    }

    #[tokio::test]
    async fn test_secondary_used_when_primary_unavailable() {
        let primary = Arc::new(MockTransport::unavailable());
        let secondary = Arc::new(MockTransport::responding("secondary"));
        let transport = FallbackTransport::from_shared(primary.clone(), secondary.clone());

        assert_eq!(transport.send(&request()).await.unwrap(), "secondary");
        assert!(primary.requests().is_empty());
        assert_eq!(secondary.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_primary_error_is_returned_without_fallback() {
        let primary = Arc::new(MockTransport::failing());
        let secondary = Arc::new(MockTransport::responding("secondary"));
        let transport = FallbackTransport::from_shared(primary, secondary.clone());

        assert!(matches!(
            transport.send(&request()).await,
            Err(Error::Network(_))
        ));
        assert!(secondary.requests().is_empty());
    }

    #[tokio::test]
    async fn test_fallback_on_error() {
        let primary = Arc::new(MockTransport::failing());
        let secondary = Arc::new(MockTransport::responding("secondary"));
        let transport =
            FallbackTransport::from_shared(primary, secondary.clone()).with_fallback_on_error(true);

        assert_eq!(transport.send(&request()).await.unwrap(), "secondary");
        assert_eq!(secondary.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_nothing_available() {
        let transport =
            FallbackTransport::new(MockTransport::unavailable(), MockTransport::unavailable());

        assert!(!transport.is_available());
        assert!(matches!(
            transport.send(&request()).await,
            Err(Error::AllTransportsFailed)
        ));
    }
}
