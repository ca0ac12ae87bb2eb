//! The event tracker handle

use chrono::Utc;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::{debug, warn};

use super::state::TrackerState;
use crate::config::{normalize_timeout_ms, parse_timeout_ms, TrackerConfig, TrackerProfile};
use crate::context::RequestContext;
use crate::params::EventParams;
use crate::payload::{build_payload, EventPayload};
use crate::transport::{default_transport, OutboundRequest, Transport};

/// Event tracker
///
/// Holds configuration and the context captured at construction, and sends
/// one request per tracked event. None of the tracking methods report
/// failures; a dropped event is only visible in the logs.
pub struct EventTracker {
    state: RwLock<TrackerState>,
    transport: Arc<dyn Transport>,
}

impl EventTracker {
    /// Create a tracker that sends through `transport`
    pub fn new(
        config: TrackerConfig,
        context: &RequestContext,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            state: RwLock::new(TrackerState::new(config, context)),
            transport,
        }
    }

    /// Create a tracker with the default transport
    pub fn with_defaults(config: TrackerConfig, context: &RequestContext) -> Self {
        Self::new(config, context, default_transport())
    }

    /// Create from the config file, `SAMPLE_*` variables and the CGI environment
    pub fn from_environment() -> Self {
        Self::with_defaults(TrackerConfig::load(), &RequestContext::from_cgi_env())
    }

    fn read(&self) -> RwLockReadGuard<'_, TrackerState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, TrackerState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> TrackerState {
        self.read().clone()
    }

    // Configuration

    /// App token attached to every event
    pub fn app_token(&self) -> Option<String> {
        self.read().config.app_token.clone()
    }

    /// Replace the app token
    pub fn set_app_token(&self, app_token: impl Into<String>) {
        self.write().config.app_token = Some(app_token.into());
    }

    /// Analytics endpoint URL
    pub fn endpoint(&self) -> String {
        self.read().config.endpoint.clone()
    }

    /// Replace the endpoint URL
    pub fn set_endpoint(&self, endpoint: impl Into<String>) {
        self.write().config.endpoint = endpoint.into();
    }

    /// Whether events are reported as server-side
    pub fn server_side(&self) -> bool {
        self.read().config.server_side
    }

    /// Set the server-side flag
    pub fn set_server_side(&self, server_side: bool) {
        self.write().config.server_side = server_side;
    }

    /// Charset of the hosting application
    pub fn charset(&self) -> String {
        self.read().config.charset.clone()
    }

    /// Request timeout in milliseconds, 0 for the transport default
    pub fn request_timeout(&self) -> u64 {
        self.read().config.request_timeout_ms
    }

    /// Set the request timeout; negative values become 0
    pub fn set_request_timeout(&self, timeout_ms: i64) {
        self.write().config.request_timeout_ms = normalize_timeout_ms(timeout_ms);
    }

    /// Set the request timeout from text; anything but a non-negative integer becomes 0
    pub fn set_request_timeout_str(&self, timeout_ms: &str) {
        self.write().config.request_timeout_ms = parse_timeout_ms(timeout_ms);
    }

    /// Tracker-level field defaults
    pub fn profile(&self) -> TrackerProfile {
        self.read().config.profile.clone()
    }

    /// Replace the field defaults
    pub fn set_profile(&self, profile: TrackerProfile) {
        self.write().config.profile = profile;
    }

    // Identity and context

    /// Current user id
    pub fn user_id(&self) -> Option<String> {
        self.read().user_id.clone()
    }

    /// Attach `user_id` to subsequent events
    pub fn set_user_id(&self, user_id: impl Into<String>) {
        self.write().user_id = Some(user_id.into());
    }

    /// Use `timestamp` instead of the wall clock for subsequent events
    pub fn set_forced_timestamp(&self, timestamp: Option<String>) {
        self.write().forced_timestamp = timestamp;
    }

    /// Override the auto-detected client address
    pub fn set_remote_ip(&self, ip: impl Into<String>) {
        self.write().remote_ip = Some(ip.into());
    }

    /// Client address sent with events
    pub fn remote_ip(&self) -> Option<String> {
        self.read().remote_ip.clone()
    }

    /// URL of the page being served
    pub fn page_url(&self) -> String {
        self.read().page_url.clone()
    }

    /// Client user agent
    pub fn user_agent(&self) -> Option<String> {
        self.read().user_agent.clone()
    }

    /// Referring page
    pub fn http_referer(&self) -> Option<String> {
        self.read().http_referer.clone()
    }

    // Tracking

    /// Payload `track` would send for these arguments right now
    pub fn build_payload(
        &self,
        event_name: &str,
        event_category: &str,
        params: &EventParams,
    ) -> EventPayload {
        let now = Utc::now().timestamp();
        build_payload(&self.read(), event_name, event_category, params, now)
    }

    /// Track an event.
    ///
    /// Only recognized fields are sent; custom data goes into the
    /// `parameter1`..`parameter6` slots.
    pub async fn track(&self, event_name: &str, event_category: &str, params: EventParams) {
        let payload = self.build_payload(event_name, event_category, &params);
        let endpoint = self.endpoint();

        debug!(
            event = event_name,
            category = event_category,
            fields = payload.len(),
            "Tracking event"
        );
        self.send_request(&endpoint, Some(&payload)).await;
    }

    /// Track a new user registration
    pub async fn registration(&self, user_id: &str, params: EventParams) {
        if !user_id.is_empty() {
            self.set_user_id(user_id);
        }
        self.track("registration", "account", params).await;
    }

    /// Track a sign-in of an existing user
    pub async fn sign_in(&self, user_id: &str, params: EventParams) {
        if !user_id.is_empty() {
            self.set_user_id(user_id);
        }
        self.track("sign_in", "account", params).await;
    }

    /// Track a change to the current user's account
    pub async fn profile_update(&self, params: EventParams) {
        self.track("update", "account", params).await;
    }

    /// Send `payload` to `url` and return the response body.
    ///
    /// Returns an empty string when the request fails.
    pub async fn send_request(&self, url: &str, payload: Option<&EventPayload>) -> String {
        let request = self.outbound_request(url, payload);

        match self.transport.send(&request).await {
            Ok(body) => {
                debug!(
                    "Sent {} request to {} via {}",
                    request.method(),
                    url,
                    self.transport.name()
                );
                body
            }
            Err(e) => {
                warn!("Failed to send event to {}: {}", url, e);
                String::new()
            }
        }
    }

    /// Request `send_request` would issue
    pub fn outbound_request(&self, url: &str, payload: Option<&EventPayload>) -> OutboundRequest {
        let body = payload
            .filter(|p| !p.is_empty())
            .and_then(|p| match p.to_body() {
                Ok(body) => Some(body),
                Err(e) => {
                    warn!("Failed to serialize payload: {}", e);
                    None
                }
            });

        let state = self.read();
        let mut headers = Vec::new();
        if let Some(language) = state.accept_language() {
            headers.push(("Accept-Language".to_string(), language.to_string()));
        }
        if let Some(agent) = state.user_agent.as_deref().filter(|a| !a.is_empty()) {
            headers.push(("User-Agent".to_string(), agent.to_string()));
        }
        if body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        let timeout = match state.config.request_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };

        OutboundRequest {
            url: url.to_string(),
            headers,
            body,
            timeout,
        }
    }
}
