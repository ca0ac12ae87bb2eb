//! Sample Core - Server-side Event Tracker
//!
//! Sends tracking events to the Sample analytics service:
//! - Context: referrer, URL, user agent and client address of the current request
//! - Params: the fixed set of fields the endpoint recognizes
//! - Payload: merging call parameters with tracker defaults
//! - Transport: one HTTP request per event, failures are logged and dropped
//!
//! ```no_run
//! use sample_core::{EventParams, EventTracker, RequestContext, TrackerConfig};
//!
//! # async fn run() {
//! let config = TrackerConfig {
//!     app_token: Some("my-app-token".to_string()),
//!     ..Default::default()
//! };
//! let tracker = EventTracker::with_defaults(config, &RequestContext::from_cgi_env());
//!
//! tracker.track("session_start", "session", EventParams::default()).await;
//! tracker
//!     .track(
//!         "found_item",
//!         "custom",
//!         EventParams::default().parameter(1, "Black Stab").parameter(2, 21),
//!     )
//!     .await;
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod context;
pub mod error;
pub mod params;
pub mod payload;
pub mod tracker;
pub mod transport;

pub use config::{TrackerConfig, TrackerProfile};
pub use context::RequestContext;
pub use error::{Error, Result};
pub use params::EventParams;
pub use payload::{build_payload, EventPayload};
pub use tracker::{init_tracker, instance, EventTracker, TrackerState};
pub use transport::{
    default_transport, FallbackTransport, HttpClientTransport, MinimalHttpTransport,
    MockTransport, OutboundRequest, Transport,
};
