//! Event tracker
//!
//! [`EventTracker::new`] builds a tracker owned by the caller, which is what
//! hosts serving concurrent requests should use, one per request. Hosts that
//! handle a single request per process can use the shared [`instance`].

pub mod client;
pub mod state;

pub use client::EventTracker;
pub use state::{parse_timestamp, TrackerState};

use tracing::info;

// ============================================================================
// Global Instance
// ============================================================================

/// Global tracker instance
static TRACKER: std::sync::OnceLock<EventTracker> = std::sync::OnceLock::new();

/// Get the process-wide tracker, creating it from the environment on first use.
///
/// A non-empty `app_token` replaces the tracker's token; `None` leaves it as is.
pub fn instance(app_token: Option<&str>) -> &'static EventTracker {
    let tracker = TRACKER.get_or_init(|| {
        info!("Creating process-wide event tracker");
        EventTracker::from_environment()
    });
    if let Some(token) = app_token.filter(|t| !t.is_empty()) {
        tracker.set_app_token(token);
    }
    tracker
}

/// Install `tracker` as the process-wide instance.
///
/// Returns `false` if an instance already exists.
pub fn init_tracker(tracker: EventTracker) -> bool {
    TRACKER.set(tracker).is_ok()
}

#[cfg(test)]
mod tests;
