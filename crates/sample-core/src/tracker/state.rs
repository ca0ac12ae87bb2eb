//! Tracker state read by the payload merge

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::config::TrackerConfig;
use crate::context::RequestContext;

/// Everything the payload merge reads from the tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerState {
    /// Active configuration
    pub config: TrackerConfig,
    /// Current user, set by registration and sign-in
    pub user_id: Option<String>,
    /// Overrides the wall clock for event timestamps
    pub forced_timestamp: Option<String>,
    /// URL of the page being served
    pub page_url: String,
    /// Client address
    pub remote_ip: Option<String>,
    /// Client user agent
    pub user_agent: Option<String>,
    /// Referring page
    pub http_referer: Option<String>,
    /// Client `Accept-Language` header
    pub accept_language: Option<String>,
}

impl Default for TrackerState {
    fn default() -> Self {
        Self::new(TrackerConfig::default(), &RequestContext::default())
    }
}

impl TrackerState {
    /// Snapshot `context` into a fresh state
    pub fn new(config: TrackerConfig, context: &RequestContext) -> Self {
        Self {
            config,
            user_id: None,
            forced_timestamp: None,
            page_url: context.current_url(),
            remote_ip: context.remote_addr.clone(),
            user_agent: context.user_agent.clone(),
            http_referer: context.referer.clone(),
            accept_language: context.accept_language.clone(),
        }
    }

    /// Epoch seconds for the next event: the forced timestamp if it parses, else `now`
    pub fn event_timestamp(&self, now: i64) -> i64 {
        match self.forced_timestamp.as_deref().filter(|t| !t.is_empty()) {
            Some(raw) => parse_timestamp(raw).unwrap_or_else(|| {
                warn!("Ignoring unparsable forced timestamp: {}", raw);
                now
            }),
            None => now,
        }
    }

    /// Value for the `Accept-Language` header: captured header, else profile locale
    pub fn accept_language(&self) -> Option<&str> {
        self.accept_language
            .as_deref()
            .or(self.config.profile.locale.as_deref())
            .filter(|v| !v.is_empty())
    }
}

/// Parse a date/time string to epoch seconds.
///
/// Accepts `@<seconds>` or bare seconds, RFC 3339, `YYYY-MM-DD HH:MM:SS`
/// and `YYYY-MM-DD`. Values without an offset are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<i64> {
    let raw = raw.trim();

    if let Ok(secs) = raw.strip_prefix('@').unwrap_or(raw).parse::<i64>() {
        return Some(secs);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.and_utc().timestamp());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
}
