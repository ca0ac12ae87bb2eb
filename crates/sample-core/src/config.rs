//! Tracker configuration
//!
//! Defaults, an optional TOML file and `SAMPLE_*` environment variables,
//! applied in that order.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default analytics endpoint
pub const DEFAULT_ENDPOINT: &str = "http://events.psiori.com/sample/v01/event";

/// Default charset
pub const DEFAULT_CHARSET: &str = "utf-8";

/// Environment variable overriding the config file location
pub const ENV_CONFIG_PATH: &str = "SAMPLE_CONFIG";

/// Environment variable for the app token
pub const ENV_APP_TOKEN: &str = "SAMPLE_APP_TOKEN";

/// Environment variable for the endpoint URL
pub const ENV_ENDPOINT: &str = "SAMPLE_ENDPOINT";

/// Environment variable for the request timeout in milliseconds
pub const ENV_REQUEST_TIMEOUT_MS: &str = "SAMPLE_REQUEST_TIMEOUT_MS";

/// Environment variable for the server-side flag
pub const ENV_SERVER_SIDE: &str = "SAMPLE_SERVER_SIDE";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "sample.toml";

/// Sample data directory name
pub const SAMPLE_DIR_NAME: &str = ".sample";

/// Tracker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// App token attached to every event
    #[serde(default)]
    pub app_token: Option<String>,

    /// Analytics endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Whether events are reported as server-side (default: true)
    #[serde(default = "default_server_side")]
    pub server_side: bool,

    /// Request timeout in milliseconds, 0 means the transport default
    #[serde(default)]
    pub request_timeout_ms: u64,

    /// Charset of the hosting application
    #[serde(default = "default_charset")]
    pub charset: String,

    /// Fallback values used when a call does not supply its own
    #[serde(default)]
    pub profile: TrackerProfile,
}

/// Tracker-level defaults for optional event fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerProfile {
    /// Client platform
    pub platform: Option<String>,
    /// Client name
    pub client: Option<String>,
    /// Client version
    pub client_version: Option<String>,
    /// User locale, also used for `Accept-Language`
    pub locale: Option<String>,
    /// User email
    pub email: Option<String>,
    /// User country
    pub country_code: Option<String>,
    /// Ad network that referred the user
    pub ad_referer: Option<String>,
    /// Ad campaign
    pub ad_campaign: Option<String>,
    /// Ad placement
    pub ad_placement: Option<String>,
    /// Geo longitude
    pub longitude: Option<f64>,
    /// Geo latitude
    pub latitude: Option<f64>,
    /// Facebook user id
    pub facebook_id: Option<String>,
    /// Host events are sent from
    pub host: Option<String>,
    /// Default module
    pub module: Option<String>,
    /// Sent as the `debug` field
    pub debug_mode: Option<bool>,
}

/// Returns the default analytics endpoint.
pub fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

/// Returns the default server-side flag.
pub fn default_server_side() -> bool {
    true
}

/// Returns the default charset.
pub fn default_charset() -> String {
    DEFAULT_CHARSET.to_string()
}

/// Clamp a caller-supplied timeout: negative values become 0.
pub fn normalize_timeout_ms(timeout_ms: i64) -> u64 {
    u64::try_from(timeout_ms).unwrap_or(0)
}

/// Parse a textual timeout; anything that is not a non-negative integer becomes 0.
pub fn parse_timeout_ms(raw: &str) -> u64 {
    raw.trim()
        .parse::<i64>()
        .map(normalize_timeout_ms)
        .unwrap_or(0)
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            app_token: None,
            endpoint: default_endpoint(),
            server_side: default_server_side(),
            request_timeout_ms: 0,
            charset: default_charset(),
            profile: TrackerProfile::default(),
        }
    }
}

impl TrackerConfig {
    /// Load from config file (if present) and apply environment overrides
    pub fn load() -> Self {
        let config_path = Self::config_path();

        let mut config = if config_path.exists() {
            match Self::load_from_file(&config_path) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Failed to load tracker config {}: {}", config_path.display(), e);
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Load config from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| Error::InvalidConfig {
            field: path.display().to_string(),
            message: e.to_string(),
        })?;
        debug!("Loaded tracker config from {}", path.display());
        Ok(config)
    }

    /// Apply `SAMPLE_*` overrides read through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(ENV_APP_TOKEN).filter(|v| !v.is_empty()) {
            self.app_token = Some(token);
        }
        if let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|v| !v.is_empty()) {
            self.endpoint = endpoint;
        }
        if let Some(timeout) = lookup(ENV_REQUEST_TIMEOUT_MS) {
            self.request_timeout_ms = parse_timeout_ms(&timeout);
        }
        if let Some(flag) = lookup(ENV_SERVER_SIDE) {
            self.server_side = !matches!(flag.to_lowercase().as_str(), "false" | "0");
        }
    }

    /// Get config file path
    fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(ENV_CONFIG_PATH) {
            return PathBuf::from(path);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(SAMPLE_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }
}
