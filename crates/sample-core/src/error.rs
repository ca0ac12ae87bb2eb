//! Error types for sample-core
//!
//! The tracking API itself never returns these; they surface from the
//! transport seam and from the fallible constructors (config files,
//! free-form parameter maps).

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Network/connection error
    #[error("network error: {0}")]
    Network(String),

    /// Request did not complete within the configured timeout
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Endpoint could not be parsed as a URL
    #[error("invalid endpoint url: {0}")]
    InvalidEndpoint(String),

    /// Endpoint scheme the transport cannot speak
    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),

    /// Response could not be parsed as HTTP
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Endpoint answered with a non-success status
    #[error("HTTP {status}")]
    HttpStatus {
        /// Status code returned by the endpoint
        status: u16,
    },

    /// Every transport in a fallback chain failed
    #[error("all transports failed")]
    AllTransportsFailed,

    /// Invalid configuration
    #[error("invalid configuration: {field}: {message}")]
    InvalidConfig {
        /// Config field name
        field: String,
        /// Detailed message
        message: String,
    },

    /// Free-form event parameters did not match the recognized fields
    #[error("invalid event parameters: {0}")]
    InvalidParams(String),

    /// JSON serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            Error::HttpStatus {
                status: status.as_u16(),
            }
        } else {
            Error::Network(e.to_string())
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
