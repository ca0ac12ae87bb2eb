//! Ambient request context
//!
//! A read-only snapshot of the request the hosting application is serving.
//! CGI-style hosts can capture it from the process environment with
//! [`RequestContext::from_cgi_env`]; other hosts fill the struct directly.

use serde::{Deserialize, Serialize};

/// Host used when the request carried no `Host` header
pub const UNKNOWN_HOST: &str = "unknown";

/// Request data captured once when a tracker is created.
///
/// Empty strings are treated the same as missing values everywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// `Referer` header
    pub referer: Option<String>,
    /// Client address
    pub remote_addr: Option<String>,
    /// `User-Agent` header
    pub user_agent: Option<String>,
    /// `Accept-Language` header
    pub accept_language: Option<String>,
    /// HTTPS indicator, `"on"` when the request came in over TLS
    pub https: Option<String>,
    /// `Host` header
    pub host: Option<String>,
    /// Extra path information after the script name
    pub path_info: Option<String>,
    /// Raw request URI, possibly with a query string
    pub request_uri: Option<String>,
    /// Path of the executing script
    pub script_name: Option<String>,
    /// Raw query string without the leading `?`
    pub query_string: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl RequestContext {
    /// Capture the context from CGI/1.1 meta-variables in the process environment
    pub fn from_cgi_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Capture the context from CGI meta-variables read through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        Self {
            referer: get("HTTP_REFERER"),
            remote_addr: get("REMOTE_ADDR"),
            user_agent: get("HTTP_USER_AGENT"),
            accept_language: get("HTTP_ACCEPT_LANGUAGE"),
            https: get("HTTPS"),
            host: get("HTTP_HOST"),
            path_info: get("PATH_INFO"),
            request_uri: get("REQUEST_URI"),
            script_name: get("SCRIPT_NAME"),
            query_string: get("QUERY_STRING"),
        }
    }

    /// `https` when the HTTPS indicator is exactly `on`, else `http`
    pub fn scheme(&self) -> &'static str {
        match non_empty(&self.https) {
            Some("on") => "https",
            _ => "http",
        }
    }

    /// Host header, or `unknown`
    pub fn host(&self) -> &str {
        non_empty(&self.host).unwrap_or(UNKNOWN_HOST)
    }

    /// Request path, always starting with `/`
    ///
    /// Prefers the path info, then the request URI without its query string,
    /// then the script name.
    pub fn path(&self) -> String {
        let path = non_empty(&self.path_info)
            .or_else(|| {
                non_empty(&self.request_uri)
                    .map(|uri| uri.split_once('?').map_or(uri, |(path, _)| path))
                    .filter(|path| !path.is_empty())
            })
            .or_else(|| non_empty(&self.script_name))
            .unwrap_or_default();

        if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        }
    }

    /// Query string with a leading `?`, or empty
    pub fn query(&self) -> String {
        non_empty(&self.query_string)
            .map(|q| format!("?{}", q))
            .unwrap_or_default()
    }

    /// Reconstructed URL of the current request
    pub fn current_url(&self) -> String {
        format!(
            "{}://{}{}{}",
            self.scheme(),
            self.host(),
            self.path(),
            self.query()
        )
    }
}
