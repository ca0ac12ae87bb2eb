//! Bare HTTP/1.0 over a TCP stream
//!
//! Only plain `http://` endpoints. HTTP/1.0 keeps the response unchunked and
//! lets the server close the connection, so the body is everything after the
//! header block.

use async_trait::async_trait;
use reqwest::Url;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::{OutboundRequest, Transport};
use crate::error::{Error, Result};

const HEADER_END: &str = "\r\n\r\n";

/// Largest response read before the rest is discarded
const MAX_RESPONSE_BYTES: u64 = 1024 * 1024;

/// Secondary transport with no dependency beyond tokio networking.
#[derive(Debug, Clone, Default)]
pub struct MinimalHttpTransport;

impl MinimalHttpTransport {
    /// Create the transport
    pub fn new() -> Self {
        Self
    }

    async fn exchange(&self, url: &Url, request: &OutboundRequest) -> Result<String> {
        let host = url
            .host_str()
            .ok_or_else(|| Error::InvalidEndpoint(request.url.clone()))?;
        let port = url.port_or_known_default().unwrap_or(80);
        // IPv6 literals keep their brackets in the URL but not in a socket address
        let address = host.trim_start_matches('[').trim_end_matches(']');

        let mut stream = TcpStream::connect((address, port))
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        stream
            .write_all(render_request(url, host, request).as_bytes())
            .await?;
        stream.flush().await?;

        let mut raw = Vec::new();
        (&mut stream)
            .take(MAX_RESPONSE_BYTES)
            .read_to_end(&mut raw)
            .await?;

        parse_response(&String::from_utf8_lossy(&raw))
    }
}

#[async_trait]
impl Transport for MinimalHttpTransport {
    fn name(&self) -> &str {
        "minimal-http"
    }

    async fn send(&self, request: &OutboundRequest) -> Result<String> {
        let url = Url::parse(&request.url)
            .map_err(|e| Error::InvalidEndpoint(format!("{}: {}", request.url, e)))?;
        if url.scheme() != "http" {
            return Err(Error::UnsupportedScheme(url.scheme().to_string()));
        }

        match request.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.exchange(&url, request))
                .await
                .map_err(|_| Error::Timeout(request.timeout_ms()))?,
            None => self.exchange(&url, request).await,
        }
    }
}

fn render_request(url: &Url, host: &str, request: &OutboundRequest) -> String {
    let mut target = url.path().to_string();
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }

    let host_header = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    let mut text = format!(
        "{} {} HTTP/1.0\r\nHost: {}\r\n",
        request.method(),
        target,
        host_header
    );
    for (name, value) in &request.headers {
        text.push_str(&format!("{}: {}\r\n", name, value));
    }
    if let Some(body) = &request.body {
        text.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    text.push_str("\r\n");
    if let Some(body) = &request.body {
        text.push_str(body);
    }
    text
}

fn parse_response(raw: &str) -> Result<String> {
    let (head, body) = raw
        .split_once(HEADER_END)
        .ok_or_else(|| Error::MalformedResponse("missing header terminator".to_string()))?;

    let status_line = head.lines().next().unwrap_or_default();
    if !status_line.starts_with("HTTP/") {
        return Err(Error::MalformedResponse(format!(
            "unexpected status line: {}",
            status_line
        )));
    }

    Ok(body.to_string())
}
