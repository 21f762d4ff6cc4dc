//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings and timeouts
//! - GET requests to fetch page content
//! - Error classification (transport failures vs. HTTP error statuses)

use crate::config::Config;
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Why a request never produced a usable response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connect or read timeout
    Timeout,
    /// Connection refused, DNS failure, TLS failure
    Connect,
    /// The URL could not be turned into a request
    InvalidUrl,
    /// Redirect loop or too many redirects
    Redirect,
    /// The response body could not be read
    Body,
    /// Anything reqwest does not classify further
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Timeout => "timeout",
            Self::Connect => "connection failed",
            Self::InvalidUrl => "invalid URL",
            Self::Redirect => "redirect error",
            Self::Body => "body read failed",
            Self::Other => "request failed",
        };
        f.write_str(name)
    }
}

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched an HTML page
    Success {
        /// Final URL after redirects
        final_url: Url,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// Fetched fine, but the body is not HTML
    NotHtml {
        final_url: Url,
        status_code: u16,
        content_type: String,
    },

    /// The server answered with a non-success status
    HttpError {
        status_code: u16,
    },

    /// No usable response (connection refused, timeout, bad URL, ...)
    TransportError {
        kind: TransportErrorKind,
        error: String,
    },
}

impl FetchResult {
    /// Returns the broken-link reason, or None if the fetch succeeded
    pub fn broken_reason(&self) -> Option<String> {
        match self {
            Self::Success { .. } | Self::NotHtml { .. } => None,
            Self::HttpError { status_code } => Some(format!("HTTP {}", status_code)),
            Self::TransportError { kind, error } => Some(format!("{}: {}", kind, error)),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use outlink::config::Config;
/// use outlink::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .connect_timeout(Duration::from_secs(config.crawler.connect_timeout_secs))
        .timeout(Duration::from_secs(config.crawler.read_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the outcome
///
/// # Outcome Table
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx, HTML (or no Content-Type) | Success |
/// | 2xx, other Content-Type | NotHtml |
/// | any other final status | HttpError |
/// | timeout | TransportError(Timeout) |
/// | connection refused / DNS / TLS | TransportError(Connect) |
/// | bad URL / unsupported scheme | TransportError(InvalidUrl) |
/// | redirect loop / limit | TransportError(Redirect) |
pub async fn fetch_url(client: &Client, url: &Url) -> FetchResult {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(&e),
    };

    let status = response.status();
    let final_url = response.url().clone();

    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_html(&content_type) {
        return FetchResult::NotHtml {
            final_url,
            status_code: status.as_u16(),
            content_type,
        };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            body,
        },
        Err(e) => FetchResult::TransportError {
            kind: if e.is_timeout() {
                TransportErrorKind::Timeout
            } else {
                TransportErrorKind::Body
            },
            error: e.to_string(),
        },
    }
}

/// Missing Content-Type is treated as HTML and left to the parser
fn is_html(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.is_empty()
        || content_type.contains("text/html")
        || content_type.contains("application/xhtml")
}

fn classify_error(e: &reqwest::Error) -> FetchResult {
    let kind = if e.is_timeout() {
        TransportErrorKind::Timeout
    } else if e.is_connect() {
        TransportErrorKind::Connect
    } else if e.is_builder() {
        TransportErrorKind::InvalidUrl
    } else if e.is_redirect() {
        TransportErrorKind::Redirect
    } else if e.is_body() || e.is_decode() {
        TransportErrorKind::Body
    } else {
        TransportErrorKind::Other
    };

    FetchResult::TransportError {
        kind,
        error: e.to_string(),
    }
}
