//! Outlink: a polite outbound-link auditor
//!
//! This crate implements a single-site web crawler that discovers every page
//! reachable from a seed URL, respects robots.txt, and sorts every discovered
//! link into internal, target-external, and non-target-external buckets.
//! Unreachable pages are collected so they can be retried or reported.

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Outlink operations
#[derive(Debug, Error)]
pub enum OutlinkError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("robots.txt unavailable at {url}: {reason}")]
    RobotsUnavailable { url: String, reason: String },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid state transition for {url}: {from} -> {to}")]
    InvalidTransition {
        url: String,
        from: state::UrlState,
        to: state::UrlState,
    },

    #[error("URL not tracked by the frontier: {0}")]
    UnknownUrl(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Not a crawlable reference: {0}")]
    NotCrawlable(String),
}

/// Result type alias for Outlink operations
pub type Result<T> = std::result::Result<T, OutlinkError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, RetryPolicy};
pub use crawler::{crawl, Coordinator, RetryPrompt};
pub use output::CrawlReport;
pub use state::UrlState;
pub use url::{canonicalize, CanonicalUrl, Classifier, LinkKind, TargetHostnames};
