//! Configuration module for Outlink
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A config file is optional: `Config::default()` is a complete, valid setup.
//!
//! # Example
//!
//! ```no_run
//! use outlink::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("outlink.toml")).unwrap();
//! println!("Crawler will use {} workers", config.crawler.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CanonicalConfig, Config, CrawlerConfig, OutputConfig, ReportFormat, RetryPolicy,
    UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::{validate, validate_seed};
