//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `UrlState`: the lifecycle of a single URL inside the frontier
//! - `CrawlState`: the lifecycle of a whole crawl run

mod crawl_state;
mod url_state;

// Re-export main types
pub use crawl_state::CrawlState;
pub use url_state::UrlState;
