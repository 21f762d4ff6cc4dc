//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with timeouts and error classification
//! - HTML parsing and link reference extraction
//! - The shared frontier and the fixed-size worker pool
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
pub mod frontier;
mod parser;
mod pool;

pub use coordinator::{Coordinator, RetryPrompt, ShutdownHandle};
pub use fetcher::{build_http_client, fetch_url, FetchResult, TransportErrorKind};
pub use frontier::{Frontier, FrontierCounts, FrontierError, FrontierSnapshot};
pub use parser::{parse_html, ParsedPage};
pub use pool::{fetch_and_parse, PageOutcome, PageResult, WorkerPool, WorkerSlot};

use crate::config::Config;
use crate::output::CrawlReport;
use crate::url::TargetHostnames;
use crate::OutlinkError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the seed and fetch robots.txt
/// 2. Crawl every reachable internal page with the worker pool
/// 3. Classify every discovered link
/// 4. Apply the configured retry policy when the frontier drains
/// 5. Return the assembled report
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `seed` - Absolute http(s) URL the crawl starts from
/// * `targets` - Hostname substrings that mark an external link as a target
/// * `prompt` - Consulted when the retry policy is `prompt`
///
/// # Example
///
/// ```no_run
/// use outlink::config::Config;
/// use outlink::crawler::crawl;
/// use outlink::url::TargetHostnames;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let targets = TargetHostnames::new(["partner.com"]);
/// let report = crawl(Config::default(), "https://example.com/", targets, None).await?;
/// println!("{} external links", report.external().len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(
    config: Config,
    seed: &str,
    targets: TargetHostnames,
    prompt: Option<Box<dyn RetryPrompt>>,
) -> Result<CrawlReport, OutlinkError> {
    let mut coordinator = Coordinator::new(config, seed, targets).await?;
    if let Some(prompt) = prompt {
        coordinator = coordinator.with_prompt(prompt);
    }
    coordinator.run().await
}
