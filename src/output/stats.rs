//! Crawl statistics
//!
//! Counts derived from a finished `CrawlReport`, printed to stdout at the end
//! of a run and reused by the markdown summary.

use crate::output::report::CrawlReport;
use crate::url::LinkKind;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    pub pages_crawled: usize,
    pub pages_attempted: usize,
    pub broken_links: usize,
    pub abandoned: usize,
    pub internal_links: usize,
    pub target_external_links: usize,
    pub non_target_external_links: usize,
    pub pages_with_target_links: usize,
}

impl CrawlStatistics {
    pub fn from_report(report: &CrawlReport) -> Self {
        Self {
            pages_crawled: report.crawled.len(),
            pages_attempted: report.attempted.len(),
            broken_links: report.broken.len(),
            abandoned: report.abandoned.len(),
            internal_links: report.links.link_count(LinkKind::Internal),
            target_external_links: report.links.link_count(LinkKind::TargetExternal),
            non_target_external_links: report.links.link_count(LinkKind::NonTargetExternal),
            pages_with_target_links: report.external().len(),
        }
    }

    /// Share of attempted pages that were fetched successfully
    pub fn success_rate(&self) -> f64 {
        if self.pages_attempted == 0 {
            return 0.0;
        }
        (self.pages_crawled as f64 / self.pages_attempted as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Pages:");
    println!("  Crawled: {}", stats.pages_crawled);
    println!("  Attempted: {}", stats.pages_attempted);
    println!("  Broken: {}", stats.broken_links);
    if stats.abandoned > 0 {
        println!("  Not crawled (aborted): {}", stats.abandoned);
    }
    println!();

    println!("Links:");
    println!("  Internal: {}", stats.internal_links);
    println!(
        "  Target external: {} (on {} pages)",
        stats.target_external_links, stats.pages_with_target_links
    );
    println!("  Non-target external: {}", stats.non_target_external_links);
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} pages successfully fetched)",
        stats.success_rate(),
        stats.pages_crawled,
        stats.pages_attempted
    );
}
