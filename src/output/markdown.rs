//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a crawl run,
//! including counts per bucket, broken links, and the top linking pages.

use crate::output::report::CrawlReport;
use crate::output::stats::CrawlStatistics;
use crate::output::traits::{write_file, OutputResult, ReportWriter};
use std::path::{Path, PathBuf};

/// How many parent pages to list in the "top linking pages" table
const TOP_PARENTS: usize = 20;

/// Writes `<prefix>_summary.md`
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownSummaryWriter;

impl ReportWriter for MarkdownSummaryWriter {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn write(
        &self,
        report: &CrawlReport,
        directory: &Path,
        prefix: &str,
    ) -> OutputResult<Vec<PathBuf>> {
        let markdown = format_markdown_summary(report);
        let path = write_file(directory, prefix, "summary.md", &markdown)?;
        tracing::info!("Wrote {}", path.display());
        Ok(vec![path])
    }
}

/// Formats a crawl report as markdown
pub fn format_markdown_summary(report: &CrawlReport) -> String {
    let stats = CrawlStatistics::from_report(report);
    let mut md = String::new();

    md.push_str("# Outlink Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed**: {}\n", report.seed));
    md.push_str(&format!("- **Site root**: {}\n", report.root_prefix));
    if report.targets.is_empty() {
        md.push_str("- **Targets**: (none, every external link is a target)\n");
    } else {
        md.push_str(&format!("- **Targets**: {}\n", report.targets.join(", ")));
    }
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Finished**: {}\n",
        report.finished_at.to_rfc3339()
    ));
    md.push_str(&format!(
        "- **Duration**: {} seconds\n",
        report.duration_seconds()
    ));
    md.push_str(&format!("- **Status**: {}\n", report.status));
    md.push_str(&format!("- **Retry rounds**: {}\n", report.retry_rounds));
    if let Some(hash) = &report.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Pages crawled | {} |\n", stats.pages_crawled));
    md.push_str(&format!("| Pages attempted | {} |\n", stats.pages_attempted));
    md.push_str(&format!("| Broken links | {} |\n", stats.broken_links));
    md.push_str(&format!("| Internal links | {} |\n", stats.internal_links));
    md.push_str(&format!(
        "| Target external links | {} |\n",
        stats.target_external_links
    ));
    md.push_str(&format!(
        "| Non-target external links | {} |\n",
        stats.non_target_external_links
    ));
    if stats.abandoned > 0 {
        md.push_str(&format!("| Not crawled (aborted) | {} |\n", stats.abandoned));
    }
    md.push_str(&format!(
        "\n**Success Rate**: {:.2}%\n\n",
        stats.success_rate()
    ));

    // Pages linking to targets
    if !report.external().is_empty() {
        md.push_str(&format!("## Top {} Pages Linking to Targets\n\n", TOP_PARENTS));
        md.push_str("| Page | Target links |\n");
        md.push_str("|------|--------------|\n");

        let mut parents: Vec<_> = report
            .external()
            .iter()
            .map(|(parent, links)| (parent, links.len()))
            .collect();
        parents.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        for (parent, count) in parents.into_iter().take(TOP_PARENTS) {
            md.push_str(&format!("| {} | {} |\n", parent, count));
        }
        md.push('\n');
    }

    // Broken links
    if !report.broken.is_empty() {
        md.push_str("## Broken Links\n\n");
        md.push_str("| URL | Reason |\n");
        md.push_str("|-----|--------|\n");
        for (url, reason) in &report.broken {
            md.push_str(&format!("| {} | {} |\n", url, reason.replace('|', "\\|")));
        }
        md.push('\n');
    }

    md
}
