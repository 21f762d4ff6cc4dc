//! Output module for crawl reports
//!
//! This module handles:
//! - The report data model assembled at the end of a run
//! - HTML link reports (external, non-target, broken, crawled)
//! - A markdown run summary
//! - Console statistics

mod html;
mod markdown;
mod report;
pub mod stats;
mod traits;

pub use html::HtmlReportWriter;
pub use markdown::{format_markdown_summary, MarkdownSummaryWriter};
pub use report::{CrawlReport, LinkBuckets, LinkMap, RunStatus};
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{OutputError, OutputResult, ReportWriter};

use crate::config::{OutputConfig, ReportFormat};
use std::path::{Path, PathBuf};

/// Timestamp prefix shared by all files of one run
pub fn file_prefix(report: &CrawlReport) -> String {
    report.finished_at.format("%Y-%m-%d_%H-%M-%S").to_string()
}

/// Writes every configured report format
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - Paths of all files written
/// * `Err(OutputError)` - The output directory or a file could not be written
pub fn write_reports(report: &CrawlReport, config: &OutputConfig) -> OutputResult<Vec<PathBuf>> {
    let directory = Path::new(&config.directory);
    std::fs::create_dir_all(directory)?;

    let prefix = file_prefix(report);
    let mut written = Vec::new();

    for format in &config.formats {
        let writer: Box<dyn ReportWriter> = match format {
            ReportFormat::Html => Box::new(HtmlReportWriter),
            ReportFormat::Markdown => Box::new(MarkdownSummaryWriter),
        };
        tracing::debug!("Running {} report writer", writer.name());
        written.extend(writer.write(report, directory, &prefix)?);
    }

    Ok(written)
}
