//! HTML link reports
//!
//! Four files per run, each a flat list of clickable links so an operator can
//! walk through them in a browser:
//!
//! - `<prefix>_external_links.html`
//! - `<prefix>_non_target_external.html`
//! - `<prefix>_broken_links.html`
//! - `<prefix>_crawled_links.html`

use crate::output::report::{CrawlReport, LinkMap};
use crate::output::traits::{write_file, OutputResult, ReportWriter};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::path::{Path, PathBuf};

/// Writes the HTML link reports
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlReportWriter;

impl ReportWriter for HtmlReportWriter {
    fn name(&self) -> &'static str {
        "html"
    }

    fn write(
        &self,
        report: &CrawlReport,
        directory: &Path,
        prefix: &str,
    ) -> OutputResult<Vec<PathBuf>> {
        let files = [
            (
                "external_links.html",
                format_link_map("External links", report.external()),
            ),
            (
                "non_target_external.html",
                format_link_map("Non-target external links", report.non_target()),
            ),
            ("broken_links.html", format_broken_links(report)),
            ("crawled_links.html", format_crawled_links(report)),
        ];

        let mut written = Vec::with_capacity(files.len());
        for (suffix, contents) in files {
            let path = write_file(directory, prefix, suffix, &contents)?;
            tracing::info!("Wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

/// Formats a parent → links map
pub fn format_link_map(title: &str, links: &LinkMap) -> String {
    let mut html = page_header(title);

    for (parent, discovered) in links {
        html.push_str(&format!(
            "<p><strong>{} linked from: {}</strong></p>\n",
            encode_text(title),
            anchor(parent)
        ));
        for link in discovered {
            html.push_str(&format!("<p>------> {}</p>\n", anchor(link)));
        }
    }

    html.push_str(PAGE_FOOTER);
    html
}

/// Formats the broken link list with failure reasons
pub fn format_broken_links(report: &CrawlReport) -> String {
    let mut html = page_header("Broken links");
    html.push_str("<p><strong>Broken links found: </strong></p>\n");

    for (url, reason) in &report.broken {
        html.push_str(&format!(
            "<p>{} &mdash; {}</p>\n",
            anchor(url),
            encode_text(reason)
        ));
    }

    html.push_str(PAGE_FOOTER);
    html
}

/// Formats the crawled and attempted sets
pub fn format_crawled_links(report: &CrawlReport) -> String {
    let mut html = page_header("Crawled links");

    html.push_str("<p><strong>Crawled links: </strong></p>\n");
    for url in &report.crawled {
        html.push_str(&format!("<p>{}</p>\n", anchor(url)));
    }

    html.push_str("<p><strong>Tried links: </strong></p>\n");
    for url in &report.attempted {
        html.push_str(&format!("<p>{}</p>\n", anchor(url)));
    }

    if !report.abandoned.is_empty() {
        html.push_str("<p><strong>Not crawled (run aborted): </strong></p>\n");
        for url in &report.abandoned {
            html.push_str(&format!("<p>{}</p>\n", anchor(url)));
        }
    }

    html.push_str(PAGE_FOOTER);
    html
}

const PAGE_FOOTER: &str = "</body>\n</html>\n";

fn page_header(title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n",
        encode_text(title)
    )
}

fn anchor(url: &str) -> String {
    format!(
        "<a href=\"{}\">{}</a>",
        encode_double_quoted_attribute(url),
        encode_text(url)
    )
}
