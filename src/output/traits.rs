//! Report writer trait and errors

use crate::output::report::CrawlReport;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A report format
///
/// Writers receive the finished report and the output directory and return
/// the paths they created.
pub trait ReportWriter {
    /// Short name used in log lines
    fn name(&self) -> &'static str;

    /// Writes the report files for this format
    ///
    /// # Arguments
    ///
    /// * `report` - The finished crawl report
    /// * `directory` - Directory the files go into (already exists)
    /// * `prefix` - Timestamp prefix shared by every file of one run
    fn write(&self, report: &CrawlReport, directory: &Path, prefix: &str)
        -> OutputResult<Vec<PathBuf>>;
}

/// Writes `contents` to `directory/<prefix>_<suffix>`
pub(crate) fn write_file(
    directory: &Path,
    prefix: &str,
    suffix: &str,
    contents: &str,
) -> OutputResult<PathBuf> {
    let path = directory.join(format!("{}_{}", prefix, suffix));
    std::fs::write(&path, contents).map_err(|source| OutputError::Write {
        path: path.display().to_string(),
        source,
    })?;
    Ok(path)
}
