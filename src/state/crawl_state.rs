use std::fmt;

/// Lifecycle of a crawl run
///
/// ```text
/// Running ──drain──▶ Draining ──retry──▶ Retrying ──▶ Running
///                        │
///                        └──────────────▶ Finished
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    /// Frontier non-empty or work in flight
    Running,
    /// Frontier empty and nothing in flight; waiting on the retry decision
    Draining,
    /// Broken links are being requeued
    Retrying,
    /// Reports emitted; terminal
    Finished,
}

impl CrawlState {
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        matches!(
            (self, next),
            (Self::Running, Self::Draining)
                | (Self::Draining, Self::Retrying)
                | (Self::Draining, Self::Finished)
                | (Self::Retrying, Self::Running)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Retrying => "retrying",
            Self::Finished => "finished",
        };
        f.write_str(name)
    }
}
