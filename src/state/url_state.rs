/// URL state definitions for tracking crawl progress
///
/// A URL that the frontier has never admitted has no state at all; every
/// admitted URL is in exactly one of these.
use std::fmt;

/// Represents the current state of a URL in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlState {
    // ===== Active States =====
    /// Waiting in the frontier queue
    Queued,

    /// Handed to a fetch worker
    InFlight,

    // ===== Terminal States =====
    /// Fetched successfully (links extracted, or none to extract)
    Done,

    /// Fetch failed; only an explicit retry moves it back to Queued
    Broken,
}

impl UrlState {
    /// Returns true if this is a terminal state (no further processing unless retried)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Broken)
    }

    /// Returns true if this is an active state
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Queued | Self::InFlight)
    }

    /// Returns true if the move `self -> next` is part of the lifecycle
    ///
    /// Queued → InFlight → {Done | Broken}, and Broken → Queued for retries.
    pub fn can_transition_to(&self, next: UrlState) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::InFlight)
                | (Self::InFlight, Self::Done)
                | (Self::InFlight, Self::Broken)
                | (Self::Broken, Self::Queued)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::InFlight => "in_flight",
            Self::Done => "done",
            Self::Broken => "broken",
        }
    }

    /// Returns all possible URL states
    pub fn all_states() -> [Self; 4] {
        [Self::Queued, Self::InFlight, Self::Done, Self::Broken]
    }
}

impl fmt::Display for UrlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
