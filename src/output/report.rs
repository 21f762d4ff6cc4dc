//! Report data model
//!
//! A `CrawlReport` is assembled once, when a run finishes or is aborted, from
//! the classifier's link buckets and the frontier's final snapshot.

use crate::url::LinkKind;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

/// Parent URL → set of discovered URLs
pub type LinkMap = BTreeMap<String, BTreeSet<String>>;

/// One link map per bucket kind
///
/// Entries are deduplicated per parent on the canonical key. The URL shown
/// in a report is the first resolved form seen for that key.
#[derive(Debug, Clone, Default)]
pub struct LinkBuckets {
    pub internal: LinkMap,
    pub external: LinkMap,
    pub non_target: LinkMap,
    seen: HashSet<(String, String)>,
}

impl LinkBuckets {
    /// Records `url` under `parent` unless its key is already there
    ///
    /// Returns true if the (parent, key) pair was new.
    pub(crate) fn record(&mut self, kind: LinkKind, parent: &str, key: &str, url: &str) -> bool {
        if !self.seen.insert((parent.to_string(), key.to_string())) {
            return false;
        }
        self.get_mut(kind)
            .entry(parent.to_string())
            .or_default()
            .insert(url.to_string())
    }

    pub fn get(&self, kind: LinkKind) -> &LinkMap {
        match kind {
            LinkKind::Internal => &self.internal,
            LinkKind::TargetExternal => &self.external,
            LinkKind::NonTargetExternal => &self.non_target,
        }
    }

    fn get_mut(&mut self, kind: LinkKind) -> &mut LinkMap {
        match kind {
            LinkKind::Internal => &mut self.internal,
            LinkKind::TargetExternal => &mut self.external,
            LinkKind::NonTargetExternal => &mut self.non_target,
        }
    }

    /// Number of (parent, discovered) pairs in a bucket
    pub fn link_count(&self, kind: LinkKind) -> usize {
        self.get(kind).values().map(BTreeSet::len).sum()
    }

    /// Distinct discovered URLs in a bucket, across all parents
    pub fn unique_links(&self, kind: LinkKind) -> BTreeSet<&str> {
        self.get(kind)
            .values()
            .flat_map(|links| links.iter().map(String::as_str))
            .collect()
    }

    /// Returns true if `url` was recorded in `kind` under any parent
    pub fn contains(&self, kind: LinkKind, url: &str) -> bool {
        self.get(kind).values().any(|links| links.contains(url))
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Frontier drained and the retry policy said stop
    Completed,
    /// Shutdown was requested; in-flight work drained, queue abandoned
    Aborted,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => f.write_str("completed"),
            Self::Aborted => f.write_str("aborted"),
        }
    }
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct CrawlReport {
    // Run metadata
    pub seed: String,
    pub root_prefix: String,
    pub targets: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub status: RunStatus,
    pub retry_rounds: u32,
    pub config_hash: Option<String>,

    // Link buckets
    pub links: LinkBuckets,

    // Broken URL → failure reason
    pub broken: BTreeMap<String, String>,

    // Successfully fetched URLs
    pub crawled: BTreeSet<String>,

    // Every URL handed to a worker at least once
    pub attempted: BTreeSet<String>,

    // URLs still queued when a run was aborted
    pub abandoned: BTreeSet<String>,
}

impl CrawlReport {
    pub fn external(&self) -> &LinkMap {
        &self.links.external
    }

    pub fn non_target(&self) -> &LinkMap {
        &self.links.non_target
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}
