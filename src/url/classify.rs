use crate::output::LinkBuckets;
use crate::url::CanonicalUrl;

/// Bucket a discovered link belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// Same site as the seed - crawled further
    Internal,
    /// Off-site and matching one of the target hostnames
    TargetExternal,
    /// Off-site and matching none of the target hostnames
    NonTargetExternal,
}

/// Hostname substrings an operator is auditing for
///
/// An empty set means no filtering: every external link is a target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetHostnames(Vec<String>);

impl TargetHostnames {
    /// Builds the target set, lowercasing entries and dropping blank ones
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list: Vec<String> = targets
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        list.sort();
        list.dedup();
        Self(list)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Returns true if the canonical key contains any target substring
    pub fn matches(&self, canonical_key: &str) -> bool {
        if self.0.is_empty() {
            return true;
        }
        let key = canonical_key.to_lowercase();
        self.0.iter().any(|target| key.contains(target.as_str()))
    }
}

/// Decides the bucket for a canonical key
///
/// Decision order:
/// 1. Key is site-relative or starts with the root prefix → Internal
/// 2. Key contains a target substring (or no targets given) → TargetExternal
/// 3. Otherwise → NonTargetExternal
pub fn bucket_for(canonical_key: &str, root_prefix: &str, targets: &TargetHostnames) -> LinkKind {
    if canonical_key.starts_with('/') || canonical_key.starts_with(root_prefix) {
        LinkKind::Internal
    } else if targets.matches(canonical_key) {
        LinkKind::TargetExternal
    } else {
        LinkKind::NonTargetExternal
    }
}

/// Sorts discovered links into report buckets
///
/// The classifier owns the link buckets; nothing else writes to them.
#[derive(Debug)]
pub struct Classifier {
    root_prefix: String,
    targets: TargetHostnames,
    buckets: LinkBuckets,
}

impl Classifier {
    pub fn new(root_prefix: impl Into<String>, targets: TargetHostnames) -> Self {
        Self {
            root_prefix: root_prefix.into(),
            targets,
            buckets: LinkBuckets::default(),
        }
    }

    pub fn root_prefix(&self) -> &str {
        &self.root_prefix
    }

    pub fn targets(&self) -> &TargetHostnames {
        &self.targets
    }

    /// Classifies `discovered` and records it under `parent`
    ///
    /// Repeated calls with the same parent and canonical key return the same
    /// bucket and leave a single report entry, however the link was spelled.
    pub fn classify(&mut self, parent: &str, discovered: &CanonicalUrl) -> LinkKind {
        let kind = bucket_for(discovered.key(), &self.root_prefix, &self.targets);
        if self
            .buckets
            .record(kind, parent, discovered.key(), discovered.as_str())
        {
            match kind {
                LinkKind::TargetExternal => {
                    tracing::info!("External URL detected: {} (from {})", discovered, parent)
                }
                LinkKind::NonTargetExternal => {
                    tracing::debug!("Non-target external URL: {} (from {})", discovered, parent)
                }
                LinkKind::Internal => {}
            }
        }
        kind
    }

    pub fn buckets(&self) -> &LinkBuckets {
        &self.buckets
    }

    pub fn into_buckets(self) -> LinkBuckets {
        self.buckets
    }
}
