//! URL handling module for Outlink
//!
//! This module provides URL canonicalization (the identity used for dedup)
//! and link classification against the crawl root and target hostnames.

mod canonical;
mod classify;

// Re-export main functions
pub use canonical::{canonicalize, root_prefix, CanonicalUrl};
pub use classify::{bucket_for, Classifier, LinkKind, TargetHostnames};
