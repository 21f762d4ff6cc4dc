//! Fetch worker pool
//!
//! This module handles:
//! - Global concurrency limiting via a semaphore (one permit per worker)
//! - Spawning fetch-and-parse tasks onto a `JoinSet`
//! - Turning worker panics into broken outcomes for the same URL
//!
//! Workers never touch crawl state. Each task returns a `PageOutcome` and the
//! coordinator applies it.

use crate::crawler::fetcher::{fetch_url, FetchResult};
use crate::crawler::parser::{parse_html, ParsedPage};
use crate::url::CanonicalUrl;
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use url::Url;

/// What a worker learned about one URL
#[derive(Debug)]
pub enum PageResult {
    /// HTML fetched and parsed
    Page { final_url: Url, parsed: ParsedPage },
    /// Fetched fine, not HTML
    NotHtml { final_url: Url, content_type: String },
    /// Transport failure or HTTP error status
    Broken { reason: String },
}

/// Outcome of one dispatched fetch
#[derive(Debug)]
pub struct PageOutcome {
    /// The URL as it was dispatched
    pub url: CanonicalUrl,
    pub result: PageResult,
}

/// A worker slot reserved ahead of dequeuing
///
/// Dropping the slot without dispatching returns it to the pool.
#[derive(Debug)]
pub struct WorkerSlot(OwnedSemaphorePermit);

/// Fixed-size pool of fetch tasks
pub struct WorkerPool {
    client: Client,
    semaphore: Arc<Semaphore>,
    tasks: JoinSet<PageOutcome>,
    workers: usize,
}

impl WorkerPool {
    pub fn new(client: Client, workers: usize) -> Self {
        Self {
            client,
            semaphore: Arc::new(Semaphore::new(workers)),
            tasks: JoinSet::new(),
            workers,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Reserves a free worker, or None if all are busy
    pub fn try_reserve(&self) -> Option<WorkerSlot> {
        self.semaphore.clone().try_acquire_owned().ok().map(WorkerSlot)
    }

    /// Spawns a fetch for `url` on a reserved worker
    ///
    /// The slot is released when the task finishes, panicked or not.
    pub fn dispatch(&mut self, slot: WorkerSlot, url: CanonicalUrl) {
        let client = self.client.clone();

        self.tasks.spawn(async move {
            let _permit = slot.0;
            let target = url.url().clone();

            // Run the work as its own task so a panic surfaces as a JoinError
            // while we still know which URL it belonged to
            let result = match tokio::spawn(fetch_and_parse(client, target)).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("Worker for {} failed: {}", url, e);
                    PageResult::Broken {
                        reason: format!("worker failed: {}", e),
                    }
                }
            };

            PageOutcome { url, result }
        });
    }

    /// Number of dispatched tasks that have not been collected yet
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Waits for the next finished task
    ///
    /// Returns None when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<PageOutcome> {
        loop {
            match self.tasks.join_next().await? {
                Ok(outcome) => return Some(outcome),
                // The outer task only awaits the inner one; it cannot panic
                // short of the runtime shutting down
                Err(e) => tracing::error!("Worker task lost: {}", e),
            }
        }
    }
}

/// Fetches one URL and extracts its link references
pub async fn fetch_and_parse(client: Client, url: Url) -> PageResult {
    match fetch_url(&client, &url).await {
        FetchResult::Success {
            final_url,
            status_code,
            body,
        } => {
            tracing::debug!("Fetched {} ({}, {} bytes)", final_url, status_code, body.len());
            PageResult::Page {
                parsed: parse_html(&body),
                final_url,
            }
        }
        FetchResult::NotHtml {
            final_url,
            content_type,
            ..
        } => PageResult::NotHtml {
            final_url,
            content_type,
        },
        broken @ (FetchResult::HttpError { .. } | FetchResult::TransportError { .. }) => {
            PageResult::Broken {
                reason: broken.broken_reason().unwrap_or_default(),
            }
        }
    }
}
