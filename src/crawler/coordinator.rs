//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Fetching robots.txt and seeding the frontier
//! - Dispatching queued URLs to the worker pool
//! - Canonicalizing, gating, and classifying every discovered link
//! - Drain detection and the broken-link retry decision
//! - Graceful shutdown and final report assembly
//!
//! The coordinator is the only writer of crawl state. Workers hand back
//! `PageOutcome`s and the coordinator applies them one at a time.

use crate::config::{validate_seed, Config, RetryPolicy};
use crate::crawler::build_http_client;
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::ParsedPage;
use crate::crawler::pool::{PageOutcome, PageResult, WorkerPool};
use crate::output::{CrawlReport, RunStatus};
use crate::robots::RobotsGate;
use crate::state::CrawlState;
use crate::url::{
    bucket_for, canonicalize, root_prefix, CanonicalUrl, Classifier, LinkKind, TargetHostnames,
};
use crate::OutlinkError;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use url::Url;

/// Log a progress line every this many completed fetches
const PROGRESS_INTERVAL: usize = 10;

/// Asked at drain time whether broken links should be retried
pub trait RetryPrompt: Send {
    /// Returns true to requeue every URL in `broken`
    fn confirm_retry(&mut self, broken: &[CanonicalUrl]) -> bool;
}

/// Requests a graceful stop of a running crawl
///
/// No new URLs are dispatched once shutdown is requested. Fetches already in
/// flight are collected and the run ends with status `aborted`.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    seed: Url,
    robots: RobotsGate,
    frontier: Arc<Frontier>,
    classifier: Classifier,
    pool: WorkerPool,
    prompt: Option<Box<dyn RetryPrompt>>,
    shutdown: ShutdownHandle,
    state: CrawlState,
    retry_rounds: u32,
    completed: usize,
    started_at: DateTime<Utc>,
    config_hash: Option<String>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Validates the seed, builds the HTTP client, fetches robots.txt for the
    /// seed's origin and admits the seed.
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(OutlinkError)` - Bad seed, client build failure, or robots.txt
    ///   unavailable while `require-robots` is set
    pub async fn new(
        config: Config,
        seed: &str,
        targets: TargetHostnames,
    ) -> Result<Self, OutlinkError> {
        let seed = validate_seed(seed)?;
        let client = build_http_client(&config)?;

        let robots = RobotsGate::fetch(
            &client,
            &seed,
            &config.user_agent.robots_agent,
            config.crawler.require_robots,
        )
        .await?;

        let root = root_prefix(&seed, &config.canonical)?;
        tracing::info!("Site root: {}", root);
        if targets.is_empty() {
            tracing::info!("No target hostnames given; every external link is a target");
        } else {
            tracing::info!("Target hostnames: {}", targets.as_slice().join(", "));
        }

        let frontier = Arc::new(Frontier::new());
        frontier.enqueue(canonicalize(seed.as_str(), &seed, &config.canonical)?);

        let pool = WorkerPool::new(client, config.crawler.workers as usize);

        Ok(Self {
            config: Arc::new(config),
            seed,
            robots,
            frontier,
            classifier: Classifier::new(root, targets),
            pool,
            prompt: None,
            shutdown: ShutdownHandle::default(),
            state: CrawlState::Running,
            retry_rounds: 0,
            completed: 0,
            started_at: Utc::now(),
            config_hash: None,
        })
    }

    /// Records the config file hash in the final report
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    /// Installs the prompt consulted under `RetryPolicy::Prompt`
    pub fn with_prompt(mut self, prompt: Box<dyn RetryPrompt>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    pub fn frontier(&self) -> Arc<Frontier> {
        Arc::clone(&self.frontier)
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// Runs the crawl until the frontier drains and no retry is wanted
    ///
    /// ```text
    /// loop:
    ///   fill free workers from the frontier (robots-checked)
    ///   if nothing in flight and (queue empty or shutting down):
    ///       drain -> retry or finish
    ///   else:
    ///       apply the next worker outcome
    /// ```
    pub async fn run(mut self) -> Result<CrawlReport, OutlinkError> {
        tracing::info!(
            "Starting crawl of {} with {} workers",
            self.seed,
            self.pool.workers()
        );

        loop {
            self.fill_workers()?;

            if self.pool.in_flight() == 0 {
                if self.shutdown.is_shutdown() || self.frontier.is_drained() {
                    if self.drain() {
                        continue;
                    }
                    break;
                }
                continue;
            }

            if let Some(outcome) = self.pool.next_completion().await {
                self.handle_outcome(outcome)?;
            }
        }

        let report = self.build_report();
        tracing::info!(
            "Crawl {}: {} pages crawled, {} broken, {} retry rounds in {}s",
            report.status,
            report.crawled.len(),
            report.broken.len(),
            report.retry_rounds,
            report.duration_seconds()
        );
        Ok(report)
    }

    fn transition(&mut self, next: CrawlState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal crawl transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!("Crawl state: {} -> {}", self.state, next);
        self.state = next;
    }

    /// Hands queued URLs to free workers
    fn fill_workers(&mut self) -> Result<(), OutlinkError> {
        while !self.shutdown.is_shutdown() {
            let Some(slot) = self.pool.try_reserve() else {
                break;
            };
            let Some(url) = self.frontier.try_dequeue() else {
                break;
            };

            if !self.robots.can_fetch(url.url()) {
                tracing::debug!("URL {} disallowed by robots.txt", url);
                self.frontier.reject(url.key())?;
                continue;
            }

            tracing::debug!("Dispatching {}", url);
            self.pool.dispatch(slot, url);
        }
        Ok(())
    }

    /// Frontier is drained; decides between another round and finishing
    ///
    /// Returns true if broken URLs were requeued and the crawl continues.
    fn drain(&mut self) -> bool {
        self.transition(CrawlState::Draining);

        let broken = self.frontier.broken();
        let retry = if self.shutdown.is_shutdown() || broken.is_empty() {
            false
        } else {
            match self.config.crawler.retry_policy {
                RetryPolicy::Never => false,
                RetryPolicy::Auto => {
                    let allowed = self.retry_rounds < self.config.crawler.max_retry_rounds;
                    if !allowed {
                        tracing::warn!(
                            "Giving up on {} broken links after {} retry rounds",
                            broken.len(),
                            self.retry_rounds
                        );
                    }
                    allowed
                }
                RetryPolicy::Prompt => match self.prompt.as_mut() {
                    Some(prompt) => prompt.confirm_retry(&broken),
                    None => false,
                },
            }
        };

        if !retry {
            self.transition(CrawlState::Finished);
            return false;
        }

        self.transition(CrawlState::Retrying);
        let requeued = self.frontier.requeue_broken();
        self.retry_rounds += 1;
        tracing::info!(
            "Retry round {}: requeued {} broken links",
            self.retry_rounds,
            requeued
        );
        self.transition(CrawlState::Running);
        true
    }

    /// Applies one worker outcome to the frontier and the link buckets
    fn handle_outcome(&mut self, outcome: PageOutcome) -> Result<(), OutlinkError> {
        let key = outcome.url.key();

        match outcome.result {
            PageResult::Page { final_url, parsed } => {
                self.frontier.complete(key)?;
                tracing::info!(
                    "Processed {} ({} links)",
                    final_url,
                    parsed.reference_count()
                );
                self.admit_links(&final_url, &parsed);
            }
            PageResult::NotHtml {
                final_url,
                content_type,
            } => {
                tracing::debug!("Skipping non-HTML {} ({})", final_url, content_type);
                self.frontier.complete(key)?;
            }
            PageResult::Broken { reason } => {
                tracing::warn!("Broken link {}: {}", outcome.url, reason);
                self.frontier.mark_broken(key, reason)?;
            }
        }

        self.completed += 1;
        if self.completed % PROGRESS_INTERVAL == 0 {
            let counts = self.frontier.counts();
            let elapsed = (Utc::now() - self.started_at).num_milliseconds().max(1) as f64 / 1000.0;
            tracing::info!(
                "Progress: {} pages done, {} broken, {} queued, {} in flight, {:.2} pages/sec",
                counts.done,
                counts.broken,
                counts.queued,
                counts.in_flight,
                self.completed as f64 / elapsed
            );
        }

        Ok(())
    }

    /// Classifies every link of a fetched page; internal anchors are enqueued
    ///
    /// The parent of every link is the page's final URL after redirects. A
    /// page that redirected off-site is recorded as crawled but its links
    /// are not followed.
    fn admit_links(&mut self, page: &Url, parsed: &ParsedPage) {
        if let Ok(page_key) = canonicalize(page.as_str(), page, &self.config.canonical) {
            let kind = bucket_for(
                page_key.key(),
                self.classifier.root_prefix(),
                self.classifier.targets(),
            );
            if kind != LinkKind::Internal {
                tracing::debug!("{} redirected off-site; not following its links", page);
                return;
            }
        }

        let parent = page.as_str();
        let mut enqueued = 0;

        for href in &parsed.anchors {
            let Some(url) = self.admit(href, page) else {
                continue;
            };
            if self.classifier.classify(parent, &url) == LinkKind::Internal
                && self.frontier.enqueue(url)
            {
                enqueued += 1;
            }
        }

        for src in &parsed.images {
            if let Some(url) = self.admit(src, page) {
                self.classifier.classify(parent, &url);
            }
        }

        tracing::debug!(
            "{}: {} references, {} new internal URLs",
            parent,
            parsed.reference_count(),
            enqueued
        );
    }

    /// Canonicalizes a raw reference and applies the robots gate
    fn admit(&self, raw: &str, base: &Url) -> Option<CanonicalUrl> {
        let url = match canonicalize(raw, base, &self.config.canonical) {
            Ok(url) => url,
            Err(e) => {
                tracing::trace!("Skipping reference {:?} on {}: {}", raw, base, e);
                return None;
            }
        };

        if !self.robots.can_fetch(url.url()) {
            tracing::debug!("Excluded by robots.txt: {}", url);
            return None;
        }

        Some(url)
    }

    fn build_report(self) -> CrawlReport {
        let snapshot = self.frontier.snapshot();
        let status = if self.shutdown.is_shutdown() {
            RunStatus::Aborted
        } else {
            RunStatus::Completed
        };
        let targets = self.classifier.targets().as_slice().to_vec();
        let root_prefix = self.classifier.root_prefix().to_string();

        CrawlReport {
            seed: self.seed.to_string(),
            root_prefix,
            targets,
            started_at: self.started_at,
            finished_at: Utc::now(),
            status,
            retry_rounds: self.retry_rounds,
            config_hash: self.config_hash,
            links: self.classifier.into_buckets(),
            broken: snapshot.broken,
            crawled: snapshot.crawled,
            attempted: snapshot.attempted,
            abandoned: snapshot.queued,
        }
    }
}
