//! Crawl frontier
//!
//! The frontier owns every URL's lifecycle: the FIFO of queued URLs, the
//! state of every URL ever admitted, and the in-flight count used for drain
//! detection. All of it sits behind one mutex; callers only see the
//! operations below.

use crate::state::UrlState;
use crate::url::CanonicalUrl;
use crate::OutlinkError;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;
use tokio::time::Instant;

/// Returned by [`Frontier::dequeue`] when nothing arrived in time
///
/// This is the drain signal, not a failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrontierError {
    #[error("frontier is empty")]
    Empty,
}

#[derive(Debug)]
struct Entry {
    url: CanonicalUrl,
    state: UrlState,
    attempts: u32,
    last_error: Option<String>,
}

#[derive(Debug, Default)]
struct FrontierState {
    queue: VecDeque<String>,
    entries: HashMap<String, Entry>,
    in_flight: usize,
}

impl FrontierState {
    fn transition(&mut self, key: &str, next: UrlState) -> Result<&mut Entry, OutlinkError> {
        let entry = self
            .entries
            .get_mut(key)
            .ok_or_else(|| OutlinkError::UnknownUrl(key.to_string()))?;

        if !entry.state.can_transition_to(next) {
            return Err(OutlinkError::InvalidTransition {
                url: key.to_string(),
                from: entry.state,
                to: next,
            });
        }

        match (entry.state, next) {
            (_, UrlState::InFlight) => self.in_flight += 1,
            (UrlState::InFlight, _) => self.in_flight -= 1,
            _ => {}
        }
        entry.state = next;
        Ok(entry)
    }
}

/// Counts of URLs per state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrontierCounts {
    pub queued: usize,
    pub in_flight: usize,
    pub done: usize,
    pub broken: usize,
}

/// Final view of the frontier used to assemble reports
#[derive(Debug, Clone, Default)]
pub struct FrontierSnapshot {
    /// Successfully fetched URLs
    pub crawled: BTreeSet<String>,
    /// URLs handed to a worker at least once
    pub attempted: BTreeSet<String>,
    /// Broken URL → last failure reason, including broken URLs requeued
    /// for a retry that had not been fetched yet
    pub broken: BTreeMap<String, String>,
    /// URLs still waiting in the queue that never failed
    pub queued: BTreeSet<String>,
}

/// Thread-safe crawl frontier
#[derive(Debug, Default)]
pub struct Frontier {
    inner: Mutex<FrontierState>,
    notify: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FrontierState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admits a URL
    ///
    /// No-op (returns false) if the URL's key was already admitted, whatever
    /// its current state.
    pub fn enqueue(&self, url: CanonicalUrl) -> bool {
        {
            let mut state = self.state();
            if state.entries.contains_key(url.key()) {
                return false;
            }

            let key = url.key().to_string();
            state.entries.insert(
                key.clone(),
                Entry {
                    url,
                    state: UrlState::Queued,
                    attempts: 0,
                    last_error: None,
                },
            );
            state.queue.push_back(key);
        }
        self.notify.notify_one();
        true
    }

    /// Takes the next queued URL without waiting
    ///
    /// The URL moves to InFlight and counts toward [`Frontier::in_flight`]
    /// until it is completed, marked broken, or rejected.
    pub fn try_dequeue(&self) -> Option<CanonicalUrl> {
        let mut state = self.state();
        while let Some(key) = state.queue.pop_front() {
            // Only Queued entries sit in the queue; anything else is stale
            if let Ok(entry) = state.transition(&key, UrlState::InFlight) {
                entry.attempts += 1;
                return Some(entry.url.clone());
            }
        }
        None
    }

    /// Takes the next queued URL, waiting up to `timeout` for one to arrive
    pub async fn dequeue(&self, timeout: Duration) -> Result<CanonicalUrl, FrontierError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(url) = self.try_dequeue() {
                return Ok(url);
            }

            if tokio::time::timeout_at(deadline, self.notify.notified())
                .await
                .is_err()
            {
                return self.try_dequeue().ok_or(FrontierError::Empty);
            }
        }
    }

    /// InFlight → Done
    pub fn complete(&self, key: &str) -> Result<(), OutlinkError> {
        let mut state = self.state();
        let entry = state.transition(key, UrlState::Done)?;
        entry.last_error = None;
        Ok(())
    }

    /// InFlight → Broken, remembering why
    pub fn mark_broken(&self, key: &str, reason: impl Into<String>) -> Result<(), OutlinkError> {
        let mut state = self.state();
        let entry = state.transition(key, UrlState::Broken)?;
        entry.last_error = Some(reason.into());
        Ok(())
    }

    /// Forgets an in-flight URL entirely (robots denial at dispatch time)
    pub fn reject(&self, key: &str) -> Result<(), OutlinkError> {
        let mut state = self.state();
        match state.entries.get(key).map(|e| e.state) {
            Some(UrlState::InFlight) => {
                state.entries.remove(key);
                state.in_flight -= 1;
                Ok(())
            }
            Some(from) => Err(OutlinkError::InvalidTransition {
                url: key.to_string(),
                from,
                to: UrlState::Queued,
            }),
            None => Err(OutlinkError::UnknownUrl(key.to_string())),
        }
    }

    /// Broken → Queued for one URL
    pub fn requeue(&self, key: &str) -> Result<(), OutlinkError> {
        {
            let mut state = self.state();
            state.transition(key, UrlState::Queued)?;
            state.queue.push_back(key.to_string());
        }
        self.notify.notify_one();
        Ok(())
    }

    /// Requeues every broken URL; returns how many were requeued
    pub fn requeue_broken(&self) -> usize {
        let broken: Vec<String> = {
            let state = self.state();
            let mut keys: Vec<String> = state
                .entries
                .iter()
                .filter(|(_, e)| e.state == UrlState::Broken)
                .map(|(k, _)| k.clone())
                .collect();
            keys.sort();
            keys
        };

        broken
            .iter()
            .filter(|key| self.requeue(key).is_ok())
            .count()
    }

    /// Broken URLs in key order
    pub fn broken(&self) -> Vec<CanonicalUrl> {
        let state = self.state();
        let mut broken: Vec<CanonicalUrl> = state
            .entries
            .values()
            .filter(|e| e.state == UrlState::Broken)
            .map(|e| e.url.clone())
            .collect();
        broken.sort_by(|a, b| a.key().cmp(b.key()));
        broken
    }

    /// Current state of a URL, or None if it was never admitted
    pub fn state_of(&self, key: &str) -> Option<UrlState> {
        self.state().entries.get(key).map(|e| e.state)
    }

    pub fn in_flight(&self) -> usize {
        self.state().in_flight
    }

    pub fn queued(&self) -> usize {
        self.state().queue.len()
    }

    /// Queue empty and nothing in flight
    pub fn is_drained(&self) -> bool {
        let state = self.state();
        state.queue.is_empty() && state.in_flight == 0
    }

    pub fn counts(&self) -> FrontierCounts {
        let state = self.state();
        let mut counts = FrontierCounts::default();
        for entry in state.entries.values() {
            match entry.state {
                UrlState::Queued => counts.queued += 1,
                UrlState::InFlight => counts.in_flight += 1,
                UrlState::Done => counts.done += 1,
                UrlState::Broken => counts.broken += 1,
            }
        }
        counts
    }

    /// Report view: URLs as they were fetched, not their keys
    pub fn snapshot(&self) -> FrontierSnapshot {
        let state = self.state();
        let mut snapshot = FrontierSnapshot::default();

        for entry in state.entries.values() {
            let url = entry.url.as_str().to_string();
            if entry.attempts > 0 {
                snapshot.attempted.insert(url.clone());
            }
            match entry.state {
                UrlState::Done => {
                    snapshot.crawled.insert(url);
                }
                UrlState::Broken => {
                    let reason = entry
                        .last_error
                        .clone()
                        .unwrap_or_else(|| "unknown error".to_string());
                    snapshot.broken.insert(url, reason);
                }
                // Requeued for a retry that never ran; it is still broken
                UrlState::Queued => match &entry.last_error {
                    Some(reason) => {
                        snapshot.broken.insert(url, reason.clone());
                    }
                    None => {
                        snapshot.queued.insert(url);
                    }
                },
                UrlState::InFlight => {}
            }
        }

        snapshot
    }
}
