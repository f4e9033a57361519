//! Recency Index
//!
//! Tracks when each token was last processed so the pipeline never
//! re-submits a token inside its freshness window. Eviction is lazy: the
//! owner calls `prune` at a defined point (the start of each partition pass).

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

/// Mint -> last processed instant, with a fixed freshness TTL
#[derive(Debug, Clone)]
pub struct RecencyIndex {
    ttl: Duration,
    seen: HashMap<String, Instant>,
}

impl RecencyIndex {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            seen: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Record that `mint` was processed at `at`
    pub fn mark_seen(&mut self, mint: &str, at: Instant) {
        self.seen.insert(mint.to_string(), at);
    }

    /// True when `mint` was processed less than one TTL before `now`
    pub fn is_fresh(&self, mint: &str, now: Instant) -> bool {
        self.seen
            .get(mint)
            .map(|last| now.saturating_duration_since(*last) < self.ttl)
            .unwrap_or(false)
    }

    /// Evict every entry whose age has reached the TTL. Returns the number
    /// of evicted entries.
    pub fn prune(&mut self, now: Instant) -> usize {
        let before = self.seen.len();
        let ttl = self.ttl;
        self.seen
            .retain(|_, last| now.saturating_duration_since(*last) < ttl);
        before - self.seen.len()
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
