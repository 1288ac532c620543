//! Counters for the permission cache

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collector for cache operations
#[derive(Default)]
pub struct CacheMetrics {
    /// Reads served from a fresh entry
    pub hits: AtomicU64,
    /// Reads that found nothing usable
    pub misses: AtomicU64,
    /// Entries evicted on read because they outlived the TTL
    pub expirations: AtomicU64,
    /// Upstream fetches started
    pub fetches: AtomicU64,
    /// Upstream fetches that failed or timed out
    pub fetch_failures: AtomicU64,
    /// Callers that waited on another caller's fetch
    pub coalesced_waits: AtomicU64,
    /// Waits that gave up before the fetch finished
    pub coalesce_timeouts: AtomicU64,
    /// Entries removed by `cleanup`
    pub swept: AtomicU64,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_expiration(&self) {
        self.expirations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch(&self) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_coalesced_wait(&self) {
        self.coalesced_waits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_coalesce_timeout(&self) {
        self.coalesce_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_swept(&self, count: usize) {
        self.swept.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Fraction of reads served from cache
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let total = hits + self.misses.load(Ordering::Relaxed);
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    pub fn snapshot(&self) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            fetches: self.fetches.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            coalesced_waits: self.coalesced_waits.load(Ordering::Relaxed),
            coalesce_timeouts: self.coalesce_timeouts.load(Ordering::Relaxed),
            swept: self.swept.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheMetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub fetches: u64,
    pub fetch_failures: u64,
    pub coalesced_waits: u64,
    pub coalesce_timeouts: u64,
    pub swept: u64,
}
