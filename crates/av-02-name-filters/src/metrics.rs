//! Counters for the tenant filter registry
//!
//! Lock-free counters readable at any time through `snapshot()`.
//!
//! ```ignore
//! let snapshot = registry.metrics().snapshot();
//! tracing::info!(rebuilt = snapshot.filters_rebuilt, "registry counters");
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Metrics collector for registry operations
#[derive(Default)]
pub struct RegistryMetrics {
    /// Filters restored from the durable store
    pub filters_loaded: AtomicU64,
    /// Filters built fresh and backfilled from the name source
    pub filters_rebuilt: AtomicU64,
    /// Cold starts that failed to backfill
    pub backfill_failures: AtomicU64,
    /// Names added through the registry
    pub names_added: AtomicU64,
    /// Membership queries answered
    pub lookups_performed: AtomicU64,
    /// Membership queries answered "maybe"
    pub lookups_positive: AtomicU64,
    /// Cumulative lookup time in nanoseconds
    pub lookup_time_ns: AtomicU64,
    /// Rows written successfully
    pub persist_successes: AtomicU64,
    /// Rows abandoned after exhausting retries
    pub persist_failures: AtomicU64,
    /// Save requests dropped because the queue was full or closed
    pub persist_dropped: AtomicU64,
}

impl RegistryMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_loaded(&self) {
        self.filters_loaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rebuilt(&self) {
        self.filters_rebuilt.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_backfill_failure(&self) {
        self.backfill_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_name_added(&self) {
        self.names_added.fetch_add(1, Ordering::Relaxed);
    }

    /// Record lookup operation
    ///
    /// `found` is the filter's answer, so it includes false positives.
    pub fn record_lookup(&self, duration: Duration, found: bool) {
        self.lookups_performed.fetch_add(1, Ordering::Relaxed);
        self.lookup_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
        if found {
            self.lookups_positive.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_persisted(&self) {
        self.persist_successes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_persist_failure(&self) {
        self.persist_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_persist_dropped(&self) {
        self.persist_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> RegistryMetricsSnapshot {
        RegistryMetricsSnapshot {
            filters_loaded: self.filters_loaded.load(Ordering::Relaxed),
            filters_rebuilt: self.filters_rebuilt.load(Ordering::Relaxed),
            backfill_failures: self.backfill_failures.load(Ordering::Relaxed),
            names_added: self.names_added.load(Ordering::Relaxed),
            lookups_performed: self.lookups_performed.load(Ordering::Relaxed),
            lookups_positive: self.lookups_positive.load(Ordering::Relaxed),
            avg_lookup_ns: self.avg_lookup_time_ns(),
            persist_successes: self.persist_successes.load(Ordering::Relaxed),
            persist_failures: self.persist_failures.load(Ordering::Relaxed),
            persist_dropped: self.persist_dropped.load(Ordering::Relaxed),
        }
    }

    /// Calculate average lookup time in nanoseconds
    pub fn avg_lookup_time_ns(&self) -> u64 {
        let total = self.lookup_time_ns.load(Ordering::Relaxed);
        let count = self.lookups_performed.load(Ordering::Relaxed);
        if count > 0 {
            total / count
        } else {
            0
        }
    }

    /// Ratio of "maybe" answers to all lookups
    pub fn observed_positive_rate(&self) -> f64 {
        let total = self.lookups_performed.load(Ordering::Relaxed);
        let positive = self.lookups_positive.load(Ordering::Relaxed);
        if total > 0 {
            positive as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegistryMetricsSnapshot {
    pub filters_loaded: u64,
    pub filters_rebuilt: u64,
    pub backfill_failures: u64,
    pub names_added: u64,
    pub lookups_performed: u64,
    pub lookups_positive: u64,
    pub avg_lookup_ns: u64,
    pub persist_successes: u64,
    pub persist_failures: u64,
    pub persist_dropped: u64,
}
