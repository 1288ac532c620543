//! Permission Cache
//!
//! TTL map from principal to resource grants, shielding a slow and
//! rate-limited authorization provider.
//!
//! Per key: `Absent -> Loading -> Ready -> (expired) -> Absent`.
//!
//! The primitives (`get`, `mark_loading`, `set`, `update_incremental`, ...)
//! are safe to call from any task. `get_or_load` builds single-flight
//! loading on top of them: the first caller for a key installs a `Loading`
//! entry carrying a completion signal, and concurrent callers subscribe to
//! that signal instead of fetching again.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::{
    dedupe_grants, merge_grants, AccessLevel, CacheStats, LoadProgress, PermissionCacheConfig,
    ResourceGrant,
};
use crate::error::{CacheError, SourceError};
use crate::metrics::CacheMetrics;
use crate::ports::{LoadProgressSink, PermissionSource, SystemTimeSource, TimeSource};

/// Completion signal of one in-flight fetch
///
/// Waiters hold receivers. Sending, or dropping the sender along with its
/// entry, wakes all of them.
struct Flight {
    id: u64,
    done: watch::Sender<()>,
}

struct CacheEntry {
    permissions: Vec<ResourceGrant>,
    /// Last write, seconds since the Unix epoch
    stored_at: u64,
    loading: bool,
    progress: Option<LoadProgress>,
    flight: Option<Flight>,
}

impl CacheEntry {
    fn ready(permissions: Vec<ResourceGrant>, now: u64) -> Self {
        Self {
            permissions,
            stored_at: now,
            loading: false,
            progress: None,
            flight: None,
        }
    }

    fn loading(flight: Flight, now: u64) -> Self {
        Self {
            permissions: Vec::new(),
            stored_at: now,
            loading: true,
            progress: None,
            flight: Some(flight),
        }
    }

    fn flight_id(&self) -> Option<u64> {
        self.flight.as_ref().map(|f| f.id)
    }
}

enum Claim {
    Hit(Vec<ResourceGrant>),
    Wait(watch::Receiver<()>),
    Load(u64),
}

/// Process-wide permission cache
pub struct PermissionCache {
    entries: DashMap<String, CacheEntry>,
    config: PermissionCacheConfig,
    clock: Arc<dyn TimeSource>,
    metrics: CacheMetrics,
    next_flight: AtomicU64,
}

impl PermissionCache {
    pub fn new(config: PermissionCacheConfig) -> Result<Self, CacheError> {
        Self::with_time_source(config, Arc::new(SystemTimeSource))
    }

    pub fn with_time_source(
        config: PermissionCacheConfig,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self, CacheError> {
        config.validate()?;
        Ok(Self {
            entries: DashMap::new(),
            config,
            clock,
            metrics: CacheMetrics::new(),
            next_flight: AtomicU64::new(1),
        })
    }

    fn is_fresh(&self, entry: &CacheEntry, now: u64) -> bool {
        now.saturating_sub(entry.stored_at) < self.config.ttl.as_secs()
    }

    fn new_flight(&self) -> Flight {
        let (done, _) = watch::channel(());
        Flight {
            id: self.next_flight.fetch_add(1, Ordering::Relaxed),
            done,
        }
    }

    /// Cached grants for `key`, evicting the entry if it has expired
    ///
    /// A `Loading` entry yields its placeholder, usually empty.
    pub fn get(&self, key: &str) -> Option<Vec<ResourceGrant>> {
        let now = self.clock.now();

        match self.entries.get(key) {
            None => {
                self.metrics.record_miss();
                return None;
            }
            Some(entry) if self.is_fresh(&entry, now) => {
                self.metrics.record_hit();
                return Some(entry.permissions.clone());
            }
            Some(_) => {}
        }

        if self
            .entries
            .remove_if(key, |_, entry| !self.is_fresh(entry, now))
            .is_some()
        {
            self.metrics.record_expiration();
            debug!(principal = %key, "Evicted expired permission entry");
        }
        self.metrics.record_miss();
        None
    }

    /// Whether a fetch is in flight for `key`
    pub fn is_loading(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.entries
            .get(key)
            .map(|entry| entry.loading && self.is_fresh(&entry, now))
            .unwrap_or(false)
    }

    /// Replace the entry with an empty `Loading` placeholder
    ///
    /// Callers waiting on a previous flight wake and re-check.
    pub fn mark_loading(&self, key: &str) {
        let entry = CacheEntry::loading(self.new_flight(), self.clock.now());
        self.entries.insert(key.to_string(), entry);
        debug!(principal = %key, "Marked permissions loading");
    }

    /// Store `permissions` as the `Ready` value for `key`
    ///
    /// Duplicate resource ids collapse to the last one. Wakes every caller
    /// waiting on the key.
    pub fn set(&self, key: &str, permissions: Vec<ResourceGrant>) {
        let permissions = dedupe_grants(permissions);
        let grants = permissions.len();
        let previous = self
            .entries
            .insert(key.to_string(), CacheEntry::ready(permissions, self.clock.now()));

        if let Some(flight) = previous.and_then(|entry| entry.flight) {
            let _ = flight.done.send(());
        }
        debug!(principal = %key, grants = grants, "Cached permissions");
    }

    /// Merge `permissions` into the entry by resource id
    ///
    /// Refreshes the timestamp and leaves the loading state alone. Falls back
    /// to `set` when there is no fresh entry.
    pub fn update_incremental(&self, key: &str, permissions: Vec<ResourceGrant>) {
        let now = self.clock.now();

        let leftover = match self.entries.get_mut(key) {
            Some(mut entry) if self.is_fresh(&entry, now) => {
                merge_grants(&mut entry.permissions, permissions);
                entry.stored_at = now;
                None
            }
            _ => Some(permissions),
        };

        if let Some(permissions) = leftover {
            self.set(key, permissions);
        }
    }

    /// Attach progress metadata without touching grants or timestamp
    pub fn update_progress(&self, key: &str, current: u64, total: u64, status: &str) {
        if let Some(mut entry) = self.entries.get_mut(key) {
            entry.progress = Some(LoadProgress {
                current,
                total,
                status: status.to_string(),
            });
        }
    }

    pub fn progress(&self, key: &str) -> Option<LoadProgress> {
        self.entries.get(key).and_then(|entry| entry.progress.clone())
    }

    /// Evict one principal
    pub fn clear(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear_all(&self) {
        let evicted = self.entries.len();
        self.entries.clear();
        info!(evicted = evicted, "Cleared permission cache");
    }

    /// Evict every expired entry, returning how many were removed
    pub fn cleanup(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0;

        self.entries.retain(|_, entry| {
            let keep = self.is_fresh(entry, now);
            if !keep {
                removed += 1;
            }
            keep
        });

        self.metrics.record_swept(removed);
        removed
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::default();
        for entry in self.entries.iter() {
            stats.total_principals += 1;
            stats.total_grants += entry.permissions.len();
            if entry.loading {
                stats.loading += 1;
            }
        }
        stats
    }

    /// Level `key` holds on `resource_id`, from a fresh entry only
    pub fn level_for(&self, key: &str, resource_id: &str) -> Option<AccessLevel> {
        self.get(key)?
            .into_iter()
            .find(|grant| grant.resource_id == resource_id)
            .map(|grant| grant.level)
    }

    pub fn allows(&self, key: &str, resource_id: &str, required: AccessLevel) -> bool {
        self.level_for(key, resource_id)
            .map(|level| level >= required)
            .unwrap_or(false)
    }

    /// Progress sink bound to `key`, for callers driving their own fetch
    pub fn reporter<'a>(&'a self, key: &'a str) -> LoadReporter<'a> {
        LoadReporter { cache: self, key }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn config(&self) -> &PermissionCacheConfig {
        &self.config
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    /// Grants for `key`, fetching from `source` at most once at a time
    ///
    /// Never fails. Upstream errors and timeouts cache an empty list. A
    /// caller that waits longer than `coalesce_wait` for another fetch gets
    /// whatever the entry holds at that point.
    pub async fn get_or_load<P>(&self, key: &str, source: &P) -> Vec<ResourceGrant>
    where
        P: PermissionSource + ?Sized,
    {
        let deadline = Instant::now() + self.config.coalesce_wait;
        let mut waited = false;

        loop {
            match self.claim(key) {
                Claim::Hit(permissions) => {
                    self.metrics.record_hit();
                    return permissions;
                }
                Claim::Load(flight_id) => {
                    self.metrics.record_miss();
                    return self.load(key, source, flight_id).await;
                }
                Claim::Wait(mut done) => {
                    if !waited {
                        waited = true;
                        self.metrics.record_coalesced_wait();
                        debug!(principal = %key, "Waiting for in-flight permission fetch");
                    }
                    if tokio::time::timeout_at(deadline, done.changed())
                        .await
                        .is_err()
                    {
                        self.metrics.record_coalesce_timeout();
                        debug!(principal = %key, "Coalesced wait timed out, returning placeholder");
                        return self.placeholder(key);
                    }
                }
            }
        }
    }

    /// Decide, under the key's shard lock, whether to serve, wait or load
    fn claim(&self, key: &str) -> Claim {
        let now = self.clock.now();

        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get();
                if self.is_fresh(entry, now) {
                    if !entry.loading {
                        return Claim::Hit(entry.permissions.clone());
                    }
                    if let Some(flight) = &entry.flight {
                        return Claim::Wait(flight.done.subscribe());
                    }
                } else {
                    self.metrics.record_expiration();
                }

                let flight = self.new_flight();
                let id = flight.id;
                occupied.insert(CacheEntry::loading(flight, now));
                Claim::Load(id)
            }
            Entry::Vacant(vacant) => {
                let flight = self.new_flight();
                let id = flight.id;
                vacant.insert(CacheEntry::loading(flight, now));
                Claim::Load(id)
            }
        }
    }

    async fn load<P>(&self, key: &str, source: &P, flight_id: u64) -> Vec<ResourceGrant>
    where
        P: PermissionSource + ?Sized,
    {
        let _guard = FlightGuard {
            entries: &self.entries,
            key,
            flight_id,
        };
        let reporter = self.reporter(key);
        let timeout = self.config.fetch_timeout;

        self.metrics.record_fetch();
        let fetched = tokio::time::timeout(timeout, source.fetch_permissions(key, &reporter))
            .await
            .unwrap_or(Err(SourceError::Timeout(timeout)));

        let permissions = match fetched {
            Ok(permissions) => dedupe_grants(permissions),
            Err(e) => {
                self.metrics.record_fetch_failure();
                warn!(principal = %key, error = %e, "Permission fetch failed, caching empty grants");
                Vec::new()
            }
        };

        self.set(key, permissions.clone());
        permissions
    }

    fn placeholder(&self, key: &str) -> Vec<ResourceGrant> {
        self.entries
            .get(key)
            .map(|entry| entry.permissions.clone())
            .unwrap_or_default()
    }
}

/// Removes the loader's own `Loading` entry if its fetch never completed
///
/// Runs when the loading future is dropped mid-fetch. Dropping the entry
/// drops its flight, so waiters wake, find the key absent and retry.
struct FlightGuard<'a> {
    entries: &'a DashMap<String, CacheEntry>,
    key: &'a str,
    flight_id: u64,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        let abandoned = self.entries.remove_if(self.key, |_, entry| {
            entry.loading && entry.flight_id() == Some(self.flight_id)
        });
        if abandoned.is_some() {
            debug!(principal = %self.key, "Permission fetch abandoned, released waiters");
        }
    }
}

/// `LoadProgressSink` writing into one cache entry
pub struct LoadReporter<'a> {
    cache: &'a PermissionCache,
    key: &'a str,
}

impl LoadProgressSink for LoadReporter<'_> {
    fn report_batch(&self, grants: Vec<ResourceGrant>) {
        self.cache.update_incremental(self.key, grants);
    }

    fn report_progress(&self, current: u64, total: u64, status: &str) {
        self.cache.update_progress(self.key, current, total, status);
    }
}
