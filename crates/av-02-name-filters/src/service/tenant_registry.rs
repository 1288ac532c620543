//! Tenant Filter Registry
//!
//! Owns one Bloom filter per tenant. A filter is resolved in this order:
//!
//! 1. resident in memory;
//! 2. restored from the tenant's persisted row;
//! 3. built fresh, backfilled from the name source, then persisted.
//!
//! Steps 2 and 3 run at most once per tenant at a time: concurrent callers
//! share a `OnceCell` and wait for the same cold start.
//!
//! Writes are persisted by a separate `PersistenceWorker` fed through a
//! bounded queue. Persistence is best-effort: a full queue or an exhausted
//! retry budget is logged and counted, and the in-memory filter stays
//! authoritative for the life of the process. Every save snapshots the
//! filter's current bits, so one later successful save covers any earlier
//! dropped one. A save request carries the filter it was queued for, so
//! evicting the tenant from memory never cancels it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::sync::{mpsc, oneshot, OnceCell};
use tracing::{debug, info, warn};

use crate::domain::{BloomFilter, HashScheme, RegistryConfig};
use crate::error::{FilterError, RegistryError, SourceError};
use crate::metrics::RegistryMetrics;
use crate::ports::{
    FilterStore, NameFilterApi, NameSource, PersistedFilter, SystemTimeSource, TimeSource,
};

/// Shared handle to one tenant's filter
pub type SharedFilter = Arc<RwLock<BloomFilter>>;
type FilterSlot = Arc<OnceCell<SharedFilter>>;
type FilterMap = DashMap<String, FilterSlot>;

/// Requests consumed by the persistence worker
#[derive(Debug)]
pub enum PersistCommand {
    /// Upsert the current state of `filter` as the tenant's row
    Save { tenant: String, filter: SharedFilter },
    /// Acknowledge once every earlier request has been processed
    Flush(oneshot::Sender<()>),
}

/// Advisory view of one tenant's filter
#[derive(Clone, Debug, PartialEq)]
pub struct FilterInfo {
    pub size_bits: usize,
    pub hash_count: usize,
    pub items_count: usize,
    pub bits_set: usize,
    pub scheme: HashScheme,
    pub estimated_fpr: f64,
}

/// Tenant filter registry
///
/// Generic over the name source and filter store so that the service can be
/// wired with real collaborators at startup and with in-memory ones in tests.
pub struct TenantFilterRegistry<N: NameSource, S: FilterStore> {
    names: Arc<N>,
    store: Arc<S>,
    filters: FilterMap,
    config: RegistryConfig,
    persist_tx: mpsc::Sender<PersistCommand>,
    metrics: Arc<RegistryMetrics>,
}

impl<N: NameSource, S: FilterStore> TenantFilterRegistry<N, S> {
    /// Create a registry and the worker that persists its writes
    ///
    /// The caller owns the worker and decides where it runs, typically
    /// `tokio::spawn(worker.run())`. Until it runs, saves accumulate in the
    /// bounded queue and overflow is dropped.
    pub fn new(
        names: Arc<N>,
        store: Arc<S>,
        config: RegistryConfig,
    ) -> Result<(Self, PersistenceWorker<S>), FilterError> {
        config.validate()?;

        let (persist_tx, persist_rx) = mpsc::channel(config.persist_queue_capacity);
        let filters: FilterMap = DashMap::new();
        let metrics = Arc::new(RegistryMetrics::new());

        let worker = PersistenceWorker {
            store: Arc::clone(&store),
            rx: persist_rx,
            metrics: Arc::clone(&metrics),
            clock: Arc::new(SystemTimeSource),
            retries: config.persist_retries,
            backoff: config.persist_retry_backoff,
        };

        let registry = Self {
            names,
            store,
            filters,
            config,
            persist_tx,
            metrics,
        };

        Ok((registry, worker))
    }

    /// Fetch-or-create the tenant's filter
    async fn get_filter(&self, tenant: &str) -> Result<SharedFilter, SourceError> {
        let slot = match self.filters.get(tenant) {
            Some(slot) => Arc::clone(&slot),
            None => Arc::clone(&self.filters.entry(tenant.to_string()).or_default()),
        };

        if let Some(filter) = slot.get() {
            return Ok(Arc::clone(filter));
        }

        let mut rebuilt = false;
        let filter = slot
            .get_or_try_init(|| async {
                let (filter, fresh) = self.cold_start(tenant).await?;
                rebuilt = fresh;
                Ok::<_, SourceError>(Arc::new(RwLock::new(filter)))
            })
            .await?;
        let filter = Arc::clone(filter);

        if rebuilt {
            self.enqueue_save(tenant, &filter);
        }
        Ok(filter)
    }

    /// Restore from the store, or rebuild from the name source.
    ///
    /// Store failures and malformed rows degrade to a rebuild. Only a name
    /// source failure is returned, since a partial backfill would produce
    /// false negatives.
    async fn cold_start(&self, tenant: &str) -> Result<(BloomFilter, bool), SourceError> {
        match self.store.load(tenant).await {
            Ok(Some(row)) => match row.into_filter() {
                Ok(filter) => {
                    self.metrics.record_loaded();
                    debug!(
                        tenant = %tenant,
                        size_bits = filter.size_bits(),
                        items = filter.items_count(),
                        "Restored name filter from store"
                    );
                    return Ok((filter, false));
                }
                Err(e) => {
                    warn!(tenant = %tenant, error = %e, "Persisted name filter is malformed, rebuilding");
                }
            },
            Ok(None) => {
                debug!(tenant = %tenant, "No persisted name filter");
            }
            Err(e) => {
                warn!(tenant = %tenant, error = %e, "Failed to load persisted name filter, rebuilding");
            }
        }

        let names = self.names.list_names(tenant).await.map_err(|e| {
            self.metrics.record_backfill_failure();
            warn!(tenant = %tenant, error = %e, "Name filter backfill failed");
            e
        })?;

        let mut filter = BloomFilter::new_with_fpr(
            self.config.expected_items,
            self.config.false_positive_rate,
            self.config.hash_scheme,
        );
        for name in &names {
            filter.insert(name);
        }

        self.metrics.record_rebuilt();
        info!(
            tenant = %tenant,
            names = names.len(),
            size_bits = filter.size_bits(),
            hash_count = filter.hash_count(),
            "Rebuilt name filter from source"
        );
        Ok((filter, true))
    }

    fn enqueue_save(&self, tenant: &str, filter: &SharedFilter) {
        let command = PersistCommand::Save {
            tenant: tenant.to_string(),
            filter: Arc::clone(filter),
        };
        if let Err(e) = self.persist_tx.try_send(command) {
            self.metrics.record_persist_dropped();
            warn!(tenant = %tenant, error = %e, "Dropping name filter save request");
        }
    }

    /// Query the tenant's filter
    ///
    /// When the filter cannot be built the answer is `true`, which sends the
    /// caller to the authoritative check.
    pub async fn might_contain(&self, tenant: &str, name: &str) -> bool {
        let start = Instant::now();
        let found = match self.get_filter(tenant).await {
            Ok(filter) => filter.read().contains(name),
            Err(_) => true,
        };
        self.metrics.record_lookup(start.elapsed(), found);
        found
    }

    /// Add a name to the tenant's filter and schedule a save
    pub async fn add_name(&self, tenant: &str, name: &str) {
        match self.get_filter(tenant).await {
            Ok(filter) => {
                filter.write().insert(name);
                self.metrics.record_name_added();
                self.enqueue_save(tenant, &filter);
            }
            Err(e) => {
                // The next cold start backfills from the source, which already has the name.
                debug!(tenant = %tenant, error = %e, "Name filter unavailable, add skipped");
            }
        }
    }

    /// Authoritative uniqueness check
    ///
    /// A definite "absent" from the filter skips the source entirely.
    pub async fn name_exists(&self, tenant: &str, name: &str) -> Result<bool, RegistryError> {
        if !self.might_contain(tenant, name).await {
            return Ok(false);
        }
        Ok(self.names.exists_by_name_and_tenant(name, tenant).await?)
    }

    /// Drop every in-memory filter
    pub fn clear_cache(&self) {
        let evicted = self.filters.len();
        self.filters.clear();
        info!(evicted = evicted, "Cleared name filter cache");
    }

    /// Tenants with a resident filter
    pub fn tenants(&self) -> Vec<String> {
        self.filters
            .iter()
            .filter(|entry| entry.value().initialized())
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Advisory state of a resident filter
    pub fn filter_info(&self, tenant: &str) -> Option<FilterInfo> {
        let slot = Arc::clone(&*self.filters.get(tenant)?);
        let filter = slot.get()?.read();
        Some(FilterInfo {
            size_bits: filter.size_bits(),
            hash_count: filter.hash_count(),
            items_count: filter.items_count(),
            bits_set: filter.bits_set(),
            scheme: filter.scheme(),
            estimated_fpr: filter.false_positive_rate(),
        })
    }

    /// Wait until every save enqueued before this call has been processed
    ///
    /// Requires the worker to be running.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.persist_tx.send(PersistCommand::Flush(ack_tx)).await.is_err() {
            return;
        }
        let _ = ack_rx.await;
    }

    pub fn metrics(&self) -> &RegistryMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }
}

#[async_trait]
impl<N: NameSource + 'static, S: FilterStore + 'static> NameFilterApi for TenantFilterRegistry<N, S> {
    async fn might_contain(&self, tenant: &str, name: &str) -> bool {
        TenantFilterRegistry::might_contain(self, tenant, name).await
    }

    async fn add_name(&self, tenant: &str, name: &str) {
        TenantFilterRegistry::add_name(self, tenant, name).await
    }

    async fn name_exists(&self, tenant: &str, name: &str) -> Result<bool, RegistryError> {
        TenantFilterRegistry::name_exists(self, tenant, name).await
    }

    fn clear_cache(&self) {
        TenantFilterRegistry::clear_cache(self)
    }
}

/// Background task writing filter rows
pub struct PersistenceWorker<S: FilterStore> {
    store: Arc<S>,
    rx: mpsc::Receiver<PersistCommand>,
    metrics: Arc<RegistryMetrics>,
    clock: Arc<dyn TimeSource>,
    retries: u32,
    backoff: Duration,
}

impl<S: FilterStore> PersistenceWorker<S> {
    /// Override the clock used for `updated_at`
    pub fn with_time_source(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    /// Process requests until the registry is dropped
    ///
    /// Requests already queued are drained together and repeated saves of
    /// the same filter collapse into one.
    pub async fn run(mut self) {
        debug!("Name filter persistence worker started");

        while let Some(first) = self.rx.recv().await {
            let mut batch = vec![first];
            while let Ok(next) = self.rx.try_recv() {
                batch.push(next);
            }

            let mut pending: Vec<(String, SharedFilter)> = Vec::new();
            for command in batch {
                match command {
                    PersistCommand::Save { tenant, filter } => {
                        if !pending.iter().any(|(_, queued)| Arc::ptr_eq(queued, &filter)) {
                            pending.push((tenant, filter));
                        }
                    }
                    PersistCommand::Flush(ack) => {
                        for (tenant, filter) in pending.drain(..) {
                            self.persist(&tenant, &filter).await;
                        }
                        let _ = ack.send(());
                    }
                }
            }
            for (tenant, filter) in pending {
                self.persist(&tenant, &filter).await;
            }
        }

        debug!("Name filter persistence worker stopped");
    }

    async fn persist(&self, tenant: &str, filter: &SharedFilter) {
        let snapshot = filter.read().export();
        let row = PersistedFilter::from_snapshot(tenant, snapshot, self.clock.now());

        for attempt in 0..=self.retries {
            match self.store.save(&row).await {
                Ok(()) => {
                    self.metrics.record_persisted();
                    debug!(tenant = %tenant, items = row.items_count, "Persisted name filter");
                    return;
                }
                Err(e) => {
                    warn!(
                        tenant = %tenant,
                        attempt = attempt + 1,
                        error = %e,
                        "Failed to persist name filter"
                    );
                    if attempt < self.retries {
                        tokio::time::sleep(self.backoff * (attempt + 1)).await;
                    }
                }
            }
        }

        self.metrics.record_persist_failure();
        warn!(tenant = %tenant, "Giving up on name filter save; in-memory filter remains authoritative");
    }
}
