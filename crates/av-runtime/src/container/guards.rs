//! # Guard Container
//!
//! Holds the permission cache and the tenant filter registry, one instance
//! each, and hands them to request handlers by reference.
//!
//! ## Lifecycle
//!
//! ```text
//! GuardContainer::new   build both components, validate configuration
//!        │
//! start()               spawn persistence worker + expiry sweeper
//!        │
//! RuntimeHandle::shutdown()
//!                       flush pending filter saves, stop sweeper, stop worker
//! ```

use std::sync::Arc;

use anyhow::{anyhow, Context};
use av_01_permission_cache::{
    spawn_sweeper, AccessLevel, PermissionCache, PermissionSource, ResourceGrant, SweeperHandle,
    SystemTimeSource, TimeSource,
};
use av_02_name_filters::{FilterStore, NameSource, PersistenceWorker, TenantFilterRegistry};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, instrument};

use crate::container::config::RuntimeConfig;

/// Both guard components wired to their collaborators.
pub struct GuardContainer<N: NameSource, S: FilterStore> {
    config: RuntimeConfig,
    permissions: Arc<PermissionCache>,
    permission_source: Arc<dyn PermissionSource>,
    filters: Arc<TenantFilterRegistry<N, S>>,
    /// Taken by `start`
    worker: Mutex<Option<PersistenceWorker<S>>>,
}

impl<N, S> GuardContainer<N, S>
where
    N: NameSource + 'static,
    S: FilterStore + 'static,
{
    pub fn new(
        config: RuntimeConfig,
        permission_source: Arc<dyn PermissionSource>,
        name_source: Arc<N>,
        filter_store: Arc<S>,
    ) -> anyhow::Result<Self> {
        Self::with_time_source(
            config,
            permission_source,
            name_source,
            filter_store,
            Arc::new(SystemTimeSource),
        )
    }

    /// Same as `new`, with the clock the permission cache ages entries by
    pub fn with_time_source(
        config: RuntimeConfig,
        permission_source: Arc<dyn PermissionSource>,
        name_source: Arc<N>,
        filter_store: Arc<S>,
        clock: Arc<dyn TimeSource>,
    ) -> anyhow::Result<Self> {
        let permissions = PermissionCache::with_time_source(config.permissions.clone(), clock)
            .context("invalid permission cache configuration")?;
        let (filters, worker) =
            TenantFilterRegistry::new(name_source, filter_store, config.filters.clone())
                .context("invalid name filter configuration")?;

        info!(
            ttl_secs = config.permissions.ttl.as_secs(),
            expected_items = config.filters.expected_items,
            false_positive_rate = config.filters.false_positive_rate,
            hash_scheme = %config.filters.hash_scheme,
            "Guard components initialized"
        );

        Ok(Self {
            config,
            permissions: Arc::new(permissions),
            permission_source,
            filters: Arc::new(filters),
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Spawn the background tasks. Fails if called twice.
    #[instrument(skip(self))]
    pub fn start(&self) -> anyhow::Result<RuntimeHandle<N, S>> {
        let worker = self
            .worker
            .lock()
            .take()
            .ok_or_else(|| anyhow!("guard services already started"))?;

        let worker = tokio::spawn(worker.run());
        let sweeper = spawn_sweeper(
            Arc::clone(&self.permissions),
            self.config.permissions.sweep_interval,
        );

        info!("Guard services started");
        Ok(RuntimeHandle {
            filters: Arc::clone(&self.filters),
            sweeper,
            worker,
        })
    }

    /// Grants for `principal`, from cache or the upstream source
    pub async fn permissions_for(&self, principal: &str) -> Vec<ResourceGrant> {
        self.permissions
            .get_or_load(principal, self.permission_source.as_ref())
            .await
    }

    /// Whether `principal` holds at least `required` on `resource_id`
    pub async fn authorize(&self, principal: &str, resource_id: &str, required: AccessLevel) -> bool {
        self.permissions_for(principal)
            .await
            .iter()
            .any(|grant| grant.resource_id == resource_id && grant.allows(required))
    }

    pub fn permission_cache(&self) -> &Arc<PermissionCache> {
        &self.permissions
    }

    pub fn name_filters(&self) -> &Arc<TenantFilterRegistry<N, S>> {
        &self.filters
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}

/// Background tasks started by `GuardContainer::start`.
pub struct RuntimeHandle<N: NameSource, S: FilterStore> {
    filters: Arc<TenantFilterRegistry<N, S>>,
    sweeper: SweeperHandle,
    worker: JoinHandle<()>,
}

impl<N: NameSource, S: FilterStore> RuntimeHandle<N, S> {
    /// Flush filter saves, then stop both tasks.
    ///
    /// Saves enqueued after the flush may be lost.
    pub async fn shutdown(self) {
        info!("Shutting down guard services");

        self.filters.flush().await;
        self.sweeper.stop().await;

        self.worker.abort();
        let _ = self.worker.await;

        info!("Guard services stopped");
    }
}
