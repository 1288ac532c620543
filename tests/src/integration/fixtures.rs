//! In-memory collaborators standing in for the relational store and the
//! identity provider.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use av_01_permission_cache::{
    LoadProgressSink, PermissionSource, ResourceGrant, SourceError, TimeSource,
};
use av_02_name_filters::{NameSource, SourceError as NameSourceError};

/// Asset table keyed by tenant
#[derive(Default)]
pub struct AssetTable {
    names: RwLock<HashMap<String, Vec<String>>>,
    list_calls: AtomicUsize,
    exists_calls: AtomicUsize,
}

impl AssetTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, tenant: &str, name: &str) {
        self.names
            .write()
            .entry(tenant.to_string())
            .or_default()
            .push(name.to_string());
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn exists_calls(&self) -> usize {
        self.exists_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NameSource for AssetTable {
    async fn list_names(&self, tenant: &str) -> Result<Vec<String>, NameSourceError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.names.read().get(tenant).cloned().unwrap_or_default())
    }

    async fn exists_by_name_and_tenant(
        &self,
        name: &str,
        tenant: &str,
    ) -> Result<bool, NameSourceError> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        let wanted = name.trim().to_lowercase();
        Ok(self
            .names
            .read()
            .get(tenant)
            .map(|names| names.iter().any(|n| n.trim().to_lowercase() == wanted))
            .unwrap_or(false))
    }
}

/// Identity provider returning canned grants after a fixed latency
pub struct FakeIdentityProvider {
    grants: RwLock<HashMap<String, Vec<ResourceGrant>>>,
    latency: Duration,
    calls: AtomicUsize,
}

impl FakeIdentityProvider {
    pub fn new(latency: Duration) -> Self {
        Self {
            grants: RwLock::new(HashMap::new()),
            latency,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn grant(&self, principal: &str, grant: ResourceGrant) {
        self.grants
            .write()
            .entry(principal.to_string())
            .or_default()
            .push(grant);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PermissionSource for FakeIdentityProvider {
    async fn fetch_permissions(
        &self,
        principal: &str,
        progress: &dyn LoadProgressSink,
    ) -> Result<Vec<ResourceGrant>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;

        let grants = self.grants.read().get(principal).cloned();
        match grants {
            Some(grants) => {
                let total = grants.len() as u64;
                progress.report_batch(grants.clone());
                progress.report_progress(total, total, "done");
                Ok(grants)
            }
            None => Err(SourceError::Upstream(format!("no such user: {}", principal))),
        }
    }
}

/// Clock that follows tokio's time, so paused tests can age cache entries
pub struct TokioClock {
    origin: tokio::time::Instant,
    epoch_secs: u64,
}

impl TokioClock {
    pub fn new(epoch_secs: u64) -> Self {
        Self {
            origin: tokio::time::Instant::now(),
            epoch_secs,
        }
    }
}

impl TimeSource for TokioClock {
    fn now(&self) -> u64 {
        self.epoch_secs + self.origin.elapsed().as_secs()
    }
}
